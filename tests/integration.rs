//! Integration tests for dedup-ruleset
//!
//! Tests full workflows: file loading, saving, controller sessions, diffing.

use dedup_ruleset::{
    parse_ruleset, write_ruleset, DedupMode, ExternalUpdate, Rule, RuleSet, RulesetChange,
    RulesetConfig, RulesetController, RulesetDocument, RulesetError, Scalar, Severity,
    ValidationMode, DEFAULT_RULE_KEY,
};
use std::cell::RefCell;
use std::rc::Rc;
use tempfile::TempDir;
use tokio::fs;

const HOST_RULESET: &str = "\
# Managed by the governance console
deduplication:
  enabled: true
  similarity_threshold: 0.8
  high_confidence_threshold: 0.9
  mode: block
  num_hash_functions: 256
  num_bands: 32
  shingle_size: 4

rules:
  api-deduplication-check:
    description: Flag duplicated API operations
    severity: warn
    message: >-
      This operation closely matches another operation
      in the catalogue.
";

// ============================================================================
// FILE LOADING INTEGRATION TESTS
// ============================================================================

#[tokio::test]
async fn test_ruleset_save_and_load_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ruleset.yaml");

    let mut original = RulesetConfig::default();
    original.deduplication.mode = DedupMode::Audit;
    original.deduplication.similarity_threshold = 0.6;
    original.rules.primary_mut().message = "Possible duplicate".to_string();

    original.save(&path).await.unwrap();
    let loaded = RulesetConfig::from_file(&path).await.unwrap();

    assert_eq!(loaded, original);
}

#[tokio::test]
async fn test_ruleset_load_host_document() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ruleset.yaml");
    fs::write(&path, HOST_RULESET).await.unwrap();

    let config = RulesetConfig::from_file(&path).await.unwrap();
    assert_eq!(config.deduplication.mode, DedupMode::Block);
    assert_eq!(config.deduplication.num_bands, 32);
    assert_eq!(config.deduplication.shingle_size, 4);

    let (id, rule) = config.rules.primary().unwrap();
    assert_eq!(id, DEFAULT_RULE_KEY);
    assert_eq!(rule.severity, Severity::Warn);
    assert_eq!(
        rule.message,
        "This operation closely matches another operation in the catalogue."
    );
}

#[tokio::test]
async fn test_ruleset_load_validates() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("invalid.yaml");
    fs::write(&path, "deduplication:\n  similarity_threshold: 1.5\n")
        .await
        .unwrap();

    let result = RulesetConfig::from_file(&path).await;
    assert!(matches!(result, Err(RulesetError::OutOfRange { .. })));
}

#[tokio::test]
async fn test_ruleset_strict_validation_mode() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("uneven.yaml");
    fs::write(
        &path,
        "deduplication:\n  num_hash_functions: 100\n  num_bands: 30\n",
    )
    .await
    .unwrap();

    // Standard mode should pass
    assert!(RulesetConfig::from_file(&path).await.is_ok());

    // Strict mode should fail (bands do not divide hash functions)
    let strict = RulesetConfig::from_file_with_mode(&path, ValidationMode::Strict).await;
    assert!(strict.is_err());
    assert_eq!(strict.unwrap_err().field(), Some("deduplication.num_bands"));
}

#[tokio::test]
async fn test_ruleset_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = RulesetConfig::from_file(temp_dir.path().join("absent.yaml")).await;
    assert!(matches!(result, Err(RulesetError::Io { .. })));
}

#[tokio::test]
async fn test_ruleset_save_refuses_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("never.yaml");

    let mut config = RulesetConfig::default();
    config.deduplication.shingle_size = 0;

    assert!(config.save(&path).await.is_err());
    assert!(!path.exists());
}

// ============================================================================
// READER / WRITER CONTRACT TESTS
// ============================================================================

#[test]
fn test_empty_input_yields_empty_document() {
    assert_eq!(parse_ruleset(""), RulesetDocument::default());
    assert_eq!(RulesetDocument::from_text(None), RulesetDocument::default());
}

#[test]
fn test_type_coercion_under_deduplication() {
    let doc = parse_ruleset(
        "deduplication:\n  enabled: true\n  shingle_size: 5\n  similarity_threshold: 0.5\n  mode: audit\n",
    );
    assert_eq!(doc.deduplication.get("enabled"), Some(&Scalar::Bool(true)));
    assert_eq!(doc.deduplication.get("shingle_size"), Some(&Scalar::Integer(5)));
    assert_eq!(
        doc.deduplication.get("similarity_threshold"),
        Some(&Scalar::Float(0.5))
    );
    assert_eq!(
        doc.deduplication.get("mode"),
        Some(&Scalar::String("audit".to_string()))
    );
}

#[test]
fn test_multi_rule_document_keeps_every_rule_but_writes_first() {
    let text = "\
rules:
  first:
    description: one
    severity: info
    message: >-
      first message
  second:
    description: two
    severity: error
    message: >-
      second message
";
    let config = RulesetConfig::from_text(text).unwrap();
    assert_eq!(config.rules.ids().collect::<Vec<_>>(), vec!["first", "second"]);

    let written = write_ruleset(&config);
    assert!(written.contains("  first:\n"));
    assert!(!written.contains("second"));
}

#[test]
fn test_writer_default_rule_key_when_empty() {
    let config = RulesetConfig {
        rules: RuleSet::new(),
        ..RulesetConfig::default()
    };
    let text = write_ruleset(&config);
    assert!(text.contains("rules:\n  api-deduplication-check:"));
    assert!(text.contains("severity: error"));
    assert!(text.ends_with('\n'));
}

// ============================================================================
// CONTROLLER SESSION TESTS
// ============================================================================

#[test]
fn test_controller_host_roundtrip_does_not_reparse() {
    let outbox: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink_box = Rc::clone(&outbox);
    let mut controller =
        RulesetController::new(move |text: &str| sink_box.borrow_mut().push(text.to_owned()));

    assert_eq!(
        controller.apply_external(Some(HOST_RULESET)).unwrap(),
        ExternalUpdate::Replaced
    );
    assert!(outbox.borrow().is_empty());

    controller.set_rule_severity(Severity::Info);
    controller.set_similarity_threshold(0.75);
    assert_eq!(outbox.borrow().len(), 2);

    // Host persists our text and reflects it back.
    let echoed = outbox.borrow().last().cloned();
    let before = controller.config().clone();
    assert_eq!(
        controller.apply_external(echoed.as_deref()).unwrap(),
        ExternalUpdate::OwnEcho
    );
    assert_eq!(controller.config(), &before);
    assert_eq!(outbox.borrow().len(), 2);
}

#[test]
fn test_independent_controllers_do_not_share_echo_state() {
    let mut a = RulesetController::new(|_: &str| {});
    let mut b = RulesetController::new(|_: &str| {});

    a.set_mode(DedupMode::Block);
    let text = a.last_emitted().unwrap().to_owned();

    assert_eq!(b.apply_external(Some(text.as_str())).unwrap(), ExternalUpdate::Replaced);
    assert_eq!(b.config().deduplication.mode, DedupMode::Block);
}

#[test]
fn test_controller_external_replacement_is_wholesale() {
    let mut controller = RulesetController::new(|_: &str| {});
    controller.set_shingle_size(7);

    controller
        .apply_external(Some("deduplication:\n  mode: audit\n"))
        .unwrap();

    // Missing keys come from defaults, not from the previous session state.
    assert_eq!(controller.config().deduplication.shingle_size, 3);
    assert_eq!(controller.config().deduplication.mode, DedupMode::Audit);
}

#[test]
fn test_diff_between_loaded_rulesets() {
    let old = RulesetConfig::from_text(HOST_RULESET).unwrap();
    let mut new = old.clone();
    new.deduplication.enabled = false;
    new.rules.insert(
        "schema-duplication",
        Rule {
            description: "Flag duplicated schemas".to_string(),
            severity: Severity::Info,
            message: String::new(),
        },
    );

    let changes = old.diff(&new);
    assert_eq!(changes.len(), 2);
    assert!(matches!(
        &changes[0],
        RulesetChange::SettingChanged { field, .. } if field == "deduplication.enabled"
    ));
    assert_eq!(
        changes[1],
        RulesetChange::RulesAdded {
            ids: vec!["schema-duplication".to_string()]
        }
    );
}
