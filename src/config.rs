//! Typed ruleset configuration.
//!
//! [`RulesetConfig`] is the state a session holds and edits. It is built from
//! a parsed [`RulesetDocument`] by laying the document's values over the
//! defaults, and written back out with [`crate::writer::write_ruleset`].

use crate::defaults::*;
use crate::document::{OrderedMap, RulesetDocument, Scalar};
use crate::errors::{self, ConversionError, RangeValidationError};
use crate::lsh::LshParams;
use crate::rules::RuleSet;
use crate::validation::ValidationMode;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Action taken when a duplicate is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupMode {
    /// Record findings only.
    Audit,
    /// Report findings without blocking.
    Warn,
    /// Reject duplicates.
    Block,
}

impl DedupMode {
    /// Accepted spellings, in declaration order.
    pub const NAMES: [&'static str; 3] = ["audit", "warn", "block"];

    /// Text form used in ruleset documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Audit => "audit",
            Self::Warn => "warn",
            Self::Block => "block",
        }
    }

    /// Parse the text form.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "audit" => Some(Self::Audit),
            "warn" => Some(Self::Warn),
            "block" => Some(Self::Block),
            _ => None,
        }
    }
}

impl Default for DedupMode {
    fn default() -> Self {
        default_mode()
    }
}

impl fmt::Display for DedupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar settings of the similarity detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeduplicationConfig {
    /// Whether duplicate detection runs at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum similarity for a pair to be reported
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Similarity above which a finding is reported as high confidence
    #[serde(default = "default_high_confidence_threshold")]
    pub high_confidence_threshold: f64,

    /// What to do with findings
    #[serde(default = "default_mode")]
    pub mode: DedupMode,

    /// MinHash signature length
    #[serde(default = "default_num_hash_functions")]
    pub num_hash_functions: u32,

    /// Number of LSH bands the signature is split into
    #[serde(default = "default_num_bands")]
    pub num_bands: u32,

    /// Tokens per shingle
    #[serde(default = "default_shingle_size")]
    pub shingle_size: u32,
}

impl Default for DeduplicationConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            similarity_threshold: default_similarity_threshold(),
            high_confidence_threshold: default_high_confidence_threshold(),
            mode: default_mode(),
            num_hash_functions: default_num_hash_functions(),
            num_bands: default_num_bands(),
            shingle_size: default_shingle_size(),
        }
    }
}

impl DeduplicationConfig {
    /// Lay document values over the defaults. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns error if a known key holds a value of the wrong type, an
    /// unknown mode, or an integer that does not fit.
    pub fn from_document(values: &OrderedMap<Scalar>) -> Result<Self> {
        let mut cfg = Self::default();
        for (key, value) in values.iter() {
            match key {
                "enabled" => cfg.enabled = expect_bool(key, value)?,
                "similarity_threshold" => cfg.similarity_threshold = expect_f64(key, value)?,
                "high_confidence_threshold" => {
                    cfg.high_confidence_threshold = expect_f64(key, value)?;
                }
                "mode" => cfg.mode = expect_mode(key, value)?,
                "num_hash_functions" => cfg.num_hash_functions = expect_u32(key, value)?,
                "num_bands" => cfg.num_bands = expect_u32(key, value)?,
                "shingle_size" => cfg.shingle_size = expect_u32(key, value)?,
                other => tracing::debug!(key = other, "ignoring unknown deduplication key"),
            }
        }
        Ok(cfg)
    }

    /// LSH parameters implied by these settings.
    #[must_use]
    pub fn lsh_params(&self) -> LshParams {
        LshParams::new(self.num_hash_functions, self.num_bands)
    }

    fn validate(&self, mode: ValidationMode) -> Result<()> {
        for (field, value) in [
            ("deduplication.similarity_threshold", self.similarity_threshold),
            ("deduplication.high_confidence_threshold", self.high_confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RangeValidationError::out_of_range(
                    field,
                    value,
                    0.0,
                    1.0,
                    "validate_deduplication",
                ));
            }
        }

        if self.high_confidence_threshold < self.similarity_threshold {
            return Err(RangeValidationError::below_minimum(
                "deduplication.high_confidence_threshold",
                self.high_confidence_threshold,
                self.similarity_threshold,
                "validate_deduplication",
            ));
        }

        for (field, value) in [
            ("deduplication.num_hash_functions", self.num_hash_functions),
            ("deduplication.num_bands", self.num_bands),
            ("deduplication.shingle_size", self.shingle_size),
        ] {
            if value == 0 {
                return Err(RangeValidationError::below_minimum(
                    field,
                    value,
                    1,
                    "validate_deduplication",
                ));
            }
        }

        if self.num_bands > self.num_hash_functions {
            return Err(RangeValidationError::above_maximum(
                "deduplication.num_bands",
                self.num_bands,
                self.num_hash_functions,
                "validate_deduplication",
            ));
        }

        if mode == ValidationMode::Strict && self.num_hash_functions % self.num_bands != 0 {
            return Err(errors::invalid_value(
                "validate_deduplication",
                "deduplication.num_bands",
                format!(
                    "num_bands ({}) must evenly divide num_hash_functions ({})",
                    self.num_bands, self.num_hash_functions
                ),
            ));
        }

        Ok(())
    }
}

fn expect_bool(key: &str, value: &Scalar) -> Result<bool> {
    value.as_bool().ok_or_else(|| {
        ConversionError::wrong_type(&format!("deduplication.{key}"), "boolean", value.kind())
    })
}

fn expect_f64(key: &str, value: &Scalar) -> Result<f64> {
    value.as_f64().ok_or_else(|| {
        ConversionError::wrong_type(&format!("deduplication.{key}"), "number", value.kind())
    })
}

fn expect_u32(key: &str, value: &Scalar) -> Result<u32> {
    let field = format!("deduplication.{key}");
    let raw = value
        .as_i64()
        .ok_or_else(|| ConversionError::wrong_type(&field, "integer", value.kind()))?;
    u32::try_from(raw).map_err(|_| {
        RangeValidationError::out_of_range(&field, raw, 0, i64::from(u32::MAX), "convert_document")
    })
}

fn expect_mode(key: &str, value: &Scalar) -> Result<DedupMode> {
    let field = format!("deduplication.{key}");
    let name = value
        .as_str()
        .ok_or_else(|| ConversionError::wrong_type(&field, "string", value.kind()))?;
    DedupMode::from_name(name)
        .ok_or_else(|| ConversionError::unknown_variant(&field, name, &DedupMode::NAMES))
}

/// Root configuration: deduplication settings plus rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesetConfig {
    /// Detector settings
    #[serde(default)]
    pub deduplication: DeduplicationConfig,

    /// Rules reported on findings
    #[serde(default = "RuleSet::with_default_rule")]
    pub rules: RuleSet,
}

impl Default for RulesetConfig {
    fn default() -> Self {
        Self {
            deduplication: DeduplicationConfig::default(),
            rules: RuleSet::with_default_rule(),
        }
    }
}

impl RulesetConfig {
    /// Build a configuration from a parsed document.
    ///
    /// Settings absent from the document keep their defaults. A document
    /// without rules keeps the default rule.
    ///
    /// # Errors
    ///
    /// Returns error if any present value has the wrong type or an unknown
    /// enum spelling.
    pub fn from_document(doc: &RulesetDocument) -> Result<Self> {
        let deduplication = DeduplicationConfig::from_document(&doc.deduplication)?;
        let rules = if doc.rules.is_empty() {
            RuleSet::with_default_rule()
        } else {
            RuleSet::from_document(&doc.rules)?
        };
        Ok(Self {
            deduplication,
            rules,
        })
    }

    /// Parse ruleset text and build a configuration from it.
    ///
    /// # Errors
    ///
    /// See [`RulesetConfig::from_document`].
    pub fn from_text(text: &str) -> Result<Self> {
        Self::from_document(&crate::reader::parse_ruleset(text))
    }

    /// Canonical text form.
    #[must_use]
    pub fn to_text(&self) -> String {
        crate::writer::write_ruleset(self)
    }

    /// Load a ruleset file with standard validation (async).
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, a value cannot be converted,
    /// or validation fails.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with_mode(path, ValidationMode::Standard).await
    }

    /// Load a ruleset file with a specific validation mode (async).
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, a value cannot be converted,
    /// or validation fails.
    pub async fn from_file_with_mode<P: AsRef<Path>>(path: P, mode: ValidationMode) -> Result<Self> {
        let path = path.as_ref();

        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| errors::io_read_error("load_ruleset", path, e))?;

        let config = Self::from_text(&contents)?;
        config.validate_with_mode(mode)?;

        tracing::debug!(
            path = %path.display(),
            rules = config.rules.len(),
            "loaded ruleset"
        );
        Ok(config)
    }

    /// Validate and write the canonical text to a file (async).
    ///
    /// # Errors
    ///
    /// Returns error if validation fails or the file cannot be written.
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.validate()?;

        if self.rules.len() > 1 {
            tracing::warn!(
                rules = self.rules.len(),
                written = self.rules.primary_key(),
                "only the first rule is written to ruleset text"
            );
        }

        tokio::fs::write(path, self.to_text())
            .await
            .map_err(|e| errors::io_write_error("save_ruleset", path, e))
    }

    /// Validate configuration (standard mode).
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        self.validate_with_mode(ValidationMode::Standard)
    }

    /// Validate configuration with a specific mode.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate_with_mode(&self, mode: ValidationMode) -> Result<()> {
        self.deduplication.validate(mode)?;
        self.validate_rules(mode)
    }

    fn validate_rules(&self, mode: ValidationMode) -> Result<()> {
        if mode != ValidationMode::Strict {
            return Ok(());
        }

        if self.rules.is_empty() {
            return Err(errors::missing_required("validate_rules", "rules"));
        }

        for (id, rule) in self.rules.iter() {
            if rule.description.trim().is_empty() {
                return Err(errors::missing_required(
                    "validate_rules",
                    &format!("rules.{id}.description"),
                ));
            }
        }

        Ok(())
    }

    /// Display percentage of catching a pair at the similarity threshold.
    #[must_use]
    pub fn candidate_probability_percent(&self) -> f64 {
        self.deduplication
            .lsh_params()
            .candidate_probability_percent(self.deduplication.similarity_threshold)
    }
}
