//! Canonical writer for ruleset documents.
//!
//! Output always has the same shape and key order:
//!
//! ```text
//! deduplication:
//!   enabled: true
//!   similarity_threshold: 0.85
//!   high_confidence_threshold: 0.95
//!   mode: warn
//!   num_hash_functions: 128
//!   num_bands: 16
//!   shingle_size: 3
//! rules:
//!   api-deduplication-check:
//!     description: ...
//!     severity: error
//!     message: >-
//!       ...
//! ```
//!
//! Only the first rule is written. Strings are written verbatim; a value
//! containing a newline, starting with a block marker, or (for the message)
//! starting with `#` will not read back the same. A `#` line is a comment to
//! the reader.

use crate::defaults::DEFAULT_RULE_KEY;
use crate::reader::{DEDUPLICATION_SECTION, RULES_SECTION};
use crate::rules::{Rule, Severity};
use crate::RulesetConfig;

/// Serialize a configuration to canonical ruleset text.
#[must_use]
pub fn write_ruleset(config: &RulesetConfig) -> String {
    let dedup = &config.deduplication;
    let blank = Rule {
        description: String::new(),
        severity: Severity::Error,
        message: String::new(),
    };
    let (rule_key, rule) = config.rules.primary().unwrap_or((DEFAULT_RULE_KEY, &blank));

    let mut out = String::with_capacity(384 + rule.description.len() + rule.message.len());

    section(&mut out, DEDUPLICATION_SECTION);
    field(&mut out, 2, "enabled", dedup.enabled);
    field(&mut out, 2, "similarity_threshold", unsigned_zero(dedup.similarity_threshold));
    field(
        &mut out,
        2,
        "high_confidence_threshold",
        unsigned_zero(dedup.high_confidence_threshold),
    );
    field(&mut out, 2, "mode", dedup.mode);
    field(&mut out, 2, "num_hash_functions", dedup.num_hash_functions);
    field(&mut out, 2, "num_bands", dedup.num_bands);
    field(&mut out, 2, "shingle_size", dedup.shingle_size);

    section(&mut out, RULES_SECTION);
    out.push_str("  ");
    out.push_str(rule_key);
    out.push_str(":\n");
    field(&mut out, 4, "description", &rule.description);
    field(&mut out, 4, "severity", rule.severity);
    field(&mut out, 4, "message", ">-");
    out.push_str("      ");
    out.push_str(&rule.message);
    out.push('\n');

    out
}

fn section(out: &mut String, name: &str) {
    out.push_str(name);
    out.push_str(":\n");
}

/// `-0.0` displays as `-0`, which the reader takes for a string.
#[inline]
fn unsigned_zero(value: f64) -> f64 {
    value + 0.0
}

fn field(out: &mut String, indent: usize, key: &str, value: impl std::fmt::Display) {
    out.extend(std::iter::repeat(' ').take(indent));
    out.push_str(key);
    out.push_str(": ");
    out.push_str(&value.to_string());
    out.push('\n');
}
