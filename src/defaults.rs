//! Default values for deduplication settings and rules.

use crate::{DedupMode, Severity};

/// Rule id written when the rule set is empty.
pub const DEFAULT_RULE_KEY: &str = "api-deduplication-check";

#[inline]
#[must_use]
pub(crate) fn default_true() -> bool {
    true
}

#[inline]
#[must_use]
pub(crate) fn default_similarity_threshold() -> f64 {
    0.85
}

#[inline]
#[must_use]
pub(crate) fn default_high_confidence_threshold() -> f64 {
    0.95
}

#[inline]
#[must_use]
pub(crate) fn default_mode() -> DedupMode {
    DedupMode::Warn
}

#[inline]
#[must_use]
pub(crate) fn default_num_hash_functions() -> u32 {
    128
}

#[inline]
#[must_use]
pub(crate) fn default_num_bands() -> u32 {
    16
}

#[inline]
#[must_use]
pub(crate) fn default_shingle_size() -> u32 {
    3
}

#[inline]
#[must_use]
pub(crate) fn default_severity() -> Severity {
    Severity::Error
}

#[inline]
#[must_use]
pub(crate) fn default_rule_description() -> String {
    "Detect duplicate or near-duplicate API operations".to_owned()
}

#[inline]
#[must_use]
pub(crate) fn default_rule_message() -> String {
    "This operation is similar to an existing operation. Consider reusing it instead of \
     defining a new one."
        .to_owned()
}
