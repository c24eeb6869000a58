//! Centralized error definitions and helpers for dedup-ruleset.
//!
//! The reader never fails. Everything that can fail (typed conversion,
//! validation, file I/O) reports a [`RulesetError`] built through the helpers
//! below, so field names and operations are attached the same way everywhere.

use std::path::{Path, PathBuf};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RulesetError>;

/// Errors raised by the typed configuration layer and file helpers.
#[derive(Debug, thiserror::Error)]
pub enum RulesetError {
    /// A field holds a value of the wrong type or an unknown variant.
    #[error("Configuration invalid value for {field} ({operation}): {reason}")]
    InvalidValue {
        /// Operation that rejected the value.
        operation: String,
        /// Dotted field path.
        field: String,
        /// Human-readable reason.
        reason: String,
    },

    /// A numeric field is outside its accepted range.
    #[error("Configuration {field} out of range ({operation}): got {actual}, expected {expected}")]
    OutOfRange {
        /// Operation that rejected the value.
        operation: String,
        /// Dotted field path.
        field: String,
        /// Rendered actual value.
        actual: String,
        /// Rendered accepted range.
        expected: String,
    },

    /// A required field or collection is empty.
    #[error("Configuration missing required {field} ({operation})")]
    MissingRequired {
        /// Operation that required the field.
        operation: String,
        /// Dotted field path.
        field: String,
    },

    /// File read or write failed.
    #[error("I/O failure during {operation} on {}: {source}", path.display())]
    Io {
        /// Operation being performed.
        operation: String,
        /// File involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl RulesetError {
    /// Dotted field path this error refers to, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidValue { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::MissingRequired { field, .. } => Some(field),
            Self::Io { .. } => None,
        }
    }
}

// ============================================================================
// ERROR CONSTRUCTION HELPERS
// ============================================================================

/// Field has a value of the wrong shape.
#[inline]
pub(crate) fn invalid_value(
    operation: &str,
    field: &str,
    reason: impl Into<String>,
) -> RulesetError {
    RulesetError::InvalidValue {
        operation: operation.to_owned(),
        field: field.to_owned(),
        reason: reason.into(),
    }
}

/// Required field is missing or empty.
#[inline]
pub(crate) fn missing_required(operation: &str, field: &str) -> RulesetError {
    RulesetError::MissingRequired {
        operation: operation.to_owned(),
        field: field.to_owned(),
    }
}

/// File read failed.
#[inline]
pub(crate) fn io_read_error<P: AsRef<Path>>(
    operation: &str,
    path: P,
    error: std::io::Error,
) -> RulesetError {
    RulesetError::Io {
        operation: operation.to_owned(),
        path: path.as_ref().to_path_buf(),
        source: error,
    }
}

/// File write failed.
#[inline]
pub(crate) fn io_write_error<P: AsRef<Path>>(
    operation: &str,
    path: P,
    error: std::io::Error,
) -> RulesetError {
    RulesetError::Io {
        operation: operation.to_owned(),
        path: path.as_ref().to_path_buf(),
        source: error,
    }
}

// ============================================================================
// VALIDATION ERROR BUILDERS
// ============================================================================

/// Builder for range validation errors.
pub(crate) struct RangeValidationError;

impl RangeValidationError {
    /// Value is below minimum.
    #[inline]
    pub fn below_minimum<T: ToString>(
        field: &str,
        actual: T,
        minimum: T,
        operation: &str,
    ) -> RulesetError {
        RulesetError::OutOfRange {
            operation: operation.to_owned(),
            field: field.to_owned(),
            actual: actual.to_string(),
            expected: format!("minimum: {}", minimum.to_string()),
        }
    }

    /// Value is above maximum.
    #[inline]
    pub fn above_maximum<T: ToString>(
        field: &str,
        actual: T,
        maximum: T,
        operation: &str,
    ) -> RulesetError {
        RulesetError::OutOfRange {
            operation: operation.to_owned(),
            field: field.to_owned(),
            actual: actual.to_string(),
            expected: format!("maximum: {}", maximum.to_string()),
        }
    }

    /// Value is outside valid range.
    #[inline]
    pub fn out_of_range<T: ToString>(
        field: &str,
        actual: T,
        min: T,
        max: T,
        operation: &str,
    ) -> RulesetError {
        RulesetError::OutOfRange {
            operation: operation.to_owned(),
            field: field.to_owned(),
            actual: actual.to_string(),
            expected: format!("{}-{}", min.to_string(), max.to_string()),
        }
    }
}

/// Builder for errors raised while converting a parsed document.
pub(crate) struct ConversionError;

impl ConversionError {
    /// Scalar has the wrong type for the target field.
    #[inline]
    pub fn wrong_type(field: &str, expected: &str, found: &str) -> RulesetError {
        invalid_value(
            "convert_document",
            field,
            format!("expected {expected}, found {found}"),
        )
    }

    /// String is not one of the accepted enum variants.
    #[inline]
    pub fn unknown_variant(field: &str, value: &str, accepted: &[&str]) -> RulesetError {
        invalid_value(
            "convert_document",
            field,
            format!("unknown value '{}', expected one of: {}", value, accepted.join(", ")),
        )
    }
}
