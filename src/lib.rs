//! # dedup-ruleset
//!
//! **Reader, writer and tuning helpers for deduplication rulesets.**
//!
//! A ruleset is a small two-section text document:
//!
//! ```text
//! deduplication:
//!   enabled: true
//!   similarity_threshold: 0.85
//!   ...
//! rules:
//!   api-deduplication-check:
//!     description: ...
//!     severity: error
//!     message: >-
//!       ...
//! ```
//!
//! # Layers
//!
//! - [`reader::parse_ruleset`]: permissive line reader, never fails
//! - [`RulesetConfig`]: typed settings laid over defaults, with validation
//! - [`writer::write_ruleset`]: canonical single-rule writer
//! - [`lsh`]: candidate probability for the configured banding
//! - [`RulesetController`]: per-session state that ignores its own echoes
//!
//! ```
//! use dedup_ruleset::RulesetConfig;
//!
//! let config = RulesetConfig::from_text("deduplication:\n  num_bands: 32\n  num_hash_functions: 256\n")?;
//! assert_eq!(config.deduplication.lsh_params().rows_per_band(), 8);
//! # Ok::<(), dedup_ruleset::RulesetError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

// Core modules
mod config;
mod controller;
mod defaults;
mod document;
mod errors;
mod rules;
mod validation;

pub mod lsh;
pub mod reader;
pub mod writer;

// Re-export core types for public API
pub use config::{DedupMode, DeduplicationConfig, RulesetConfig};
pub use controller::{ExternalUpdate, RulesetController, RulesetSink};
pub use defaults::DEFAULT_RULE_KEY;
pub use document::{OrderedMap, RuleFields, RulesetDocument, Scalar};
pub use errors::{Result, RulesetError};
pub use lsh::LshParams;
pub use reader::parse_ruleset;
pub use rules::{Rule, RuleSet, Severity};
pub use validation::{RulesetChange, ValidationMode};
pub use writer::write_ruleset;
