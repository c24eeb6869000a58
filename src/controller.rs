//! Session state for a ruleset editor.
//!
//! A [`RulesetController`] owns one configuration and the text it last
//! emitted. External text is applied with [`RulesetController::apply_external`];
//! local edits go through [`RulesetController::edit`] (or a setter), which
//! writes the new text to the sink. Text identical to the last emission is
//! recognised as our own echo and skipped, so a host that feeds the emitted
//! text straight back does not clobber edits in progress.

use crate::config::{DedupMode, RulesetConfig};
use crate::rules::Severity;
use crate::Result;

/// Receiver of serialized ruleset text.
pub trait RulesetSink {
    /// Called with the full document after every local edit.
    fn emit(&mut self, text: &str);
}

impl<F: FnMut(&str)> RulesetSink for F {
    fn emit(&mut self, text: &str) {
        self(text);
    }
}

/// Outcome of [`RulesetController::apply_external`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalUpdate {
    /// The configuration was replaced.
    Replaced,
    /// Text matched our last emission.
    OwnEcho,
    /// Text was absent or blank.
    Empty,
}

/// Owns one configuration and its last emitted text.
pub struct RulesetController<S: RulesetSink> {
    config: RulesetConfig,
    last_emitted: Option<String>,
    sink: S,
}

impl<S: RulesetSink> std::fmt::Debug for RulesetController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulesetController")
            .field("config", &self.config)
            .field("last_emitted", &self.last_emitted)
            .finish_non_exhaustive()
    }
}

impl<S: RulesetSink> RulesetController<S> {
    /// Start a session with the default configuration.
    pub fn new(sink: S) -> Self {
        Self::with_config(RulesetConfig::default(), sink)
    }

    /// Start a session with a given configuration.
    pub fn with_config(config: RulesetConfig, sink: S) -> Self {
        Self {
            config,
            last_emitted: None,
            sink,
        }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &RulesetConfig {
        &self.config
    }

    /// Text most recently handed to the sink.
    #[must_use]
    pub fn last_emitted(&self) -> Option<&str> {
        self.last_emitted.as_deref()
    }

    /// The sink, for hosts that need to inspect it.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the controller, returning its configuration and sink.
    pub fn into_parts(self) -> (RulesetConfig, S) {
        (self.config, self.sink)
    }

    /// Apply text coming from the document owner.
    ///
    /// Our own last emission and blank text leave state untouched. Anything
    /// else replaces the configuration wholesale. The sink is never called.
    ///
    /// # Errors
    ///
    /// Returns error if the text holds values that cannot be converted; the
    /// previous configuration is kept.
    pub fn apply_external(&mut self, text: Option<&str>) -> Result<ExternalUpdate> {
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            return Ok(ExternalUpdate::Empty);
        };

        if self.last_emitted.as_deref() == Some(text) {
            tracing::debug!("skipping reparse of own ruleset output");
            return Ok(ExternalUpdate::OwnEcho);
        }

        let config = RulesetConfig::from_text(text).map_err(|e| {
            tracing::warn!(error = %e, "failed to load external ruleset, keeping current configuration");
            e
        })?;

        let changes = self.config.diff(&config);
        tracing::info!(changes = changes.len(), rules = config.rules.len(), "ruleset replaced from external text");
        for change in &changes {
            tracing::debug!(?change, "ruleset change");
        }

        self.config = config;
        Ok(ExternalUpdate::Replaced)
    }

    /// Apply a local edit, then serialize and emit.
    ///
    /// Every edit is written and handed to the sink, including ones that
    /// leave the configuration invalid (more bands than hash functions, a
    /// similarity threshold above the high-confidence one). Such edits are
    /// logged; use [`validate`](Self::validate) to surface them.
    pub fn edit<F: FnOnce(&mut RulesetConfig)>(&mut self, f: F) {
        f(&mut self.config);

        if let Err(e) = self.config.validate() {
            tracing::warn!(error = %e, "emitting ruleset that fails validation");
        }

        let text = self.config.to_text();
        tracing::debug!(bytes = text.len(), "emitting ruleset");
        self.sink.emit(&text);
        self.last_emitted = Some(text);
    }

    /// Validate the current configuration (standard mode).
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        self.config.validate()
    }

    /// Set `deduplication.enabled`.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.edit(|c| c.deduplication.enabled = enabled);
    }

    /// Set `deduplication.similarity_threshold`.
    pub fn set_similarity_threshold(&mut self, value: f64) {
        self.edit(|c| c.deduplication.similarity_threshold = value);
    }

    /// Set `deduplication.high_confidence_threshold`.
    pub fn set_high_confidence_threshold(&mut self, value: f64) {
        self.edit(|c| c.deduplication.high_confidence_threshold = value);
    }

    /// Set `deduplication.mode`.
    pub fn set_mode(&mut self, mode: DedupMode) {
        self.edit(|c| c.deduplication.mode = mode);
    }

    /// Set `deduplication.num_hash_functions`.
    pub fn set_num_hash_functions(&mut self, value: u32) {
        self.edit(|c| c.deduplication.num_hash_functions = value);
    }

    /// Set `deduplication.num_bands`.
    pub fn set_num_bands(&mut self, value: u32) {
        self.edit(|c| c.deduplication.num_bands = value);
    }

    /// Set `deduplication.shingle_size`.
    pub fn set_shingle_size(&mut self, value: u32) {
        self.edit(|c| c.deduplication.shingle_size = value);
    }

    /// Set the description of the written rule.
    pub fn set_rule_description(&mut self, description: impl Into<String>) {
        let description = description.into();
        self.edit(|c| c.rules.primary_mut().description = description);
    }

    /// Set the severity of the written rule.
    pub fn set_rule_severity(&mut self, severity: Severity) {
        self.edit(|c| c.rules.primary_mut().severity = severity);
    }

    /// Set the message of the written rule.
    pub fn set_rule_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.edit(|c| c.rules.primary_mut().message = message);
    }

    /// Display percentage of catching a pair at the current threshold.
    #[must_use]
    pub fn probability_percent(&self) -> f64 {
        self.config.candidate_probability_percent()
    }
}
