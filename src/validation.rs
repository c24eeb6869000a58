//! Validation modes and configuration diffing for change tracking.

use crate::RulesetConfig;
use std::collections::HashSet;

/// Validation strictness level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Range and consistency checks only.
    #[default]
    Standard,

    /// Also requires bands to divide hash functions and every rule to be
    /// described.
    Strict,
}

/// Change detected between two configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesetChange {
    /// A deduplication setting changed
    SettingChanged {
        /// Dotted field path
        field: String,
        /// Previous value, rendered
        old: String,
        /// New value, rendered
        new: String,
    },

    /// Rules present only in the newer configuration
    RulesAdded {
        /// Added rule ids, in insertion order
        ids: Vec<String>,
    },

    /// Rules present only in the older configuration
    RulesRemoved {
        /// Removed rule ids, in insertion order
        ids: Vec<String>,
    },

    /// A field of a rule present in both changed
    RuleChanged {
        /// Rule id
        id: String,
        /// Changed rule field
        field: String,
    },
}

impl RulesetConfig {
    /// Diff this configuration against a newer one.
    #[must_use]
    pub fn diff(&self, other: &RulesetConfig) -> Vec<RulesetChange> {
        let mut changes = Vec::new();
        let (a, b) = (&self.deduplication, &other.deduplication);

        let settings = [
            ("enabled", a.enabled.to_string(), b.enabled.to_string()),
            (
                "similarity_threshold",
                a.similarity_threshold.to_string(),
                b.similarity_threshold.to_string(),
            ),
            (
                "high_confidence_threshold",
                a.high_confidence_threshold.to_string(),
                b.high_confidence_threshold.to_string(),
            ),
            ("mode", a.mode.to_string(), b.mode.to_string()),
            (
                "num_hash_functions",
                a.num_hash_functions.to_string(),
                b.num_hash_functions.to_string(),
            ),
            ("num_bands", a.num_bands.to_string(), b.num_bands.to_string()),
            ("shingle_size", a.shingle_size.to_string(), b.shingle_size.to_string()),
        ];

        for (field, old, new) in settings {
            if old != new {
                changes.push(RulesetChange::SettingChanged {
                    field: format!("deduplication.{field}"),
                    old,
                    new,
                });
            }
        }

        let old_ids: HashSet<&str> = self.rules.ids().collect();
        let new_ids: HashSet<&str> = other.rules.ids().collect();

        // Keep insertion order in the reported lists.
        let added: Vec<String> = other
            .rules
            .ids()
            .filter(|id| !old_ids.contains(id))
            .map(str::to_owned)
            .collect();
        let removed: Vec<String> = self
            .rules
            .ids()
            .filter(|id| !new_ids.contains(id))
            .map(str::to_owned)
            .collect();

        if !added.is_empty() {
            changes.push(RulesetChange::RulesAdded { ids: added });
        }
        if !removed.is_empty() {
            changes.push(RulesetChange::RulesRemoved { ids: removed });
        }

        for (id, old_rule) in self.rules.iter() {
            let Some(new_rule) = other.rules.get(id) else {
                continue;
            };
            for (field, differs) in [
                ("description", old_rule.description != new_rule.description),
                ("severity", old_rule.severity != new_rule.severity),
                ("message", old_rule.message != new_rule.message),
            ] {
                if differs {
                    changes.push(RulesetChange::RuleChanged {
                        id: id.to_owned(),
                        field: field.to_owned(),
                    });
                }
            }
        }

        changes
    }
}
