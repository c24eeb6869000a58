//! Rule definitions reported when a duplicate is detected.

use crate::defaults::*;
use crate::document::{OrderedMap, RuleFields};
use crate::errors::ConversionError;
use crate::Result;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Severity reported by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocking finding.
    #[default]
    Error,
    /// Non-blocking finding.
    Warn,
    /// Informational finding.
    Info,
}

impl Severity {
    /// Accepted spellings, in declaration order.
    pub const NAMES: [&'static str; 3] = ["error", "warn", "info"];

    /// Text form used in ruleset documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
        }
    }

    /// Parse the text form.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "error" => Some(Self::Error),
            "warn" => Some(Self::Warn),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Short description shown next to the rule id.
    #[serde(default)]
    pub description: String,

    /// Severity of findings raised by this rule.
    #[serde(default = "default_severity")]
    pub severity: Severity,

    /// Message attached to each finding. Stored on one line.
    #[serde(default)]
    pub message: String,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            description: default_rule_description(),
            severity: default_severity(),
            message: default_rule_message(),
        }
    }
}

impl Rule {
    /// Build a rule from the raw fields of a parsed document.
    ///
    /// Missing text fields become empty; a missing severity becomes `error`.
    ///
    /// # Errors
    ///
    /// Returns error if `severity` is present but not a known level.
    pub fn from_fields(rule_id: &str, fields: &RuleFields) -> Result<Self> {
        let severity = match fields.get("severity") {
            Some(raw) => Severity::from_name(raw).ok_or_else(|| {
                ConversionError::unknown_variant(
                    &format!("rules.{rule_id}.severity"),
                    raw,
                    &Severity::NAMES,
                )
            })?,
            None => default_severity(),
        };

        Ok(Self {
            description: fields.get("description").cloned().unwrap_or_default(),
            severity,
            message: fields.get("message").cloned().unwrap_or_default(),
        })
    }
}

/// Ordered mapping from rule id to [`Rule`].
///
/// Every entry is kept, but only the first one is written back to text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleSet {
    rules: OrderedMap<Rule>,
}

impl RuleSet {
    /// Empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rule set holding only the default rule under [`DEFAULT_RULE_KEY`].
    #[must_use]
    pub fn with_default_rule() -> Self {
        let mut set = Self::new();
        set.insert(DEFAULT_RULE_KEY, Rule::default());
        set
    }

    /// Convert every rule of a parsed document, preserving order.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error encountered.
    pub fn from_document(rules: &OrderedMap<RuleFields>) -> Result<Self> {
        let mut set = Self::new();
        for (id, fields) in rules.iter() {
            set.insert(id, Rule::from_fields(id, fields)?);
        }
        Ok(set)
    }

    /// Insert or replace a rule.
    pub fn insert(&mut self, id: impl Into<String>, rule: Rule) -> Option<Rule> {
        self.rules.insert(id, rule)
    }

    /// Remove a rule.
    pub fn remove(&mut self, id: &str) -> Option<Rule> {
        self.rules.remove(id)
    }

    /// Look up a rule.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.get(id)
    }

    /// Look up a rule mutably.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Rule> {
        self.rules.get_mut(id)
    }

    /// First rule in insertion order; the one the writer emits.
    #[must_use]
    pub fn primary(&self) -> Option<(&str, &Rule)> {
        self.rules.first()
    }

    /// Mutable access to the first rule, creating the default rule when the
    /// set is empty.
    pub fn primary_mut(&mut self) -> &mut Rule {
        self.rules.first_or_insert_with(DEFAULT_RULE_KEY, Rule::default)
    }

    /// Id of the first rule, or [`DEFAULT_RULE_KEY`] when empty.
    #[must_use]
    pub fn primary_key(&self) -> &str {
        self.rules.first().map_or(DEFAULT_RULE_KEY, |(id, _)| id)
    }

    /// Rules in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.rules.iter()
    }

    /// Rule ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rules.keys()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (id, rule) in self.iter() {
            map.serialize_entry(id, rule)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RuleSetVisitor;

        impl<'de> Visitor<'de> for RuleSetVisitor {
            type Value = RuleSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of rule id to rule")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<RuleSet, A::Error> {
                let mut set = RuleSet::new();
                while let Some((id, rule)) = access.next_entry::<String, Rule>()? {
                    set.insert(id, rule);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(RuleSetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> RuleFields {
        pairs.iter().map(|(k, v)| (*k, (*v).to_owned())).collect()
    }

    #[test]
    fn test_severity_names_roundtrip() {
        for name in Severity::NAMES {
            let severity = Severity::from_name(name).expect("known severity");
            assert_eq!(severity.as_str(), name);
            assert_eq!(severity.to_string(), name);
        }
        assert!(Severity::from_name("critical").is_none());
    }

    #[test]
    fn test_rule_from_fields_defaults_severity() {
        let rule = Rule::from_fields("r", &fields(&[("description", "d")])).expect("rule");
        assert_eq!(rule.severity, Severity::Error);
        assert_eq!(rule.description, "d");
        assert!(rule.message.is_empty());
    }

    #[test]
    fn test_rule_from_fields_rejects_unknown_severity() {
        let err = Rule::from_fields("r", &fields(&[("severity", "fatal")])).unwrap_err();
        assert_eq!(err.field(), Some("rules.r.severity"));
    }

    #[test]
    fn test_primary_key_falls_back_to_default() {
        let set = RuleSet::new();
        assert_eq!(set.primary_key(), DEFAULT_RULE_KEY);
        assert!(set.primary().is_none());
    }

    #[test]
    fn test_primary_mut_creates_default_rule() {
        let mut set = RuleSet::new();
        set.primary_mut().severity = Severity::Info;
        assert_eq!(set.len(), 1);
        assert_eq!(set.primary_key(), DEFAULT_RULE_KEY);
        assert_eq!(set.get(DEFAULT_RULE_KEY).map(|r| r.severity), Some(Severity::Info));
    }

    #[test]
    fn test_from_document_keeps_every_rule() {
        let mut doc = OrderedMap::new();
        doc.insert("second", fields(&[("severity", "warn")]));
        doc.insert("first", fields(&[("severity", "info")]));
        let set = RuleSet::from_document(&doc).expect("rules");
        assert_eq!(set.ids().collect::<Vec<_>>(), vec!["second", "first"]);
        assert_eq!(set.primary_key(), "second");
    }

    #[test]
    fn test_serde_preserves_rule_order() {
        let mut set = RuleSet::new();
        set.insert("zeta", Rule::default());
        set.insert("alpha", Rule::default());

        let json = serde_json::to_string(&set).expect("serialize");
        assert!(json.find("zeta").expect("zeta") < json.find("alpha").expect("alpha"));

        let back: RuleSet = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, set);
    }
}
