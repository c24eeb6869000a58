//! Loose, untyped view of a ruleset document as the reader sees it.
//!
//! Values keep whatever shape the text had. Turning them into a typed
//! [`crate::RulesetConfig`] happens in [`crate::RulesetConfig::from_document`].

use std::fmt;

/// Scalar value read from a `key: value` line.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// `true` or `false`.
    Bool(bool),
    /// One or more digits.
    Integer(i64),
    /// Digits, a decimal point, digits.
    Float(f64),
    /// Anything else, trimmed.
    String(String),
}

impl Scalar {
    /// Coerce a raw value token.
    ///
    /// Precedence: boolean literal, float, integer, string.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        let token = raw.trim();
        match token {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }

        if is_decimal(token) {
            if let Ok(value) = token.parse::<f64>() {
                return Self::Float(value);
            }
        }

        if is_digits(token) {
            return match token.parse::<i64>() {
                Ok(value) => Self::Integer(value),
                // Too large for i64; digits always parse as f64.
                Err(_) => token
                    .parse::<f64>()
                    .map_or_else(|_| Self::String(token.to_owned()), Self::Float),
            };
        }

        Self::String(token.to_owned())
    }

    /// Type name used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }

    /// Boolean value, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Real value. Integers widen to `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Integer value, if this is an integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// String value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal(token: &str) -> bool {
    match token.split_once('.') {
        Some((whole, frac)) => is_digits(whole) && is_digits(frac),
        None => false,
    }
}

/// Insertion-ordered string-keyed map.
///
/// Re-inserting an existing key replaces the value in place, so the first
/// key stays first.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    /// Empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        if let Some(slot) = self.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up a value mutably.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Remove a key, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Whether the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// First entry in insertion order.
    #[must_use]
    pub fn first(&self) -> Option<(&str, &V)> {
        self.entries.first().map(|(k, v)| (k.as_str(), v))
    }

    /// Mutable first entry in insertion order.
    pub fn first_mut(&mut self) -> Option<(&str, &mut V)> {
        self.entries.first_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// First value, inserting `key` with a computed value when the map is empty.
    pub fn first_or_insert_with(&mut self, key: impl Into<String>, f: impl FnOnce() -> V) -> &mut V {
        if self.entries.is_empty() {
            self.entries.push((key.into(), f()));
        }
        &mut self.entries[0].1
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V> IntoIterator for OrderedMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Fields of a single rule, as read.
pub type RuleFields = OrderedMap<String>;

/// Parsed ruleset document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RulesetDocument {
    /// Scalar settings under `deduplication:`.
    pub deduplication: OrderedMap<Scalar>,
    /// Rules under `rules:`, keyed by rule id.
    pub rules: OrderedMap<RuleFields>,
}

impl RulesetDocument {
    /// Parse possibly-absent text. Absent or empty text gives an empty document.
    #[must_use]
    pub fn from_text(text: Option<&str>) -> Self {
        text.map(crate::reader::parse_ruleset).unwrap_or_default()
    }

    /// Whether nothing at all was read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deduplication.is_empty() && self.rules.is_empty()
    }
}
