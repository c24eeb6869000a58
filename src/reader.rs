//! Restricted line reader for ruleset documents.
//!
//! Understands exactly two top-level sections:
//!
//! ```text
//! deduplication:
//!   key: value
//! rules:
//!   rule-id:
//!     key: value
//!     message: >-
//!       folded text
//!       more folded text
//! ```
//!
//! No nesting beyond that, no lists, anchors or flow collections. Lines that
//! match nothing are skipped; the reader has no failure mode.

use crate::document::{RuleFields, RulesetDocument, Scalar};

/// Section holding scalar deduplication settings.
pub const DEDUPLICATION_SECTION: &str = "deduplication";
/// Section holding rule definitions.
pub const RULES_SECTION: &str = "rules";

/// Values that open a block scalar instead of carrying a value.
const BLOCK_MARKERS: [&str; 3] = [">-", ">", "|"];

const RULE_HEADER_INDENT: usize = 2;
const RULE_FIELD_INDENT: usize = 4;
const BLOCK_CONTINUATION_INDENT: usize = 6;

/// Parse ruleset text into a loose document.
#[must_use]
pub fn parse_ruleset(text: &str) -> RulesetDocument {
    let mut reader = Reader::default();
    for line in text.lines() {
        reader.feed(line);
    }
    reader.finish()
}

/// Block scalar being collected for a rule field.
#[derive(Debug)]
struct PendingBlock {
    key: String,
    text: String,
}

impl PendingBlock {
    fn push_line(&mut self, line: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(line);
    }
}

#[derive(Debug, Default)]
struct Reader {
    doc: RulesetDocument,
    section: Option<String>,
    rule: Option<String>,
    pending: Option<PendingBlock>,
}

impl Reader {
    fn feed(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }
        let indent = leading_spaces(line);

        if indent == 0 && trimmed.ends_with(':') {
            self.flush_pending();
            self.section = Some(strip_colon(trimmed).to_owned());
            self.rule = None;
            return;
        }

        match self.section.as_deref() {
            Some(DEDUPLICATION_SECTION) => self.feed_deduplication(indent, trimmed),
            Some(RULES_SECTION) => self.feed_rules(indent, trimmed),
            _ => {}
        }
    }

    fn feed_deduplication(&mut self, indent: usize, trimmed: &str) {
        if indent < 2 {
            return;
        }
        if let Some((key, value)) = split_key_value(trimmed) {
            self.doc.deduplication.insert(key, Scalar::coerce(value));
        }
    }

    fn feed_rules(&mut self, indent: usize, trimmed: &str) {
        if let Some(block) = self.pending.as_mut() {
            if indent >= BLOCK_CONTINUATION_INDENT {
                block.push_line(trimmed);
                return;
            }
            let ends_block = indent <= RULE_FIELD_INDENT
                && (split_key_value(trimmed).is_some() || is_rule_header(indent, trimmed));
            if !ends_block {
                return;
            }
            self.flush_pending();
        }

        if is_rule_header(indent, trimmed) {
            self.flush_pending();
            let id = strip_colon(trimmed).to_owned();
            self.doc.rules.insert(id.clone(), RuleFields::new());
            self.rule = Some(id);
            return;
        }

        if indent >= RULE_FIELD_INDENT {
            let Some((key, value)) = split_key_value(trimmed) else {
                return;
            };
            if BLOCK_MARKERS.contains(&value) {
                self.pending = Some(PendingBlock {
                    key: key.to_owned(),
                    text: String::new(),
                });
            } else if let Some(fields) = self.current_rule_mut() {
                fields.insert(key, value.to_owned());
            }
        }
    }

    fn current_rule_mut(&mut self) -> Option<&mut RuleFields> {
        let id = self.rule.as_deref()?;
        self.doc.rules.get_mut(id)
    }

    fn flush_pending(&mut self) {
        let Some(block) = self.pending.take() else {
            return;
        };
        if let Some(fields) = self.current_rule_mut() {
            fields.insert(block.key, block.text);
        }
    }

    fn finish(mut self) -> RulesetDocument {
        self.flush_pending();
        self.doc
    }
}

fn leading_spaces(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ').count()
}

fn is_rule_header(indent: usize, trimmed: &str) -> bool {
    indent == RULE_HEADER_INDENT && trimmed.ends_with(':')
}

fn strip_colon(trimmed: &str) -> &str {
    trimmed.strip_suffix(':').unwrap_or(trimmed).trim()
}

/// Split `key: value` where the key is `[A-Za-z0-9_-]+`. The value is trimmed
/// and may be empty.
fn split_key_value(trimmed: &str) -> Option<(&str, &str)> {
    let (key, value) = trimmed.split_once(':')?;
    let valid_key = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    valid_key.then(|| (key, value.trim()))
}
