//! Tokenized log lines.
//!
//! A [`LogLine`] is the immutable output of the tokenizer: the timestamp prefix followed
//! by an ordered sequence of elements. Each element keeps the exact text that preceded it
//! and its own exact source text, so concatenating them reproduces the input line byte
//! for byte regardless of quoting or escaping.

use crate::model::timestamp::Timestamp;
use std::fmt;

/// What a single element of a log line holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// A bare token not in `name=value` form.
    Unnamed {
        /// The token with any surrounding quotes removed and escapes resolved.
        value: String,
    },
    /// A `name=value` token.
    Named {
        /// Field name.
        name: String,
        /// Field value with quotes removed and escapes resolved.
        value: String,
        /// Whether the value was double-quoted in the source.
        quoted: bool,
    },
}

/// One element of a log line plus the exact text needed to reproduce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogElement {
    separator: String,
    raw: String,
    kind: ElementKind,
}

impl LogElement {
    pub(crate) fn new(separator: impl Into<String>, raw: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            separator: separator.into(),
            raw: raw.into(),
            kind,
        }
    }

    /// The text between the previous element (or the timestamp) and this one.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// The exact source text of this element.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The parsed content.
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Field name, for named elements.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Named { name, .. } => Some(name),
            ElementKind::Unnamed { .. } => None,
        }
    }

    /// The unquoted, unescaped value.
    pub fn value(&self) -> &str {
        match &self.kind {
            ElementKind::Named { value, .. } | ElementKind::Unnamed { value } => value,
        }
    }

    /// Whether this element was a double-quoted `name="value"` pair.
    pub fn is_quoted(&self) -> bool {
        matches!(self.kind, ElementKind::Named { quoted: true, .. })
    }
}

/// A tokenized log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    prefix: String,
    timestamp: Timestamp,
    elements: Vec<LogElement>,
    trailing: String,
}

impl LogLine {
    pub(crate) fn new(
        prefix: impl Into<String>,
        timestamp: Timestamp,
        elements: Vec<LogElement>,
        trailing: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            timestamp,
            elements,
            trailing: trailing.into(),
        }
    }

    /// The exact leading text holding the timestamp (for example `[24/Aug/2018:12:11:50 -0500]`).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The parsed timestamp.
    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    /// All elements in source order.
    pub fn elements(&self) -> &[LogElement] {
        &self.elements
    }

    /// Whitespace or delimiters after the last element.
    pub fn trailing(&self) -> &str {
        &self.trailing
    }

    /// Unnamed element values in source order.
    pub fn unnamed_values(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match &e.kind {
            ElementKind::Unnamed { value } => Some(value.as_str()),
            ElementKind::Named { .. } => None,
        })
    }

    /// Named `(name, value)` pairs in source order, duplicates included.
    pub fn named_values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.elements.iter().filter_map(|e| match &e.kind {
            ElementKind::Named { name, value, .. } => Some((name.as_str(), value.as_str())),
            ElementKind::Unnamed { .. } => None,
        })
    }

    /// Reassemble the exact source line.
    pub fn format(&self) -> String {
        let capacity = self.prefix.len()
            + self.trailing.len()
            + self
                .elements
                .iter()
                .map(|e| e.separator.len() + e.raw.len())
                .sum::<usize>();

        let mut out = String::with_capacity(capacity);
        out.push_str(&self.prefix);
        for element in &self.elements {
            out.push_str(&element.separator);
            out.push_str(&element.raw);
        }
        out.push_str(&self.trailing);
        out
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}
