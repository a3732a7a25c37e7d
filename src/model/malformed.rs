//! Records that could not be parsed.
//!
//! Sources keep reading after a bad record; each failure becomes a [`MalformedRecord`]
//! that callers can report or skip.

use crate::model::error::ParseError;

/// A log record that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    line_number: usize,
    raw: String,
    error: ParseError,
}

impl MalformedRecord {
    /// Create a new malformed record.
    ///
    /// # Arguments
    ///
    /// * `line_number` - Line number of the record's first line (1-indexed)
    /// * `raw` - The raw record text that failed to parse
    /// * `error` - Why it failed
    pub fn new(line_number: usize, raw: impl Into<String>, error: ParseError) -> Self {
        Self {
            line_number,
            raw: raw.into(),
            error,
        }
    }

    /// Line number of the record's first line.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// The raw record text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The parse failure.
    pub fn error(&self) -> &ParseError {
        &self.error
    }
}
