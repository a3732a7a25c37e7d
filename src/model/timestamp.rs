//! Log record timestamps.
//!
//! Server log records carry a timestamp of the form `dd/MMM/yyyy:HH:mm:ss Z`, optionally
//! with a millisecond component (`dd/MMM/yyyy:HH:mm:ss.SSS Z`). The raw text is kept
//! verbatim so that reformatting a record never changes it; equality is string identity.

use crate::model::error::ParseError;
use chrono::{DateTime, FixedOffset};
use std::fmt;

const FORMAT_WITHOUT_FRACTION: &str = "%d/%b/%Y:%H:%M:%S %z";
const FORMAT_WITH_FRACTION: &str = "%d/%b/%Y:%H:%M:%S%.f %z";

/// A parsed log timestamp that remembers its exact source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Timestamp {
    raw: String,
    value: DateTime<FixedOffset>,
}

impl Timestamp {
    /// Parse a timestamp body (the text between the brackets, brackets excluded).
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MalformedTimestamp` if the text is not a valid timestamp.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let format = if raw.contains('.') {
            FORMAT_WITH_FRACTION
        } else {
            FORMAT_WITHOUT_FRACTION
        };

        let value = DateTime::parse_from_str(raw, format).map_err(|_| {
            ParseError::MalformedTimestamp {
                raw: raw.to_string(),
            }
        })?;

        Ok(Self {
            raw: raw.to_string(),
            value,
        })
    }

    /// Build a timestamp for a point in time, using the millisecond format.
    pub fn from_datetime(value: DateTime<FixedOffset>) -> Self {
        Self {
            raw: value.format("%d/%b/%Y:%H:%M:%S%.3f %z").to_string(),
            value,
        }
    }

    /// The exact source text, without brackets.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The point in time this timestamp denotes.
    pub fn value(&self) -> DateTime<FixedOffset> {
        self.value
    }

    /// Whether the source text carried a sub-second component.
    pub fn has_fraction(&self) -> bool {
        self.raw.contains('.')
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
