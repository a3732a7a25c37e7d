//! The generic log message model.
//!
//! A [`LogMessage`] is an immutable record built once from a tokenized line: the
//! timestamp, the [`FieldSet`] of typed accessors, and the [`LogLine`] it came from.
//! `format()` reproduces the original line exactly; copying a message is a pure function
//! of the already-parsed state, never a re-parse.

use crate::model::error::ParseError;
use crate::model::fields::FieldSet;
use crate::model::line::LogLine;
use crate::model::timestamp::Timestamp;
use crate::parser;
use crate::syntax::registry::FieldRegistry;
use crate::syntax::render::JsonBuffer;
use crate::syntax::FieldTransform;
use std::fmt;

/// A parsed log message.
#[derive(Debug, Clone, PartialEq)]
pub struct LogMessage {
    line: LogLine,
    fields: FieldSet,
}

impl LogMessage {
    /// Parse a `[timestamp] ...` line.
    ///
    /// # Errors
    ///
    /// Returns the tokenizer's `ParseError` for a malformed line.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        parser::tokenize(line).map(Self::from_line)
    }

    /// Build a message from an already tokenized line.
    pub fn from_line(line: LogLine) -> Self {
        let fields = FieldSet::from_line(&line);
        Self { line, fields }
    }

    /// Build a message observably identical to `other`.
    pub fn copy_from(other: &LogMessage) -> Self {
        other.clone()
    }

    /// The message timestamp.
    pub fn timestamp(&self) -> &Timestamp {
        self.line.timestamp()
    }

    /// Typed field accessors.
    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// The tokenized source line.
    pub fn line(&self) -> &LogLine {
        &self.line
    }

    /// Unnamed tokens in source order.
    pub fn unnamed_values(&self) -> &[String] {
        self.fields.unnamed_values()
    }

    /// Raw value of a named field.
    pub fn get_raw_named_value(&self, key: &str) -> Option<&str> {
        self.fields.get_raw_named_value(key)
    }

    /// The exact source line.
    pub fn format(&self) -> String {
        self.line.format()
    }

    /// Render the message as a JSON object.
    ///
    /// The object has a `timestamp` string, an `unnamed` array and a `fields` object in
    /// which every named value is sanitized through the syntax `registry` assigns to it.
    pub fn to_json(&self, registry: &FieldRegistry) -> String {
        let mut json = JsonBuffer::new();
        json.begin_object(None);
        json.append_string(Some("timestamp"), self.timestamp().as_str());

        json.begin_array(Some("unnamed"));
        for value in self.unnamed_values() {
            registry
                .default_syntax()
                .append_transformed_json(None, value, FieldTransform::Sanitize, &[], &mut json);
        }
        json.end_array();

        json.begin_object(Some("fields"));
        for (name, value) in self.fields.named_values() {
            registry
                .syntax_for(name)
                .append_transformed_json(Some(name), value, FieldTransform::Sanitize, &[], &mut json);
        }
        json.end_object();

        json.end_object();
        json.into_string()
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.line, f)
    }
}
