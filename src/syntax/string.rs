//! Free-form string values.

use super::{FieldSyntax, FieldSyntaxDescriptor};
use crate::model::error::SyntaxError;

/// Default maximum sanitized string length, in characters.
pub const DEFAULT_MAX_STRING_LENGTH: usize = 1000;

static DESCRIPTOR: FieldSyntaxDescriptor = FieldSyntaxDescriptor {
    name: "string",
    max_length_chars: Some(DEFAULT_MAX_STRING_LENGTH),
    supports_redacted_components: false,
    supports_tokenized_components: false,
    completely_redacted_conforms: true,
    with_redacted_components_conforms: true,
    completely_tokenized_conforms: true,
    with_tokenized_components_conforms: true,
};

/// Any text is a valid string. Sanitizing truncates to a configurable length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringSyntax {
    max_length_chars: usize,
}

impl StringSyntax {
    /// A string syntax that truncates to `max_length_chars` characters.
    pub fn new(max_length_chars: usize) -> Self {
        Self { max_length_chars }
    }
}

impl Default for StringSyntax {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STRING_LENGTH)
    }
}

impl FieldSyntax for StringSyntax {
    type Value = String;

    fn descriptor(&self) -> &'static FieldSyntaxDescriptor {
        &DESCRIPTOR
    }

    fn value_to_string(&self, value: &String) -> String {
        value.clone()
    }

    fn parse_value(&self, text: &str) -> Result<String, SyntaxError> {
        Ok(text.to_string())
    }

    fn max_length_chars(&self) -> Option<usize> {
        Some(self.max_length_chars)
    }
}
