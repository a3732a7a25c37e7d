//! Comma-delimited lists of strings, such as `serversAccessed`.

use super::{truncate_chars, FieldSyntax, FieldSyntaxDescriptor, REDACTED_STRING};
use crate::model::error::SyntaxError;
use crate::model::fields::DEFAULT_LIST_SEPARATOR;
use crate::parser::split_outside_quotes;
use crate::tokenization;

static DESCRIPTOR: FieldSyntaxDescriptor = FieldSyntaxDescriptor {
    name: "string-list",
    max_length_chars: Some(super::DEFAULT_MAX_STRING_LENGTH),
    supports_redacted_components: true,
    supports_tokenized_components: true,
    completely_redacted_conforms: true,
    with_redacted_components_conforms: true,
    completely_tokenized_conforms: true,
    with_tokenized_components_conforms: true,
};

/// Lists whose elements are redacted or tokenized one by one.
///
/// Each element is truncated separately when sanitizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringListSyntax {
    max_length_chars: usize,
}

impl StringListSyntax {
    /// A list syntax that truncates each element to `max_length_chars` characters.
    pub fn new(max_length_chars: usize) -> Self {
        Self { max_length_chars }
    }

    fn join(elements: impl Iterator<Item = String>) -> String {
        let mut out = String::new();
        for (i, element) in elements.enumerate() {
            if i > 0 {
                out.push(DEFAULT_LIST_SEPARATOR);
            }
            out.push_str(&element);
        }
        out
    }
}

impl Default for StringListSyntax {
    fn default() -> Self {
        Self::new(super::DEFAULT_MAX_STRING_LENGTH)
    }
}

impl FieldSyntax for StringListSyntax {
    type Value = Vec<String>;

    fn descriptor(&self) -> &'static FieldSyntaxDescriptor {
        &DESCRIPTOR
    }

    fn value_to_string(&self, value: &Vec<String>) -> String {
        Self::join(value.iter().cloned())
    }

    fn parse_value(&self, text: &str) -> Result<Vec<String>, SyntaxError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(split_outside_quotes(text, DEFAULT_LIST_SEPARATOR))
    }

    fn max_length_chars(&self) -> Option<usize> {
        Some(self.max_length_chars)
    }

    fn sanitize(&self, value: &Vec<String>) -> String {
        Self::join(
            value
                .iter()
                .map(|element| truncate_chars(element.clone(), self.max_length_chars)),
        )
    }

    fn redact_components(&self, value: &Vec<String>) -> String {
        if value.is_empty() {
            return self.redact_entire();
        }
        Self::join(value.iter().map(|_| REDACTED_STRING.to_string()))
    }

    fn tokenize_components(&self, value: &Vec<String>, pepper: &[u8]) -> String {
        if value.is_empty() {
            return self.tokenize_entire(value, pepper);
        }
        Self::join(
            value
                .iter()
                .map(|element| tokenization::tokenize(element.as_bytes(), pepper)),
        )
    }
}
