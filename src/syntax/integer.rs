//! Integer values.

use super::{FieldSyntax, FieldSyntaxDescriptor};
use crate::model::error::SyntaxError;

static DESCRIPTOR: FieldSyntaxDescriptor = FieldSyntaxDescriptor {
    name: "integer",
    max_length_chars: None,
    supports_redacted_components: false,
    supports_tokenized_components: false,
    completely_redacted_conforms: false,
    with_redacted_components_conforms: false,
    completely_tokenized_conforms: false,
    with_tokenized_components_conforms: false,
};

/// Signed 64-bit integers in decimal notation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegerSyntax;

impl FieldSyntax for IntegerSyntax {
    type Value = i64;

    fn descriptor(&self) -> &'static FieldSyntaxDescriptor {
        &DESCRIPTOR
    }

    fn value_to_string(&self, value: &i64) -> String {
        value.to_string()
    }

    fn parse_value(&self, text: &str) -> Result<i64, SyntaxError> {
        text.parse()
            .map_err(|e: std::num::ParseIntError| SyntaxError::invalid("integer", text, e.to_string()))
    }
}
