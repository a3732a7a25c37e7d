//! Boolean values.

use super::{FieldSyntax, FieldSyntaxDescriptor};
use crate::model::error::SyntaxError;

static DESCRIPTOR: FieldSyntaxDescriptor = FieldSyntaxDescriptor {
    name: "boolean",
    max_length_chars: None,
    supports_redacted_components: false,
    supports_tokenized_components: false,
    completely_redacted_conforms: false,
    with_redacted_components_conforms: false,
    completely_tokenized_conforms: false,
    with_tokenized_components_conforms: false,
};

/// `true` or `false`, in any letter case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BooleanSyntax;

impl FieldSyntax for BooleanSyntax {
    type Value = bool;

    fn descriptor(&self) -> &'static FieldSyntaxDescriptor {
        &DESCRIPTOR
    }

    fn value_to_string(&self, value: &bool) -> String {
        value.to_string()
    }

    fn parse_value(&self, text: &str) -> Result<bool, SyntaxError> {
        if text.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if text.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(SyntaxError::invalid("boolean", text, "expected true or false"))
        }
    }
}
