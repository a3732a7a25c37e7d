//! Floating-point values.

use super::{FieldSyntax, FieldSyntaxDescriptor};
use crate::model::error::SyntaxError;

static DESCRIPTOR: FieldSyntaxDescriptor = FieldSyntaxDescriptor {
    name: "floating-point",
    max_length_chars: None,
    supports_redacted_components: false,
    supports_tokenized_components: false,
    completely_redacted_conforms: false,
    with_redacted_components_conforms: false,
    completely_tokenized_conforms: false,
    with_tokenized_components_conforms: false,
};

/// Finite decimal numbers such as processing times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FloatingPointSyntax;

impl FieldSyntax for FloatingPointSyntax {
    type Value = f64;

    fn descriptor(&self) -> &'static FieldSyntaxDescriptor {
        &DESCRIPTOR
    }

    fn value_to_string(&self, value: &f64) -> String {
        value.to_string()
    }

    fn parse_value(&self, text: &str) -> Result<f64, SyntaxError> {
        let value: f64 = text
            .parse()
            .map_err(|e: std::num::ParseFloatError| {
                SyntaxError::invalid("floating-point", text, e.to_string())
            })?;
        if !value.is_finite() {
            return Err(SyntaxError::invalid("floating-point", text, "not a finite number"));
        }
        Ok(value)
    }
}
