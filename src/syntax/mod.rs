//! Field syntaxes: how log field values are sanitized, redacted and tokenized.
//!
//! Each value type has one [`FieldSyntax`] strategy. The trait's provided methods give the
//! baseline behaviour (whole-value redaction and tokenization, length-limited
//! sanitization); syntaxes with internal structure override the component operations.
//!
//! Renderers append ` key="value"` fragments to text log lines and `"key":"value"`
//! members (or bare `"value"` array elements) to a [`render::JsonBuffer`]. They contain no
//! transformation logic of their own: each one applies a [`FieldTransform`] through the
//! strategy and hands the result to the writer in [`render`].
//!
//! [`AnySyntax`] closes the family into one enum so a field registry can pick a syntax at
//! run time and work on raw log text.

use crate::model::error::SyntaxError;
use crate::tokenization;
use render::JsonBuffer;
use tracing::debug;

pub mod boolean;
pub mod dn;
pub mod floating_point;
pub mod integer;
pub mod registry;
pub mod render;
pub mod string;
pub mod string_list;

pub use boolean::BooleanSyntax;
pub use dn::DnSyntax;
pub use floating_point::FloatingPointSyntax;
pub use integer::IntegerSyntax;
pub use registry::FieldRegistry;
pub use string::{StringSyntax, DEFAULT_MAX_STRING_LENGTH};
pub use string_list::StringListSyntax;

/// The marker that replaces a redacted value or value component.
pub const REDACTED_STRING: &str = "{REDACTED}";

/// Static description of a syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSyntaxDescriptor {
    /// Canonical syntax name.
    pub name: &'static str,
    /// Maximum sanitized length in characters, if the syntax truncates at all.
    pub max_length_chars: Option<usize>,
    /// Whether parts of a value can be redacted while the rest stays clear.
    pub supports_redacted_components: bool,
    /// Whether parts of a value can be tokenized while the rest stays clear.
    pub supports_tokenized_components: bool,
    /// Whether `{REDACTED}` is itself a valid value of this syntax.
    pub completely_redacted_conforms: bool,
    /// Whether a value with redacted components is a valid value of this syntax.
    pub with_redacted_components_conforms: bool,
    /// Whether a whole-value token is itself a valid value of this syntax.
    pub completely_tokenized_conforms: bool,
    /// Whether a value with tokenized components is a valid value of this syntax.
    pub with_tokenized_components_conforms: bool,
}

/// A value transformation applied before a field is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTransform {
    /// Length-limit the value.
    Sanitize,
    /// Replace the whole value with `{REDACTED}`.
    RedactEntire,
    /// Redact the structured parts of the value.
    RedactComponents,
    /// Replace the whole value with a keyed token.
    TokenizeEntire,
    /// Tokenize the structured parts of the value.
    TokenizeComponents,
}

/// Sanitization, redaction and tokenization strategy for one value type.
pub trait FieldSyntax: Send + Sync {
    /// The in-memory value type.
    type Value;

    /// Static description of this syntax.
    fn descriptor(&self) -> &'static FieldSyntaxDescriptor;

    /// Canonical text representation of a value.
    fn value_to_string(&self, value: &Self::Value) -> String;

    /// Parse the canonical text representation back into a value.
    ///
    /// # Errors
    ///
    /// Returns `SyntaxError::InvalidValue` if the text is not a value of this syntax.
    fn parse_value(&self, text: &str) -> Result<Self::Value, SyntaxError>;

    /// Maximum sanitized length in characters.
    fn max_length_chars(&self) -> Option<usize> {
        self.descriptor().max_length_chars
    }

    /// The value's text, truncated to the maximum length with a `{N more characters}` suffix.
    fn sanitize(&self, value: &Self::Value) -> String {
        let text = self.value_to_string(value);
        match self.max_length_chars() {
            Some(max) => truncate_chars(text, max),
            None => text,
        }
    }

    /// Whether `s` is exactly the redaction marker.
    fn is_completely_redacted(&self, s: &str) -> bool {
        s == REDACTED_STRING
    }

    /// Whether the redaction marker is a valid value of this syntax.
    fn completely_redacted_conforms_to_syntax(&self) -> bool {
        self.descriptor().completely_redacted_conforms
    }

    /// The whole-value redaction marker.
    fn redact_entire(&self) -> String {
        REDACTED_STRING.to_string()
    }

    /// Whether component redaction is supported.
    fn supports_redacted_components(&self) -> bool {
        self.descriptor().supports_redacted_components
    }

    /// Whether `s` contains the redaction marker anywhere.
    fn includes_redacted_component(&self, s: &str) -> bool {
        s.contains(REDACTED_STRING)
    }

    /// Redact the structured parts of a value; the whole value when there are none.
    fn redact_components(&self, _value: &Self::Value) -> String {
        self.redact_entire()
    }

    /// Whether a value with redacted components is still a valid value.
    fn with_redacted_components_conforms_to_syntax(&self) -> bool {
        self.descriptor().with_redacted_components_conforms
    }

    /// Whether `s` is exactly one token.
    fn is_completely_tokenized(&self, s: &str) -> bool {
        tokenization::is_token(s)
    }

    /// Whether a whole-value token is a valid value of this syntax.
    fn completely_tokenized_conforms_to_syntax(&self) -> bool {
        self.descriptor().completely_tokenized_conforms
    }

    /// Replace the whole value with a keyed token.
    fn tokenize_entire(&self, value: &Self::Value, pepper: &[u8]) -> String {
        tokenization::tokenize(self.value_to_string(value).as_bytes(), pepper)
    }

    /// Whether component tokenization is supported.
    fn supports_tokenized_components(&self) -> bool {
        self.descriptor().supports_tokenized_components
    }

    /// Whether `s` contains a token anywhere.
    fn includes_tokenized_component(&self, s: &str) -> bool {
        tokenization::contains_token(s)
    }

    /// Tokenize the structured parts of a value; the whole value when there are none.
    fn tokenize_components(&self, value: &Self::Value, pepper: &[u8]) -> String {
        self.tokenize_entire(value, pepper)
    }

    /// Whether a value with tokenized components is still a valid value.
    fn with_tokenized_components_conforms_to_syntax(&self) -> bool {
        self.descriptor().with_tokenized_components_conforms
    }

    /// Apply a transformation. `pepper` is only read by the tokenizing transforms.
    fn transform(&self, value: &Self::Value, transform: FieldTransform, pepper: &[u8]) -> String {
        match transform {
            FieldTransform::Sanitize => self.sanitize(value),
            FieldTransform::RedactEntire => self.redact_entire(),
            FieldTransform::RedactComponents => self.redact_components(value),
            FieldTransform::TokenizeEntire => self.tokenize_entire(value, pepper),
            FieldTransform::TokenizeComponents => self.tokenize_components(value, pepper),
        }
    }

    // ===== Text renderers =====

    /// Append ` key="<sanitized value>"`.
    fn append_sanitized_text(&self, key: &str, value: &Self::Value, buffer: &mut String) {
        render::append_text_field(buffer, key, &self.sanitize(value));
    }

    /// Append ` key="{REDACTED}"`.
    fn append_redacted_entire_text(&self, key: &str, buffer: &mut String) {
        render::append_text_field(buffer, key, &self.redact_entire());
    }

    /// Append ` key="<value with redacted components>"`.
    fn append_redacted_components_text(&self, key: &str, value: &Self::Value, buffer: &mut String) {
        render::append_text_field(buffer, key, &self.redact_components(value));
    }

    /// Append ` key="{TOKENIZED:...}"`.
    fn append_tokenized_entire_text(
        &self,
        key: &str,
        value: &Self::Value,
        pepper: &[u8],
        buffer: &mut String,
    ) {
        render::append_text_field(buffer, key, &self.tokenize_entire(value, pepper));
    }

    /// Append ` key="<value with tokenized components>"`.
    fn append_tokenized_components_text(
        &self,
        key: &str,
        value: &Self::Value,
        pepper: &[u8],
        buffer: &mut String,
    ) {
        render::append_text_field(buffer, key, &self.tokenize_components(value, pepper));
    }

    // ===== JSON member renderers =====

    /// Append `"key":"<sanitized value>"`.
    fn append_sanitized_json_field(&self, key: &str, value: &Self::Value, json: &mut JsonBuffer) {
        json.append_string(Some(key), &self.sanitize(value));
    }

    /// Append `"key":"{REDACTED}"`.
    fn append_redacted_entire_json_field(&self, key: &str, json: &mut JsonBuffer) {
        json.append_string(Some(key), &self.redact_entire());
    }

    /// Append `"key":"<value with redacted components>"`.
    fn append_redacted_components_json_field(
        &self,
        key: &str,
        value: &Self::Value,
        json: &mut JsonBuffer,
    ) {
        json.append_string(Some(key), &self.redact_components(value));
    }

    /// Append `"key":"{TOKENIZED:...}"`.
    fn append_tokenized_entire_json_field(
        &self,
        key: &str,
        value: &Self::Value,
        pepper: &[u8],
        json: &mut JsonBuffer,
    ) {
        json.append_string(Some(key), &self.tokenize_entire(value, pepper));
    }

    /// Append `"key":"<value with tokenized components>"`.
    fn append_tokenized_components_json_field(
        &self,
        key: &str,
        value: &Self::Value,
        pepper: &[u8],
        json: &mut JsonBuffer,
    ) {
        json.append_string(Some(key), &self.tokenize_components(value, pepper));
    }

    // ===== JSON array element renderers =====

    /// Append `"<sanitized value>"`.
    fn append_sanitized_json_value(&self, value: &Self::Value, json: &mut JsonBuffer) {
        json.append_string(None, &self.sanitize(value));
    }

    /// Append `"{REDACTED}"`.
    fn append_redacted_entire_json_value(&self, json: &mut JsonBuffer) {
        json.append_string(None, &self.redact_entire());
    }

    /// Append `"<value with redacted components>"`.
    fn append_redacted_components_json_value(&self, value: &Self::Value, json: &mut JsonBuffer) {
        json.append_string(None, &self.redact_components(value));
    }

    /// Append `"{TOKENIZED:...}"`.
    fn append_tokenized_entire_json_value(
        &self,
        value: &Self::Value,
        pepper: &[u8],
        json: &mut JsonBuffer,
    ) {
        json.append_string(None, &self.tokenize_entire(value, pepper));
    }

    /// Append `"<value with tokenized components>"`.
    fn append_tokenized_components_json_value(
        &self,
        value: &Self::Value,
        pepper: &[u8],
        json: &mut JsonBuffer,
    ) {
        json.append_string(None, &self.tokenize_components(value, pepper));
    }

    // ===== Dispatch =====

    /// Append a text fragment using the renderer for `transform`.
    fn append_text(
        &self,
        key: &str,
        value: &Self::Value,
        transform: FieldTransform,
        pepper: &[u8],
        buffer: &mut String,
    ) {
        match transform {
            FieldTransform::Sanitize => self.append_sanitized_text(key, value, buffer),
            FieldTransform::RedactEntire => self.append_redacted_entire_text(key, buffer),
            FieldTransform::RedactComponents => {
                self.append_redacted_components_text(key, value, buffer)
            }
            FieldTransform::TokenizeEntire => {
                self.append_tokenized_entire_text(key, value, pepper, buffer)
            }
            FieldTransform::TokenizeComponents => {
                self.append_tokenized_components_text(key, value, pepper, buffer)
            }
        }
    }

    /// Append a JSON member (with a key) or array element (without) using the renderer for
    /// `transform`.
    fn append_json(
        &self,
        key: Option<&str>,
        value: &Self::Value,
        transform: FieldTransform,
        pepper: &[u8],
        json: &mut JsonBuffer,
    ) {
        match (key, transform) {
            (Some(key), FieldTransform::Sanitize) => self.append_sanitized_json_field(key, value, json),
            (Some(key), FieldTransform::RedactEntire) => self.append_redacted_entire_json_field(key, json),
            (Some(key), FieldTransform::RedactComponents) => {
                self.append_redacted_components_json_field(key, value, json)
            }
            (Some(key), FieldTransform::TokenizeEntire) => {
                self.append_tokenized_entire_json_field(key, value, pepper, json)
            }
            (Some(key), FieldTransform::TokenizeComponents) => {
                self.append_tokenized_components_json_field(key, value, pepper, json)
            }
            (None, FieldTransform::Sanitize) => self.append_sanitized_json_value(value, json),
            (None, FieldTransform::RedactEntire) => self.append_redacted_entire_json_value(json),
            (None, FieldTransform::RedactComponents) => {
                self.append_redacted_components_json_value(value, json)
            }
            (None, FieldTransform::TokenizeEntire) => {
                self.append_tokenized_entire_json_value(value, pepper, json)
            }
            (None, FieldTransform::TokenizeComponents) => {
                self.append_tokenized_components_json_value(value, pepper, json)
            }
        }
    }
}

/// Truncate `text` to `max` characters, appending `{N more characters}` when shortened.
pub fn truncate_chars(text: String, max: usize) -> String {
    let total = text.chars().count();
    if total <= max {
        return text;
    }

    let cut = text.char_indices().nth(max).map_or(text.len(), |(i, _)| i);
    format!("{}{{{} more characters}}", &text[..cut], total - max)
}

/// The kinds of syntax a field can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// Free-form string.
    String,
    /// 64-bit integer.
    Integer,
    /// Floating-point number.
    FloatingPoint,
    /// `true` or `false`.
    Boolean,
    /// Distinguished name.
    Dn,
    /// Comma-delimited list of strings.
    StringList,
}

/// A configured syntax of any kind.
///
/// Carries the configured string length limit, which also applies when a value does not
/// conform to its syntax and is handled as a plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnySyntax {
    strategy: Strategy,
    max_length_chars: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    String(StringSyntax),
    Integer(IntegerSyntax),
    FloatingPoint(FloatingPointSyntax),
    Boolean(BooleanSyntax),
    Dn(DnSyntax),
    StringList(StringListSyntax),
}

macro_rules! with_syntax {
    ($any:expr, $s:ident => $body:expr) => {
        match $any.strategy {
            Strategy::String($s) => $body,
            Strategy::Integer($s) => $body,
            Strategy::FloatingPoint($s) => $body,
            Strategy::Boolean($s) => $body,
            Strategy::Dn($s) => $body,
            Strategy::StringList($s) => $body,
        }
    };
}

impl AnySyntax {
    /// Build the syntax for a kind; `max_length_chars` applies to the string-like kinds
    /// and to non-conforming values of any kind.
    pub fn for_kind(kind: SyntaxKind, max_length_chars: usize) -> Self {
        let strategy = match kind {
            SyntaxKind::String => Strategy::String(StringSyntax::new(max_length_chars)),
            SyntaxKind::Integer => Strategy::Integer(IntegerSyntax),
            SyntaxKind::FloatingPoint => Strategy::FloatingPoint(FloatingPointSyntax),
            SyntaxKind::Boolean => Strategy::Boolean(BooleanSyntax),
            SyntaxKind::Dn => Strategy::Dn(DnSyntax),
            SyntaxKind::StringList => Strategy::StringList(StringListSyntax::new(max_length_chars)),
        };
        Self {
            strategy,
            max_length_chars,
        }
    }

    /// Which kind this is.
    pub fn kind(&self) -> SyntaxKind {
        match self.strategy {
            Strategy::String(_) => SyntaxKind::String,
            Strategy::Integer(_) => SyntaxKind::Integer,
            Strategy::FloatingPoint(_) => SyntaxKind::FloatingPoint,
            Strategy::Boolean(_) => SyntaxKind::Boolean,
            Strategy::Dn(_) => SyntaxKind::Dn,
            Strategy::StringList(_) => SyntaxKind::StringList,
        }
    }

    /// The configured string length limit.
    pub fn max_length_chars(&self) -> usize {
        self.max_length_chars
    }

    /// Static description of the underlying syntax.
    pub fn descriptor(&self) -> &'static FieldSyntaxDescriptor {
        with_syntax!(self, s => s.descriptor())
    }

    /// Transform raw log text.
    ///
    /// Text that does not parse under this syntax is handled as a plain string, so a
    /// malformed value is still fully redacted or tokenized, never passed through.
    /// Sanitized scalars keep their text as written (`007` stays `007`).
    pub fn transform_raw(&self, raw: &str, transform: FieldTransform, pepper: &[u8]) -> String {
        if self.sanitizes_as_written(transform) {
            return self.fallback_string().transform(&raw.to_string(), transform, pepper);
        }
        with_syntax!(self, s => match s.parse_value(raw) {
            Ok(value) => s.transform(&value, transform, pepper),
            Err(_) => {
                debug!(syntax = s.descriptor().name, "value does not conform, treating as string");
                self.fallback_string().transform(&raw.to_string(), transform, pepper)
            }
        })
    }

    /// Append a ` key="..."` text fragment for raw log text.
    pub fn append_transformed_text(
        &self,
        key: &str,
        raw: &str,
        transform: FieldTransform,
        pepper: &[u8],
        buffer: &mut String,
    ) {
        if self.sanitizes_as_written(transform) {
            return self.fallback_string().append_text(key, &raw.to_string(), transform, pepper, buffer);
        }
        with_syntax!(self, s => match s.parse_value(raw) {
            Ok(value) => s.append_text(key, &value, transform, pepper, buffer),
            Err(_) => {
                debug!(syntax = s.descriptor().name, field = key, "value does not conform, treating as string");
                self.fallback_string().append_text(key, &raw.to_string(), transform, pepper, buffer)
            }
        })
    }

    /// Append a JSON member or array element for raw log text.
    pub fn append_transformed_json(
        &self,
        key: Option<&str>,
        raw: &str,
        transform: FieldTransform,
        pepper: &[u8],
        json: &mut JsonBuffer,
    ) {
        if self.sanitizes_as_written(transform) {
            return self.fallback_string().append_json(key, &raw.to_string(), transform, pepper, json);
        }
        with_syntax!(self, s => match s.parse_value(raw) {
            Ok(value) => s.append_json(key, &value, transform, pepper, json),
            Err(_) => {
                debug!(syntax = s.descriptor().name, "value does not conform, treating as string");
                self.fallback_string().append_json(key, &raw.to_string(), transform, pepper, json)
            }
        })
    }

    // Scalar canonical forms would rewrite the value (`1.50` to `1.5`).
    fn sanitizes_as_written(&self, transform: FieldTransform) -> bool {
        transform == FieldTransform::Sanitize
            && matches!(
                self.strategy,
                Strategy::Integer(_) | Strategy::FloatingPoint(_) | Strategy::Boolean(_)
            )
    }

    fn fallback_string(&self) -> StringSyntax {
        StringSyntax::new(self.max_length_chars)
    }
}
