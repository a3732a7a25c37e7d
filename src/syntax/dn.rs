//! Distinguished name values.
//!
//! A DN is a sequence of RDNs separated by `,`, each RDN one or more `attr=value`
//! assertions joined by `+`. Component redaction and tokenization replace every
//! attribute value and keep the attribute names, so `uid=jdoe,ou=People,dc=example`
//! redacts to `uid={REDACTED},ou={REDACTED},dc={REDACTED}`.
//!
//! Values may use backslash escapes (`\,`, `\2C`) or be enclosed in double quotes.

use super::{FieldSyntax, FieldSyntaxDescriptor, REDACTED_STRING};
use crate::model::error::SyntaxError;
use crate::tokenization;

static DESCRIPTOR: FieldSyntaxDescriptor = FieldSyntaxDescriptor {
    name: "distinguished-name",
    max_length_chars: None,
    supports_redacted_components: true,
    supports_tokenized_components: true,
    completely_redacted_conforms: false,
    with_redacted_components_conforms: true,
    completely_tokenized_conforms: false,
    with_tokenized_components_conforms: true,
};

/// Distinguished names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DnSyntax;

/// One `attr=value` assertion, as slices of the source DN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Assertion<'a> {
    /// `""` for the first assertion, otherwise `","` or `"+"`.
    separator: &'a str,
    /// Attribute name with any surrounding whitespace.
    attribute: &'a str,
    /// Value text with surrounding whitespace removed.
    value: &'a str,
}

fn invalid(dn: &str, reason: &str) -> SyntaxError {
    SyntaxError::invalid("distinguished-name", dn, reason)
}

// A keystring (`cn`, `x-custom`) or a numeric OID (`2.5.4.3`).
fn is_attribute_type(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        Some(first) if first.is_ascii_digit() => name
            .split('.')
            .all(|arc| !arc.is_empty() && arc.bytes().all(|b| b.is_ascii_digit())),
        _ => false,
    }
}

fn split_assertions(dn: &str) -> Result<Vec<Assertion<'_>>, SyntaxError> {
    let mut assertions = Vec::new();
    if dn.trim().is_empty() {
        return Ok(assertions);
    }

    let bytes = dn.as_bytes();
    let mut pos = 0;
    let mut separator = "";
    loop {
        let eq = dn[pos..]
            .find('=')
            .map(|i| pos + i)
            .ok_or_else(|| invalid(dn, "attribute without '='"))?;
        let attribute = &dn[pos..eq];
        let name = attribute.trim();
        if !is_attribute_type(name) {
            return Err(invalid(dn, "invalid attribute name"));
        }

        let value_start = eq + 1;
        let mut i = value_start;
        let mut in_quotes = false;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => {
                    if i + 1 >= bytes.len() {
                        return Err(invalid(dn, "trailing backslash"));
                    }
                    i += 2;
                    continue;
                }
                b'"' => in_quotes = !in_quotes,
                b',' | b'+' if !in_quotes => break,
                _ => {}
            }
            i += 1;
        }
        if in_quotes {
            return Err(invalid(dn, "unterminated quoted value"));
        }

        assertions.push(Assertion {
            separator,
            attribute,
            value: dn[value_start..i].trim(),
        });

        if i >= bytes.len() {
            return Ok(assertions);
        }
        separator = &dn[i..i + 1];
        pos = i + 1;
        if dn[pos..].trim().is_empty() {
            return Err(invalid(dn, "empty RDN"));
        }
    }
}

fn replace_values(dn: &str, mut replacement: impl FnMut(&str) -> String) -> Option<String> {
    let assertions = split_assertions(dn).ok()?;
    let mut out = String::with_capacity(dn.len());
    for assertion in assertions {
        out.push_str(assertion.separator);
        out.push_str(assertion.attribute);
        out.push('=');
        out.push_str(&replacement(assertion.value));
    }
    Some(out)
}

impl DnSyntax {
    /// Attribute names of the assertions in `dn`, in order.
    ///
    /// # Errors
    ///
    /// Returns `SyntaxError::InvalidValue` if `dn` is not a valid DN.
    pub fn attribute_names(dn: &str) -> Result<Vec<&str>, SyntaxError> {
        Ok(split_assertions(dn)?
            .into_iter()
            .map(|a| a.attribute.trim())
            .collect())
    }
}

impl FieldSyntax for DnSyntax {
    type Value = String;

    fn descriptor(&self) -> &'static FieldSyntaxDescriptor {
        &DESCRIPTOR
    }

    fn value_to_string(&self, value: &String) -> String {
        value.clone()
    }

    fn parse_value(&self, text: &str) -> Result<String, SyntaxError> {
        split_assertions(text)?;
        Ok(text.to_string())
    }

    fn redact_components(&self, value: &String) -> String {
        replace_values(value, |_| REDACTED_STRING.to_string()).unwrap_or_else(|| self.redact_entire())
    }

    fn tokenize_components(&self, value: &String, pepper: &[u8]) -> String {
        replace_values(value, |v| tokenization::tokenize(v.as_bytes(), pepper))
            .unwrap_or_else(|| self.tokenize_entire(value, pepper))
    }
}
