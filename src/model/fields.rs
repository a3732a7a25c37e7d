//! Typed field accessors over the raw name/value pairs of a log line.
//!
//! Every typed getter answers `None` both when the field is missing and when it is present
//! but cannot be parsed as the requested type. The raw text stays available through
//! [`FieldSet::get_raw_named_value`], so a value written by a newer server (an enum
//! constant this build does not know, say) never makes the message unreadable.

use crate::model::line::LogLine;
use crate::parser::split_outside_quotes;
use std::collections::HashMap;
use std::str::FromStr;

/// Separator used by comma-delimited list fields.
pub const DEFAULT_LIST_SEPARATOR: char = ',';

/// Field name to raw value mapping plus the ordered unnamed tokens of one message.
///
/// Keys are unique. When a line repeats a field name the last occurrence wins, while the
/// key keeps the position of its first occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    named: Vec<(String, String)>,
    index: HashMap<String, usize>,
    unnamed: Vec<String>,
}

impl FieldSet {
    /// Collect the fields of a tokenized line.
    pub fn from_line(line: &LogLine) -> Self {
        let mut fields = Self::default();
        for value in line.unnamed_values() {
            fields.unnamed.push(value.to_string());
        }
        for (name, value) in line.named_values() {
            fields.insert(name, value);
        }
        fields
    }

    fn insert(&mut self, name: &str, value: &str) {
        match self.index.get(name) {
            Some(&i) => self.named[i].1 = value.to_string(),
            None => {
                self.index.insert(name.to_string(), self.named.len());
                self.named.push((name.to_string(), value.to_string()));
            }
        }
    }

    /// Unnamed tokens in source order.
    pub fn unnamed_values(&self) -> &[String] {
        &self.unnamed
    }

    /// Named `(name, value)` pairs, one per distinct name, in first-seen order.
    pub fn named_values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.named.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of distinct field names.
    pub fn len(&self) -> usize {
        self.named.len()
    }

    /// Whether the message has no named fields.
    pub fn is_empty(&self) -> bool {
        self.named.is_empty()
    }

    /// Whether a field with this name is present.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// The raw value of a field, regardless of whether it parses as anything.
    pub fn get_raw_named_value(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.named[i].1.as_str())
    }

    /// String value of a field.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get_raw_named_value(key)
    }

    /// DN value of a field, as an opaque string.
    ///
    /// Normalization and comparison of DNs is left to the caller.
    pub fn get_dn(&self, key: &str) -> Option<&str> {
        self.get_raw_named_value(key)
    }

    /// 32-bit integer value of a field.
    pub fn get_integer(&self, key: &str) -> Option<i32> {
        self.get_parsed(key)
    }

    /// 64-bit integer value of a field.
    pub fn get_long(&self, key: &str) -> Option<i64> {
        self.get_parsed(key)
    }

    /// Finite floating-point value of a field.
    pub fn get_double(&self, key: &str) -> Option<f64> {
        self.get_parsed::<f64>(key).filter(|v| v.is_finite())
    }

    /// Boolean value of a field; accepts `true` and `false` in any case.
    pub fn get_boolean(&self, key: &str) -> Option<bool> {
        let raw = self.get_raw_named_value(key)?;
        if raw.eq_ignore_ascii_case("true") {
            Some(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    /// Enumerated-constant value of a field.
    pub fn get_enum<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get_parsed(key)
    }

    /// Comma-delimited list value of a field.
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.get_list_with(key, DEFAULT_LIST_SEPARATOR)
    }

    /// List value of a field split on `separator` outside quotes. Elements are not trimmed.
    ///
    /// An empty value is an empty list.
    pub fn get_list_with(&self, key: &str, separator: char) -> Option<Vec<String>> {
        let raw = self.get_raw_named_value(key)?;
        if raw.is_empty() {
            return Some(Vec::new());
        }
        Some(split_outside_quotes(raw, separator))
    }

    fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get_raw_named_value(key)?.parse().ok()
    }
}
