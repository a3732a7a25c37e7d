//! Which syntax each log field uses.

use super::{AnySyntax, SyntaxKind, DEFAULT_MAX_STRING_LENGTH};
use crate::model::{access, audit, error_log};
use std::collections::HashMap;

/// Maps field names to syntaxes. Unlisted fields are strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRegistry {
    kinds: HashMap<String, SyntaxKind>,
    max_string_length: usize,
}

impl FieldRegistry {
    /// A registry with no field assignments.
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
        }
    }

    /// The syntaxes of the well-known access, error and audit log fields.
    pub fn standard() -> Self {
        let assignments = [
            (access::field::CONNECTION_ID, SyntaxKind::Integer),
            (access::field::OPERATION_ID, SyntaxKind::Integer),
            (access::field::MESSAGE_ID, SyntaxKind::Integer),
            (access::field::THREAD_ID, SyntaxKind::Integer),
            (access::field::RESULT_CODE, SyntaxKind::Integer),
            (access::field::ENTRIES_RETURNED, SyntaxKind::Integer),
            (access::field::PROCESSING_TIME, SyntaxKind::FloatingPoint),
            (access::field::UNCACHED_DATA_ACCESSED, SyntaxKind::Boolean),
            (access::field::REQUESTER_DN, SyntaxKind::Dn),
            (access::field::MATCHED_DN, SyntaxKind::Dn),
            (access::field::DN, SyntaxKind::Dn),
            (access::field::BASE_DN, SyntaxKind::Dn),
            (access::field::SERVERS_ACCESSED, SyntaxKind::StringList),
            (error_log::field::MESSAGE_ID, SyntaxKind::Integer),
            (audit::field::IS_SOFT_DELETE, SyntaxKind::Boolean),
            (audit::field::SOFT_DELETE_ENTRY_DN, SyntaxKind::Dn),
            (audit::field::UNDELETE_FROM_DN, SyntaxKind::Dn),
        ];

        let mut registry = Self::empty();
        for (name, kind) in assignments {
            registry.kinds.insert(name.to_string(), kind);
        }
        registry
    }

    /// Use `max` as the sanitized length of string-like values.
    pub fn with_max_string_length(mut self, max: usize) -> Self {
        self.max_string_length = max;
        self
    }

    /// Assign `kind` to the field `name`, replacing any earlier assignment.
    pub fn with_field(mut self, name: impl Into<String>, kind: SyntaxKind) -> Self {
        self.kinds.insert(name.into(), kind);
        self
    }

    /// Sanitized length of string-like values.
    pub fn max_string_length(&self) -> usize {
        self.max_string_length
    }

    /// The syntax for field `name`.
    pub fn syntax_for(&self, name: &str) -> AnySyntax {
        let kind = self.kinds.get(name).copied().unwrap_or(SyntaxKind::String);
        AnySyntax::for_kind(kind, self.max_string_length)
    }

    /// The syntax for unnamed tokens and unlisted fields.
    pub fn default_syntax(&self) -> AnySyntax {
        AnySyntax::for_kind(SyntaxKind::String, self.max_string_length)
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
