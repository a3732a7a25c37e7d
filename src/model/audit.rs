//! Audit log messages.
//!
//! An audit record spans several lines:
//!
//! ```text
//! # 05/Jun/2018:10:31:31.034 -0500; conn=5; op=12; requesterDN="cn=Directory Manager"
//! # Deleted entry attributes
//! # objectClass: person
//! # uid: jdoe
//! dn: uid=jdoe,ou=People,dc=example,dc=com
//! changetype: delete
//! ```
//!
//! The header alone determines the typed fields. Commented detail lines follow it, and the
//! LDIF change record makes up the rest.

use crate::model::enums::ChangeType;
use crate::model::error::ParseError;
use crate::model::fields::FieldSet;
use crate::model::message::LogMessage;
use crate::model::timestamp::Timestamp;
use crate::parser;
use base64::Engine;
use std::fmt;

/// Well-known audit header field names.
pub mod field {
    /// Client connection identifier.
    pub const CONNECTION_ID: &str = "conn";
    /// Operation identifier.
    pub const OPERATION_ID: &str = "op";
    /// DN of the user that requested the change.
    pub const REQUESTER_DN: &str = "requesterDN";
    /// Address of the client that requested the change.
    pub const REQUESTER_IP: &str = "requesterIP";
    /// Where the change originated.
    pub const ORIGIN: &str = "origin";
    /// Replication change identifier.
    pub const REPLICATION_CHANGE_ID: &str = "replicationChangeID";
    /// Whether the delete was a soft delete.
    pub const IS_SOFT_DELETE: &str = "isSoftDelete";
    /// DN of the soft-deleted entry created by the delete.
    pub const SOFT_DELETE_ENTRY_DN: &str = "softDeleteEntryDN";
    /// DN of the soft-deleted entry an add undeleted.
    pub const UNDELETE_FROM_DN: &str = "undeleteFromDN";
    /// Server product name.
    pub const PRODUCT_NAME: &str = "productName";
    /// Server instance name.
    pub const INSTANCE_NAME: &str = "instanceName";
    /// Server startup identifier.
    pub const STARTUP_ID: &str = "startupID";
    /// Writing thread identifier.
    pub const THREAD_ID: &str = "threadID";
}

const COMMENT_PREFIX: char = '#';

/// A parsed multi-line audit log record.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogMessage {
    header: LogMessage,
    detail_lines: Vec<String>,
    change_record: Vec<String>,
}

impl AuditLogMessage {
    /// Parse a record held in one string, lines separated by `\n`.
    ///
    /// # Errors
    ///
    /// See [`AuditLogMessage::from_lines`].
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::from_lines(text.split('\n'))
    }

    /// Build a record from its lines: header, commented detail lines, change record.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::EmptyMessage` for no lines, and the tokenizer's error for a
    /// malformed header.
    pub fn from_lines<I, S>(lines: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lines = lines.into_iter();
        let header_line = lines.next().ok_or(ParseError::EmptyMessage)?;
        let header = LogMessage::from_line(parser::tokenize_audit_header(header_line.as_ref())?);

        let mut detail_lines = Vec::new();
        let mut change_record = Vec::new();
        for line in lines {
            let line = line.as_ref();
            if change_record.is_empty() && line.starts_with(COMMENT_PREFIX) {
                detail_lines.push(line.to_string());
            } else {
                change_record.push(line.to_string());
            }
        }

        Ok(Self {
            header,
            detail_lines,
            change_record,
        })
    }

    /// Build a record observably identical to `other`.
    pub fn copy_from(other: &AuditLogMessage) -> Self {
        Self {
            header: LogMessage::copy_from(&other.header),
            detail_lines: other.detail_lines.clone(),
            change_record: other.change_record.clone(),
        }
    }

    /// The header message.
    pub fn header(&self) -> &LogMessage {
        &self.header
    }

    /// The commented lines between the header and the change record, `#` included.
    pub fn detail_lines(&self) -> &[String] {
        &self.detail_lines
    }

    /// The LDIF change record lines, as written.
    pub fn change_record_lines(&self) -> &[String] {
        &self.change_record
    }

    /// The exact source text, lines joined with `\n`.
    pub fn format(&self) -> String {
        let mut out = self.header.format();
        for line in self.detail_lines.iter().chain(&self.change_record) {
            out.push('\n');
            out.push_str(line);
        }
        out
    }

    /// The header timestamp.
    pub fn timestamp(&self) -> &Timestamp {
        self.header.timestamp()
    }

    /// Typed accessors over the header fields.
    pub fn fields(&self) -> &FieldSet {
        self.header.fields()
    }

    /// Raw value of a header field.
    pub fn get_raw_named_value(&self, key: &str) -> Option<&str> {
        self.header.get_raw_named_value(key)
    }

    /// Client connection identifier.
    pub fn connection_id(&self) -> Option<i64> {
        self.fields().get_long(field::CONNECTION_ID)
    }

    /// Operation identifier.
    pub fn operation_id(&self) -> Option<i64> {
        self.fields().get_long(field::OPERATION_ID)
    }

    /// Requester DN.
    pub fn requester_dn(&self) -> Option<&str> {
        self.fields().get_dn(field::REQUESTER_DN)
    }

    /// Requester address.
    pub fn requester_ip(&self) -> Option<&str> {
        self.fields().get_string(field::REQUESTER_IP)
    }

    /// Change origin.
    pub fn origin(&self) -> Option<&str> {
        self.fields().get_string(field::ORIGIN)
    }

    /// Replication change identifier.
    pub fn replication_change_id(&self) -> Option<&str> {
        self.fields().get_string(field::REPLICATION_CHANGE_ID)
    }

    /// DN of the soft-deleted entry a delete produced.
    pub fn soft_delete_entry_dn(&self) -> Option<&str> {
        self.fields().get_dn(field::SOFT_DELETE_ENTRY_DN)
    }

    /// DN of the soft-deleted entry an add restored.
    pub fn undelete_from_dn(&self) -> Option<&str> {
        self.fields().get_dn(field::UNDELETE_FROM_DN)
    }

    /// Server product name.
    pub fn product_name(&self) -> Option<&str> {
        self.fields().get_string(field::PRODUCT_NAME)
    }

    /// Server instance name.
    pub fn instance_name(&self) -> Option<&str> {
        self.fields().get_string(field::INSTANCE_NAME)
    }

    /// Server startup identifier.
    pub fn startup_id(&self) -> Option<&str> {
        self.fields().get_string(field::STARTUP_ID)
    }

    /// Writing thread identifier.
    pub fn thread_id(&self) -> Option<i64> {
        self.fields().get_long(field::THREAD_ID)
    }

    /// Whether this record describes a soft delete.
    ///
    /// True when the header says so explicitly or names the resulting soft-deleted entry.
    pub fn is_soft_delete(&self) -> bool {
        self.fields().get_boolean(field::IS_SOFT_DELETE) == Some(true)
            || self.soft_delete_entry_dn().is_some()
    }

    /// Target DN of the change record, base64 values decoded.
    pub fn dn(&self) -> Option<String> {
        self.change_record_attribute("dn")
    }

    /// Change type of the change record.
    pub fn change_type(&self) -> Option<ChangeType> {
        self.change_record_attribute("changetype")?.parse().ok()
    }

    /// Attribute lines captured in the detail comments (`# name: value`).
    ///
    /// Values that are not UTF-8 are left out.
    ///
    /// Delete records carry the deleted entry this way so it can be rebuilt later.
    pub fn deleted_entry_attributes(&self) -> Vec<(String, String)> {
        self.detail_lines
            .iter()
            .filter_map(|line| {
                let body = line.strip_prefix(COMMENT_PREFIX)?;
                let body = body.strip_prefix(' ').unwrap_or(body);
                parse_ldif_attribute(body)?.into_text()
            })
            .collect()
    }

    fn change_record_attribute(&self, name: &str) -> Option<String> {
        unfold_ldif(&self.change_record)
            .iter()
            .filter_map(|line| parse_ldif_attribute(line))
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
            .and_then(|attr| attr.into_text())
            .map(|(_, value)| value)
    }
}

impl fmt::Display for AuditLogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

// Join LDIF continuation lines (leading single space) onto the line they continue.
pub(crate) fn unfold_ldif(lines: &[String]) -> Vec<String> {
    let mut unfolded: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        match (line.strip_prefix(' '), unfolded.last_mut()) {
            (Some(continuation), Some(previous)) => previous.push_str(continuation),
            _ => unfolded.push(line.clone()),
        }
    }
    unfolded
}

/// One `name: value` or `name:: base64` LDIF attribute line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LdifAttribute {
    /// Attribute description as written, options included (`cn;lang-en`).
    pub(crate) name: String,
    /// Value bytes, base64 decoded. Undecodable base64 is kept as its encoded text.
    pub(crate) value: Vec<u8>,
}

impl LdifAttribute {
    /// The attribute type without options, ASCII-lowercased.
    pub(crate) fn base_name(&self) -> String {
        attribute_base_name(&self.name)
    }

    /// The value, if it is UTF-8.
    pub(crate) fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }

    fn into_text(self) -> Option<(String, String)> {
        let value = String::from_utf8(self.value).ok()?;
        Some((self.name, value))
    }
}

/// `cn;lang-en` and `CN` both name `cn`.
pub(crate) fn attribute_base_name(description: &str) -> String {
    description
        .split(';')
        .next()
        .unwrap_or(description)
        .trim()
        .to_ascii_lowercase()
}

pub(crate) fn parse_ldif_attribute(line: &str) -> Option<LdifAttribute> {
    let colon = line.find(':')?;
    let name = &line[..colon];
    if name.is_empty() || name.contains(' ') {
        return None;
    }

    let rest = &line[colon + 1..];
    let value = match rest.strip_prefix(':') {
        Some(encoded) => {
            let encoded = encoded.trim();
            base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .unwrap_or_else(|_| encoded.as_bytes().to_vec())
        }
        None => rest.strip_prefix(' ').unwrap_or(rest).as_bytes().to_vec(),
    };
    Some(LdifAttribute {
        name: name.to_string(),
        value,
    })
}
