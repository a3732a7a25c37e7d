//! Record-level redaction and tokenization.
//!
//! A [`RedactionPolicy`] names the fields to transform. Redacting a parsed record
//! rebuilds its text: every element the policy does not name keeps its raw source text and
//! separator, and every named value it does name is re-rendered through the field's syntax
//! as a quoted ` key="..."` fragment.
//!
//! Audit records are handled line by line: the header like any other line, detail
//! comments of the form `# attr: value` and LDIF `attr: value` lines by attribute name.

use crate::model::audit::{attribute_base_name, parse_ldif_attribute, unfold_ldif, LdifAttribute};
use crate::model::line::{ElementKind, LogLine};
use crate::model::{AuditLogMessage, LogMessage};
use crate::source::ParsedRecord;
use crate::syntax::registry::FieldRegistry;
use crate::syntax::{FieldTransform, REDACTED_STRING};
use crate::tokenization;
use base64::Engine;
use std::collections::HashMap;
use tracing::trace;

/// Which fields are transformed, and how.
///
/// Log line fields match by exact name. LDIF attributes in audit records match by
/// attribute type, ignoring case and options, so a rule for `cn` also covers
/// `CN;lang-en`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedactionPolicy {
    rules: HashMap<String, FieldTransform>,
    // Keyed by lowercased attribute type.
    attributes: HashMap<String, FieldTransform>,
}

impl RedactionPolicy {
    /// A policy that transforms nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform `field` with `transform`, replacing any earlier rule for it.
    pub fn with_rule(mut self, field: impl Into<String>, transform: FieldTransform) -> Self {
        let field = field.into();
        self.attributes.insert(attribute_base_name(&field), transform);
        self.rules.insert(field, transform);
        self
    }

    /// Redact every field in `fields`, by component when `components` is set.
    pub fn redact_fields<I, S>(self, fields: I, components: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let transform = if components {
            FieldTransform::RedactComponents
        } else {
            FieldTransform::RedactEntire
        };
        fields
            .into_iter()
            .fold(self, |policy, field| policy.with_rule(field, transform))
    }

    /// Tokenize every field in `fields`, by component when `components` is set.
    pub fn tokenize_fields<I, S>(self, fields: I, components: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let transform = if components {
            FieldTransform::TokenizeComponents
        } else {
            FieldTransform::TokenizeEntire
        };
        fields
            .into_iter()
            .fold(self, |policy, field| policy.with_rule(field, transform))
    }

    /// The transform for `field`, if the policy names it.
    pub fn transform_for(&self, field: &str) -> Option<FieldTransform> {
        self.rules.get(field).copied()
    }

    /// The transform for an LDIF attribute description such as `userPassword` or
    /// `cn;lang-en`.
    pub fn transform_for_attribute(&self, description: &str) -> Option<FieldTransform> {
        self.attributes.get(&attribute_base_name(description)).copied()
    }

    /// Whether the policy transforms nothing.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether any rule tokenizes, and so needs a pepper.
    pub fn needs_pepper(&self) -> bool {
        self.rules.values().any(|t| {
            matches!(
                t,
                FieldTransform::TokenizeEntire | FieldTransform::TokenizeComponents
            )
        })
    }
}

/// Rebuild a tokenized line with the policy's fields transformed.
///
/// Every occurrence of a named field is transformed, so a duplicated key cannot smuggle a
/// clear value past the policy.
pub fn redact_line(
    line: &LogLine,
    policy: &RedactionPolicy,
    registry: &FieldRegistry,
    pepper: &[u8],
) -> String {
    let mut out = String::with_capacity(line.format().len());
    out.push_str(line.prefix());

    for element in line.elements() {
        out.push_str(element.separator());
        match element.kind() {
            ElementKind::Named { name, value, .. } => match policy.transform_for(name) {
                Some(transform) => {
                    trace!(field = %name, ?transform, "transforming field");
                    let mut fragment = String::new();
                    registry
                        .syntax_for(name)
                        .append_transformed_text(name, value, transform, pepper, &mut fragment);
                    // The renderer leads with a space; the element already has its separator.
                    out.push_str(fragment.strip_prefix(' ').unwrap_or(&fragment));
                }
                None => out.push_str(element.raw()),
            },
            ElementKind::Unnamed { .. } => out.push_str(element.raw()),
        }
    }

    out.push_str(line.trailing());
    out
}

/// Rebuild a message with the policy's fields transformed.
pub fn redact_message(
    message: &LogMessage,
    policy: &RedactionPolicy,
    registry: &FieldRegistry,
    pepper: &[u8],
) -> String {
    redact_line(message.line(), policy, registry, pepper)
}

/// Rebuild an audit record with the policy's fields transformed in the header, the
/// detail comments and the change record.
///
/// Change record lines are unfolded when any attribute in the record is transformed.
pub fn redact_audit(
    record: &AuditLogMessage,
    policy: &RedactionPolicy,
    registry: &FieldRegistry,
    pepper: &[u8],
) -> String {
    let mut lines = vec![redact_message(record.header(), policy, registry, pepper)];

    for line in record.detail_lines() {
        let body = line.strip_prefix('#').unwrap_or(line);
        let body = body.strip_prefix(' ').unwrap_or(body);
        match transform_ldif_line(body, policy, registry, pepper) {
            Some(transformed) => lines.push(format!("# {transformed}")),
            None => lines.push(line.clone()),
        }
    }

    let change_record = record.change_record_lines();
    let touches_record = unfold_ldif(change_record)
        .iter()
        .filter_map(|line| parse_ldif_attribute(line))
        .any(|attr| policy.transform_for_attribute(&attr.name).is_some());
    if touches_record {
        for line in unfold_ldif(change_record) {
            let transformed = transform_ldif_line(&line, policy, registry, pepper);
            lines.push(transformed.unwrap_or(line));
        }
    } else {
        lines.extend(change_record.iter().cloned());
    }

    lines.join("\n")
}

/// Rebuild any parsed record with the policy's fields transformed.
pub fn redact_record(
    record: &ParsedRecord,
    policy: &RedactionPolicy,
    registry: &FieldRegistry,
    pepper: &[u8],
) -> String {
    match record {
        ParsedRecord::Access(m) => redact_message(m.message(), policy, registry, pepper),
        ParsedRecord::Error(m) => redact_message(m.message(), policy, registry, pepper),
        ParsedRecord::Audit(m) => redact_audit(m, policy, registry, pepper),
    }
}

fn transform_ldif_line(
    line: &str,
    policy: &RedactionPolicy,
    registry: &FieldRegistry,
    pepper: &[u8],
) -> Option<String> {
    let attr = parse_ldif_attribute(line)?;
    let transform = policy.transform_for_attribute(&attr.name)?;
    trace!(field = %attr.name, ?transform, "transforming LDIF attribute");
    let transformed = transform_attribute_value(&attr, transform, registry, pepper);
    Some(ldif_attribute_line(&attr.name, &transformed))
}

fn transform_attribute_value(
    attr: &LdifAttribute,
    transform: FieldTransform,
    registry: &FieldRegistry,
    pepper: &[u8],
) -> String {
    let syntax = registry.syntax_for(&attr.base_name());
    match (attr.value_str(), transform) {
        (Some(value), _) => syntax.transform_raw(value, transform, pepper),
        (None, FieldTransform::RedactEntire | FieldTransform::RedactComponents) => {
            REDACTED_STRING.to_string()
        }
        (None, FieldTransform::TokenizeEntire | FieldTransform::TokenizeComponents) => {
            tokenization::tokenize(&attr.value, pepper)
        }
        (None, FieldTransform::Sanitize) => {
            syntax.transform_raw(&String::from_utf8_lossy(&attr.value), transform, pepper)
        }
    }
}

fn ldif_attribute_line(name: &str, value: &str) -> String {
    let safe = value.chars().all(|c| c.is_ascii() && c != '\n' && c != '\r' && c != '\0')
        && !value.starts_with([' ', ':', '<'])
        && !value.ends_with(' ');
    if safe {
        format!("{name}: {value}")
    } else {
        let encoded = base64::engine::general_purpose::STANDARD.encode(value);
        format!("{name}:: {encoded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AccessLogMessage;
    use crate::tokenization;

    const LINE: &str = r#"[24/Aug/2018:12:11:50 -0500] SEARCH REQUEST conn=1  op=2 msgID=3 requesterDN="uid=jdoe,dc=example" filter="(uid=jdoe)" trailing"#;

    fn parsed() -> AccessLogMessage {
        AccessLogMessage::parse(LINE).unwrap()
    }

    #[test]
    fn empty_policy_reproduces_line() {
        let out = redact_message(
            parsed().message(),
            &RedactionPolicy::new(),
            &FieldRegistry::standard(),
            b"",
        );
        assert_eq!(out, LINE);
    }

    #[test]
    fn redacts_whole_values_and_keeps_everything_else() {
        let policy = RedactionPolicy::new().redact_fields(["requesterDN", "filter"], false);
        let out = redact_message(parsed().message(), &policy, &FieldRegistry::standard(), b"");
        assert_eq!(
            out,
            r#"[24/Aug/2018:12:11:50 -0500] SEARCH REQUEST conn=1  op=2 msgID=3 requesterDN="{REDACTED}" filter="{REDACTED}" trailing"#
        );
    }

    #[test]
    fn redacts_dn_components() {
        let policy = RedactionPolicy::new().redact_fields(["requesterDN"], true);
        let out = redact_message(parsed().message(), &policy, &FieldRegistry::standard(), b"");
        assert!(out.contains(r#"requesterDN="uid={REDACTED},dc={REDACTED}""#));
        // Still a parseable line afterwards.
        let reparsed = AccessLogMessage::parse(&out).unwrap();
        assert_eq!(reparsed.requester_dn(), Some("uid={REDACTED},dc={REDACTED}"));
        assert_eq!(reparsed.connection_id(), Some(1));
    }

    #[test]
    fn tokenizes_deterministically() {
        let policy = RedactionPolicy::new().tokenize_fields(["filter"], false);
        let registry = FieldRegistry::standard();
        let first = redact_message(parsed().message(), &policy, &registry, b"pepper");
        let second = redact_message(parsed().message(), &policy, &registry, b"pepper");
        assert_eq!(first, second);
        let token = tokenization::tokenize(b"(uid=jdoe)", b"pepper");
        assert!(first.contains(&format!(r#"filter="{token}""#)));
        assert!(!first.contains("(uid=jdoe)"));
    }

    #[test]
    fn duplicate_fields_are_all_redacted() {
        let line = "[24/Aug/2018:12:11:50 -0500] BIND REQUEST dn=first dn=second";
        let message = LogMessage::parse(line).unwrap();
        let policy = RedactionPolicy::new().redact_fields(["dn"], false);
        let out = redact_message(&message, &policy, &FieldRegistry::standard(), b"");
        assert_eq!(
            out,
            r#"[24/Aug/2018:12:11:50 -0500] BIND REQUEST dn="{REDACTED}" dn="{REDACTED}""#
        );
    }

    #[test]
    fn needs_pepper_only_for_tokenizing() {
        assert!(!RedactionPolicy::new().redact_fields(["a"], true).needs_pepper());
        assert!(RedactionPolicy::new().tokenize_fields(["a"], true).needs_pepper());
        assert!(RedactionPolicy::new().is_empty());
    }

    #[test]
    fn later_rule_wins() {
        let policy = RedactionPolicy::new()
            .redact_fields(["dn"], false)
            .tokenize_fields(["dn"], true);
        assert_eq!(policy.transform_for("dn"), Some(FieldTransform::TokenizeComponents));
        assert_eq!(policy.transform_for("other"), None);
    }

    #[test]
    fn audit_record_header_details_and_change_record() {
        let record = AuditLogMessage::parse(
            "# 24/Aug/2018:12:11:50.123 -0500; conn=1; op=2; requesterDN=\"uid=admin,dc=example\"\n\
             # Deleted entry attributes\n\
             # uid: jdoe\n\
             # cn: John Doe\n\
             dn: uid=jdoe,dc=example\n\
             changetype: delete",
        )
        .unwrap();
        let policy = RedactionPolicy::new()
            .redact_fields(["requesterDN", "dn"], true)
            .redact_fields(["uid"], false);
        let out = redact_audit(&record, &policy, &FieldRegistry::standard(), b"");
        assert_eq!(
            out,
            "# 24/Aug/2018:12:11:50.123 -0500; conn=1; op=2; requesterDN=\"uid={REDACTED},dc={REDACTED}\"\n\
             # Deleted entry attributes\n\
             # uid: {REDACTED}\n\
             # cn: John Doe\n\
             dn: uid={REDACTED},dc={REDACTED}\n\
             changetype: delete"
        );
    }

    fn audit_with_change_record(lines: &str) -> AuditLogMessage {
        AuditLogMessage::parse(&format!(
            "# 24/Aug/2018:12:11:50 -0500; conn=1; op=2\ndn: uid=jdoe,dc=example\nchangetype: add\n{lines}"
        ))
        .unwrap()
    }

    #[test]
    fn ldif_attributes_match_case_insensitively() {
        let record = audit_with_change_record("userpassword: hunter2");
        let policy = RedactionPolicy::new().redact_fields(["userPassword"], false);
        let out = redact_audit(&record, &policy, &FieldRegistry::standard(), b"");
        assert!(out.ends_with("userpassword: {REDACTED}"), "{out}");
        assert!(!out.contains("hunter2"));
    }

    #[test]
    fn ldif_attributes_with_options_match_their_type() {
        let record = AuditLogMessage::parse(
            "# 24/Aug/2018:12:11:50 -0500; conn=1\n\
             # cn;lang-en: Detail Name\n\
             dn: uid=jdoe,dc=example\n\
             changetype: add\n\
             cn;lang-en: Secret Name",
        )
        .unwrap();
        let policy = RedactionPolicy::new().redact_fields(["cn"], false);
        let out = redact_audit(&record, &policy, &FieldRegistry::standard(), b"");
        assert!(out.contains("# cn;lang-en: {REDACTED}"), "{out}");
        assert!(out.ends_with("cn;lang-en: {REDACTED}"), "{out}");
        assert!(!out.contains("Secret Name"));
        assert!(!out.contains("Detail Name"));
        assert_eq!(policy.transform_for_attribute("CN;x-opt"), Some(FieldTransform::RedactEntire));
        assert_eq!(policy.transform_for("CN"), None);
    }

    #[test]
    fn binary_ldif_values_are_redacted_and_tokenized() {
        let record = audit_with_change_record("userPassword:: //5odW50");
        let registry = FieldRegistry::standard();

        let redacted = redact_audit(
            &record,
            &RedactionPolicy::new().redact_fields(["userPassword"], false),
            &registry,
            b"",
        );
        assert!(redacted.ends_with("userPassword: {REDACTED}"), "{redacted}");
        assert!(!redacted.contains("//5odW50"));

        let tokenized = redact_audit(
            &record,
            &RedactionPolicy::new().tokenize_fields(["userPassword"], false),
            &registry,
            b"pepper",
        );
        let token = tokenization::tokenize(&[0xff, 0xfe, b'h', b'u', b'n', b't'], b"pepper");
        assert!(tokenized.ends_with(&format!("userPassword: {token}")), "{tokenized}");
    }

    #[test]
    fn binary_detail_values_are_redacted() {
        let record = AuditLogMessage::parse(
            "# 24/Aug/2018:12:11:50 -0500; conn=1\n\
             # userPassword:: //5odW50\n\
             dn: uid=jdoe,dc=example\n\
             changetype: delete",
        )
        .unwrap();
        let policy = RedactionPolicy::new().redact_fields(["userPassword"], false);
        let out = redact_audit(&record, &policy, &FieldRegistry::standard(), b"");
        assert!(out.contains("# userPassword: {REDACTED}"), "{out}");
        assert!(!out.contains("//5odW50"));
    }

    #[test]
    fn free_text_in_dn_field_is_not_kept_as_attribute_name() {
        let message =
            LogMessage::parse(r#"[24/Aug/2018:12:11:50 -0500] BIND REQUEST dn="my password is hunter2 =x""#)
                .unwrap();
        let policy = RedactionPolicy::new().redact_fields(["dn"], true);
        let out = redact_message(&message, &policy, &FieldRegistry::standard(), b"");
        assert_eq!(out, r#"[24/Aug/2018:12:11:50 -0500] BIND REQUEST dn="{REDACTED}""#);
    }

    #[test]
    fn unsafe_ldif_values_are_base64() {
        assert_eq!(ldif_attribute_line("cn", "plain"), "cn: plain");
        assert_eq!(ldif_attribute_line("cn", " lead"), "cn:: IGxlYWQ=");
    }
}
