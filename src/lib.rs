//! Structured LDAP server log lines.
//!
//! Parses access, error and audit log records into immutable messages with typed field
//! accessors, reproduces every parsed record byte for byte, and rewrites records with
//! selected fields sanitized, redacted or tokenized through per-type field syntaxes.
//!
//! The read path is [`parser`] → [`model::FieldSet`] → [`model::LogMessage`]. The write
//! path is a field value plus its [`syntax`] (and [`tokenization`] when tokenizing)
//! rendered into a text fragment or a JSON document.

pub mod config;
pub mod logging;
pub mod model;
pub mod parser;
pub mod redact;
pub mod source;
pub mod syntax;
pub mod tokenization;

#[cfg(test)]
mod tests;
