//! Error types for ldaplog.
//!
//! This module defines the error taxonomy using `thiserror`. Errors compose via `?` and
//! `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error for the command-line tool
//!   - [`InputError`] - Log file/stdin reading failures
//!   - [`ParseError`] - Log line tokenizing failures (bad timestamp prefix, open quote)
//!   - [`crate::config::ConfigError`] - Configuration file failures
//!   - [`crate::logging::LoggingError`] - Tracing subscriber setup failures
//! - [`SyntaxError`] - A field value does not conform to a field syntax
//! - [`UnknownVariant`] - A token is not a member of a closed enumeration
//!
//! # Recovery Strategy
//!
//! Parse errors are fatal for the line they describe and nothing else: the caller decides
//! whether to skip the line or abort. Type mismatches on individual fields are never errors
//! at the message level; the typed getter answers `None` and the raw text stays reachable.
//! Unknown field names are never errors at all.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error encompassing all failure modes of the CLI.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to read input from file or stdin.
    #[error("Failed to read input: {0}")]
    InputRead(#[from] InputError),

    /// A record could not be parsed and malformed records are not being skipped.
    #[error("Failed to parse log record: {0}")]
    Parse(#[from] ParseError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// The tracing subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Writing output failed (usually a closed stdout pipe).
    #[error("Output error: {0}")]
    Output(#[source] std::io::Error),
}

/// Errors encountered when reading log input from files or stdin.
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified log file does not exist at the given path.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use ldaplog::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing-access.log")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing-access.log"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The filesystem path that was not found.
        path: PathBuf,
    },

    /// Generic I/O error reading from the input source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors encountered when tokenizing a log line or assembling a multi-line record.
///
/// Every variant is fatal for the record being parsed. No retries are meaningful: parsing
/// is a pure function of its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line does not begin with a timestamp prefix, or the prefix is unterminated,
    /// or the prefix body is not a valid `dd/MMM/yyyy:HH:mm:ss[.SSS] Z` timestamp.
    ///
    /// # Examples
    ///
    /// ```
    /// use ldaplog::model::error::ParseError;
    ///
    /// let err = ParseError::MalformedTimestamp {
    ///     raw: "24/Aug/2018:12:11:50".to_string()
    /// };
    /// assert!(err.to_string().contains("24/Aug/2018:12:11:50"));
    /// ```
    #[error("Malformed timestamp '{raw}'")]
    MalformedTimestamp {
        /// The text that was expected to hold the timestamp.
        ///
        /// For a missing bracket this is the start of the line, capped at a few dozen
        /// characters so that error messages stay readable.
        raw: String,
    },

    /// A double-quoted value was opened but never closed before the end of the line.
    #[error("Unterminated quoted value starting at byte {position}")]
    UnterminatedQuote {
        /// Byte offset into the line where the unterminated token begins.
        position: usize,
    },

    /// A multi-line record was built from an empty list of lines.
    #[error("Log record has no lines")]
    EmptyMessage,

    /// The input line is not valid UTF-8.
    #[error("Line is not valid UTF-8 (first invalid byte at {position})")]
    InvalidUtf8 {
        /// Byte offset of the first invalid byte in the line.
        position: usize,
    },

    /// The first line of an audit record is not a `# <timestamp>; ...` header.
    #[error("Audit record header must start with '# ', got '{line}'")]
    MissingAuditHeader {
        /// The offending first line.
        line: String,
    },
}

/// A value does not conform to the field syntax it was handed to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// The text could not be parsed as a value of the named syntax.
    #[error("Value '{value}' is not a valid {syntax} value: {reason}")]
    InvalidValue {
        /// Canonical syntax name (for example `integer` or `distinguished-name`).
        syntax: &'static str,
        /// The rejected text.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl SyntaxError {
    pub(crate) fn invalid(
        syntax: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SyntaxError::InvalidValue {
            syntax,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// A token is not a member of the closed enumeration it was parsed against.
///
/// Returned by the `FromStr` implementations of the operation-type, message-type,
/// category, severity and change-type enumerations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized {kind} '{value}'")]
pub struct UnknownVariant {
    /// Which enumeration rejected the token.
    pub kind: &'static str,
    /// The rejected token.
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn input_error_file_not_found_display() {
        let err = InputError::FileNotFound {
            path: PathBuf::from("/tmp/missing-access.log"),
        };
        let msg = err.to_string();
        assert!(msg.contains("File not found"));
        assert!(msg.contains("/tmp/missing-access.log"));
    }

    #[test]
    fn input_error_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let input_err: InputError = io_err.into();
        let msg = input_err.to_string();
        assert!(msg.contains("IO error"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn parse_error_malformed_timestamp_display() {
        let err = ParseError::MalformedTimestamp {
            raw: "not a timestamp".to_string(),
        };
        assert_eq!(err.to_string(), "Malformed timestamp 'not a timestamp'");
    }

    #[test]
    fn parse_error_unterminated_quote_display() {
        let err = ParseError::UnterminatedQuote { position: 42 };
        assert!(err.to_string().contains("byte 42"));
    }

    #[test]
    fn syntax_error_names_syntax_and_value() {
        let err = SyntaxError::invalid("integer", "abc", "invalid digit found in string");
        let msg = err.to_string();
        assert!(msg.contains("'abc'"));
        assert!(msg.contains("integer"));
        assert!(msg.contains("invalid digit"));
    }

    #[test]
    fn unknown_variant_display() {
        let err = UnknownVariant::new("error log category", "INVALID");
        assert_eq!(err.to_string(), "Unrecognized error log category 'INVALID'");
    }

    #[test]
    fn app_error_from_input_error() {
        let app_err: AppError = InputError::FileNotFound {
            path: PathBuf::from("x.log"),
        }
        .into();
        let msg = app_err.to_string();
        assert!(msg.contains("Failed to read input"));
        assert!(msg.contains("x.log"));
    }

    #[test]
    fn app_error_from_parse_error() {
        let app_err: AppError = ParseError::EmptyMessage.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Failed to parse log record"));
        assert!(msg.contains("no lines"));
    }

    #[test]
    fn app_error_nested_io_through_input_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let input_err: InputError = io_err.into();
        let app_err: AppError = input_err.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Failed to read input"));
        assert!(msg.contains("IO error"));
        assert!(msg.contains("file not found"));
    }
}
