//! Domain model types (pure).
//!
//! Parsed log lines and the messages built from them. Everything here is immutable once
//! constructed and free of I/O.

pub mod access;
pub mod audit;
pub mod enums;
pub mod error;
pub mod error_log;
pub mod fields;
pub mod line;
pub mod malformed;
pub mod message;
pub mod timestamp;

// Re-export for convenience
pub use access::AccessLogMessage;
pub use audit::AuditLogMessage;
pub use enums::{AccessLogMessageType, ChangeType, ErrorLogCategory, ErrorLogSeverity, OperationType};
pub use error::{ParseError, SyntaxError, UnknownVariant};
pub use error_log::ErrorLogMessage;
pub use fields::FieldSet;
pub use line::{ElementKind, LogElement, LogLine};
pub use malformed::MalformedRecord;
pub use message::LogMessage;
pub use timestamp::Timestamp;
