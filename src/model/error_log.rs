//! Error log messages.
//!
//! `[24/Aug/2018:12:11:50 -0500] category=CORE severity=NOTICE msgID=458887 msg="Started"`

use crate::model::enums::{ErrorLogCategory, ErrorLogSeverity};
use crate::model::error::ParseError;
use crate::model::fields::FieldSet;
use crate::model::message::LogMessage;
use crate::model::timestamp::Timestamp;
use std::fmt;

/// Well-known error log field names.
pub mod field {
    /// Message category.
    pub const CATEGORY: &str = "category";
    /// Message severity.
    pub const SEVERITY: &str = "severity";
    /// Numeric message identifier.
    pub const MESSAGE_ID: &str = "msgID";
    /// Human-readable message text.
    pub const MESSAGE: &str = "msg";
    /// Server product name.
    pub const PRODUCT_NAME: &str = "product";
    /// Server instance name.
    pub const INSTANCE_NAME: &str = "instanceName";
    /// Server startup identifier.
    pub const STARTUP_ID: &str = "startupID";
    /// Writing thread identifier.
    pub const THREAD_ID: &str = "threadID";
    /// Connection the message relates to.
    pub const CONNECTION_ID: &str = "conn";
    /// Operation the message relates to.
    pub const OPERATION_ID: &str = "op";
}

/// A parsed error log message.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorLogMessage {
    message: LogMessage,
}

impl ErrorLogMessage {
    /// Parse an error log line.
    ///
    /// # Errors
    ///
    /// Returns the tokenizer's `ParseError` for a malformed line.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        LogMessage::parse(line).map(Self::from_message)
    }

    /// Interpret a generic message as an error log message.
    pub fn from_message(message: LogMessage) -> Self {
        Self { message }
    }

    /// Build a message observably identical to `other`.
    pub fn copy_from(other: &ErrorLogMessage) -> Self {
        Self::from_message(LogMessage::copy_from(&other.message))
    }

    /// The generic message underneath.
    pub fn message(&self) -> &LogMessage {
        &self.message
    }

    /// The exact source line.
    pub fn format(&self) -> String {
        self.message.format()
    }

    /// The message timestamp.
    pub fn timestamp(&self) -> &Timestamp {
        self.message.timestamp()
    }

    /// Typed field accessors.
    pub fn fields(&self) -> &FieldSet {
        self.message.fields()
    }

    /// Raw value of a named field.
    pub fn get_raw_named_value(&self, key: &str) -> Option<&str> {
        self.message.get_raw_named_value(key)
    }

    /// Message category, `None` when absent or not a known category.
    pub fn category(&self) -> Option<ErrorLogCategory> {
        self.fields().get_enum(field::CATEGORY)
    }

    /// Message severity, `None` when absent or not a known severity.
    pub fn severity(&self) -> Option<ErrorLogSeverity> {
        self.fields().get_enum(field::SEVERITY)
    }

    /// Numeric message identifier.
    pub fn message_id(&self) -> Option<i64> {
        self.fields().get_long(field::MESSAGE_ID)
    }

    /// Human-readable message text.
    pub fn message_text(&self) -> Option<&str> {
        self.fields().get_string(field::MESSAGE)
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

    /// Related connection identifier.
    pub fn connection_id(&self) -> Option<i64> {
        self.fields().get_long(field::CONNECTION_ID)
    }

    /// Related operation identifier.
    pub fn operation_id(&self) -> Option<i64> {
        self.fields().get_long(field::OPERATION_ID)
    }
}

impl fmt::Display for ErrorLogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.message, f)
    }
}
