//! Access log messages.
//!
//! An access log line looks like
//! `[24/Aug/2018:12:11:50 -0500] DELETE RESULT conn=1 op=2 msgID=3 resultCode=0 etime=0.123`.
//! The operation type and message type come from the unnamed tokens; everything else is a
//! named field read through the typed accessors.

use crate::model::enums::{AccessLogMessageType, OperationType};
use crate::model::error::ParseError;
use crate::model::fields::FieldSet;
use crate::model::message::LogMessage;
use crate::model::timestamp::Timestamp;
use std::fmt;

/// Well-known access log field names.
pub mod field {
    /// Server product name.
    pub const PRODUCT_NAME: &str = "product";
    /// Server instance name.
    pub const INSTANCE_NAME: &str = "instanceName";
    /// Identifier of the server start the message belongs to.
    pub const STARTUP_ID: &str = "startupID";
    /// Identifier of the thread that wrote the message.
    pub const THREAD_ID: &str = "threadID";
    /// Client connection identifier.
    pub const CONNECTION_ID: &str = "conn";
    /// Operation identifier within the connection.
    pub const OPERATION_ID: &str = "op";
    /// LDAP message identifier.
    pub const MESSAGE_ID: &str = "msgID";
    /// Where the operation originated (`internal`, `replication`, ...).
    pub const ORIGIN: &str = "origin";
    /// DN of the user that requested the operation.
    pub const REQUESTER_DN: &str = "requesterDN";
    /// Address of the client that requested the operation.
    pub const REQUESTER_IP: &str = "requesterIP";
    /// LDAP result code.
    pub const RESULT_CODE: &str = "resultCode";
    /// Processing time in milliseconds.
    pub const PROCESSING_TIME: &str = "etime";
    /// Diagnostic message returned to the client.
    pub const DIAGNOSTIC_MESSAGE: &str = "diagnosticMessage";
    /// Additional information logged but not returned to the client.
    pub const ADDITIONAL_INFO: &str = "additionalInfo";
    /// Matched DN returned to the client.
    pub const MATCHED_DN: &str = "matchedDN";
    /// Servers accessed while processing the operation.
    pub const SERVERS_ACCESSED: &str = "serversAccessed";
    /// Whether uncached data was accessed.
    pub const UNCACHED_DATA_ACCESSED: &str = "uncachedDataAccessed";
    /// Intermediate client request control contents.
    pub const INTERMEDIATE_CLIENT_REQUEST: &str = "via";
    /// Target entry DN of the operation.
    pub const DN: &str = "dn";
    /// Search base DN.
    pub const BASE_DN: &str = "base";
    /// Search scope.
    pub const SCOPE: &str = "scope";
    /// Search filter.
    pub const FILTER: &str = "filter";
    /// Number of entries returned by a search.
    pub const ENTRIES_RETURNED: &str = "entriesReturned";
    /// Client address of a connection.
    pub const SOURCE_ADDRESS: &str = "from";
    /// Server address of a connection.
    pub const TARGET_ADDRESS: &str = "to";
    /// Protocol of a connection.
    pub const PROTOCOL: &str = "protocol";
    /// Why a connection was closed.
    pub const DISCONNECT_REASON: &str = "reason";
    /// Bind authentication type.
    pub const BIND_AUTHENTICATION_TYPE: &str = "authType";
    /// Extended request OID.
    pub const EXTENDED_REQUEST_OID: &str = "requestOID";
}

/// A parsed access log message.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessLogMessage {
    message: LogMessage,
    operation_type: Option<OperationType>,
    message_type: Option<AccessLogMessageType>,
}

impl AccessLogMessage {
    /// Parse an access log line.
    ///
    /// # Errors
    ///
    /// Returns the tokenizer's `ParseError` for a malformed line.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        LogMessage::parse(line).map(Self::from_message)
    }

    /// Interpret a generic message as an access log message.
    ///
    /// The first unnamed token naming an operation type sets the operation type; the next
    /// unnamed token naming a message type sets the message type. Other unnamed tokens stay
    /// plain unnamed values.
    pub fn from_message(message: LogMessage) -> Self {
        let tokens = message.unnamed_values();
        let operation_position = tokens
            .iter()
            .position(|t| t.parse::<OperationType>().is_ok());
        let operation_type = operation_position.and_then(|i| tokens[i].parse().ok());

        let after_operation = operation_position.map_or(0, |i| i + 1);
        let message_type = tokens[after_operation..]
            .iter()
            .find_map(|t| t.parse::<AccessLogMessageType>().ok());

        Self {
            message,
            operation_type,
            message_type,
        }
    }

    /// Build a message observably identical to `other`.
    pub fn copy_from(other: &AccessLogMessage) -> Self {
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

    /// The LDAP operation, absent for connection-level messages.
    pub fn operation_type(&self) -> Option<OperationType> {
        self.operation_type
    }

    /// The message type.
    pub fn message_type(&self) -> Option<AccessLogMessageType> {
        self.message_type
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

    /// Client connection identifier.
    pub fn connection_id(&self) -> Option<i64> {
        self.fields().get_long(field::CONNECTION_ID)
    }

    /// Operation identifier.
    pub fn operation_id(&self) -> Option<i64> {
        self.fields().get_long(field::OPERATION_ID)
    }

    /// LDAP message identifier.
    pub fn message_id(&self) -> Option<i32> {
        self.fields().get_integer(field::MESSAGE_ID)
    }

    /// Operation origin.
    pub fn origin(&self) -> Option<&str> {
        self.fields().get_string(field::ORIGIN)
    }

    /// Requester DN.
    pub fn requester_dn(&self) -> Option<&str> {
        self.fields().get_dn(field::REQUESTER_DN)
    }

    /// Requester address.
    pub fn requester_ip(&self) -> Option<&str> {
        self.fields().get_string(field::REQUESTER_IP)
    }

    /// LDAP result code.
    pub fn result_code(&self) -> Option<i32> {
        self.fields().get_integer(field::RESULT_CODE)
    }

    /// Processing time in milliseconds.
    pub fn processing_time_ms(&self) -> Option<f64> {
        self.fields().get_double(field::PROCESSING_TIME)
    }

    /// Diagnostic message returned to the client.
    pub fn diagnostic_message(&self) -> Option<&str> {
        self.fields().get_string(field::DIAGNOSTIC_MESSAGE)
    }

    /// Additional information.
    pub fn additional_info(&self) -> Option<&str> {
        self.fields().get_string(field::ADDITIONAL_INFO)
    }

    /// Matched DN.
    pub fn matched_dn(&self) -> Option<&str> {
        self.fields().get_dn(field::MATCHED_DN)
    }

    /// Servers accessed while processing the operation.
    pub fn servers_accessed(&self) -> Option<Vec<String>> {
        self.fields().get_list(field::SERVERS_ACCESSED)
    }

    /// Whether uncached data was accessed.
    pub fn uncached_data_accessed(&self) -> Option<bool> {
        self.fields().get_boolean(field::UNCACHED_DATA_ACCESSED)
    }

    /// Intermediate client request contents.
    pub fn intermediate_client_request(&self) -> Option<&str> {
        self.fields().get_string(field::INTERMEDIATE_CLIENT_REQUEST)
    }

    /// Target entry DN.
    pub fn dn(&self) -> Option<&str> {
        self.fields().get_dn(field::DN)
    }

    /// Search base DN.
    pub fn base_dn(&self) -> Option<&str> {
        self.fields().get_dn(field::BASE_DN)
    }

    /// Search scope.
    pub fn scope(&self) -> Option<&str> {
        self.fields().get_string(field::SCOPE)
    }

    /// Search filter.
    pub fn filter(&self) -> Option<&str> {
        self.fields().get_string(field::FILTER)
    }

    /// Number of entries a search returned.
    pub fn entries_returned(&self) -> Option<i64> {
        self.fields().get_long(field::ENTRIES_RETURNED)
    }

    /// Client address.
    pub fn source_address(&self) -> Option<&str> {
        self.fields().get_string(field::SOURCE_ADDRESS)
    }

    /// Server address.
    pub fn target_address(&self) -> Option<&str> {
        self.fields().get_string(field::TARGET_ADDRESS)
    }

    /// Connection protocol.
    pub fn protocol(&self) -> Option<&str> {
        self.fields().get_string(field::PROTOCOL)
    }

    /// Disconnect reason.
    pub fn disconnect_reason(&self) -> Option<&str> {
        self.fields().get_string(field::DISCONNECT_REASON)
    }

    /// Bind authentication type.
    pub fn bind_authentication_type(&self) -> Option<&str> {
        self.fields().get_string(field::BIND_AUTHENTICATION_TYPE)
    }

    /// Extended request OID.
    pub fn extended_request_oid(&self) -> Option<&str> {
        self.fields().get_string(field::EXTENDED_REQUEST_OID)
    }
}

impl fmt::Display for AccessLogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.message, f)
    }
}
