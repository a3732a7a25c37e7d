//! Closed enumerations of log tokens.
//!
//! Each enumeration maps to the exact upper-case token that appears in log lines.
//! Parsing is case-sensitive: log writers always emit the canonical spelling.

use crate::model::error::UnknownVariant;

macro_rules! log_token_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $token:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The token as written in log lines.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $token ),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $token => Ok($name::$variant), )+
                    _ => Err(UnknownVariant::new($kind, s)),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

log_token_enum! {
    /// The LDAP operation an access log message describes.
    OperationType, "operation type" {
        /// Abandon operation.
        Abandon => "ABANDON",
        /// Add operation.
        Add => "ADD",
        /// Bind operation.
        Bind => "BIND",
        /// Compare operation.
        Compare => "COMPARE",
        /// Delete operation.
        Delete => "DELETE",
        /// Extended operation.
        Extended => "EXTENDED",
        /// Modify operation.
        Modify => "MODIFY",
        /// Modify DN operation.
        ModifyDn => "MODDN",
        /// Search operation.
        Search => "SEARCH",
        /// Unbind operation.
        Unbind => "UNBIND",
    }
}

log_token_enum! {
    /// What stage of a connection or operation an access log message records.
    AccessLogMessageType, "access log message type" {
        /// A client connection was established.
        Connect => "CONNECT",
        /// A client connection was closed.
        Disconnect => "DISCONNECT",
        /// TLS negotiation completed on a connection.
        SecurityNegotiation => "SECURITY-NEGOTIATION",
        /// A client presented a certificate chain.
        ClientCertificate => "CLIENT-CERTIFICATE",
        /// An operation request was received.
        Request => "REQUEST",
        /// An operation completed.
        Result => "RESULT",
        /// An operation was forwarded to another server.
        Forward => "FORWARD",
        /// Forwarding an operation failed.
        ForwardFailed => "FORWARD-FAILED",
        /// Replication assurance for an operation completed.
        AssuranceComplete => "ASSURANCE-COMPLETE",
        /// A search result entry was returned.
        Entry => "ENTRY",
        /// A search result reference was returned.
        Reference => "REFERENCE",
        /// An intermediate response was returned.
        IntermediateResponse => "INTERMEDIATE-RESPONSE",
    }
}

log_token_enum! {
    /// The server component an error log message originates from.
    ErrorLogCategory, "error log category" {
        /// Access control evaluation.
        AccessControl => "ACCESS_CONTROL",
        /// Administrative interfaces.
        Admin => "ADMIN",
        /// Administrative tools.
        AdminTool => "ADMIN_TOOL",
        /// Backends.
        Backend => "BACKEND",
        /// Configuration handling.
        Config => "CONFIG",
        /// The server core.
        Core => "CORE",
        /// The configuration CLI.
        Dsconfig => "DSCONFIG",
        /// Server extensions.
        Extensions => "EXTENSIONS",
        /// The database environment.
        Jeb => "JEB",
        /// Logging subsystem.
        Log => "LOG",
        /// Plugins.
        Plugin => "PLUGIN",
        /// Protocol handling.
        Protocol => "PROTOCOL",
        /// Resource quotas.
        Quota => "QUOTA",
        /// Replication.
        Replication => "REPLICATION",
        /// Runtime information.
        RuntimeInformation => "RUNTIME_INFORMATION",
        /// Schema handling.
        Schema => "SCHEMA",
        /// Synchronization.
        Sync => "SYNC",
        /// Scheduled tasks.
        Task => "TASK",
        /// Third-party extensions.
        ThirdParty => "THIRD_PARTY",
        /// Command-line tools.
        Tools => "TOOLS",
        /// User-defined messages.
        UserDefined => "USER_DEFINED",
        /// Utility code.
        Util => "UTIL",
        /// Version information.
        Version => "VERSION",
    }
}

log_token_enum! {
    /// The severity of an error log message.
    ErrorLogSeverity, "error log severity" {
        /// Debug output.
        Debug => "DEBUG",
        /// A fatal error.
        FatalError => "FATAL_ERROR",
        /// Informational message.
        Information => "INFORMATION",
        /// A mild error.
        MildError => "MILD_ERROR",
        /// A mild warning.
        MildWarning => "MILD_WARNING",
        /// A notice.
        Notice => "NOTICE",
        /// A severe error.
        SevereError => "SEVERE_ERROR",
        /// A severe warning.
        SevereWarning => "SEVERE_WARNING",
    }
}

log_token_enum! {
    /// The LDIF change type of an audit log change record.
    ChangeType, "change type" {
        /// An entry was added.
        Add => "add",
        /// An entry was deleted.
        Delete => "delete",
        /// An entry was modified.
        Modify => "modify",
        /// An entry was renamed or moved.
        ModifyDn => "moddn",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_round_trips_through_its_token() {
        for op in OperationType::ALL {
            assert_eq!(op.as_str().parse::<OperationType>(), Ok(*op));
        }
        for t in AccessLogMessageType::ALL {
            assert_eq!(t.as_str().parse::<AccessLogMessageType>(), Ok(*t));
        }
        for c in ErrorLogCategory::ALL {
            assert_eq!(c.as_str().parse::<ErrorLogCategory>(), Ok(*c));
        }
        for s in ErrorLogSeverity::ALL {
            assert_eq!(s.as_str().parse::<ErrorLogSeverity>(), Ok(*s));
        }
        for c in ChangeType::ALL {
            assert_eq!(c.as_str().parse::<ChangeType>(), Ok(*c));
        }
    }

    #[test]
    fn unknown_token_reports_kind() {
        let err = "INVALID".parse::<ErrorLogCategory>().unwrap_err();
        assert_eq!(err.kind, "error log category");
        assert_eq!(err.value, "INVALID");
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!("delete".parse::<OperationType>().is_err());
        assert!("DELETE".parse::<ChangeType>().is_err());
    }

    #[test]
    fn display_matches_token() {
        assert_eq!(AccessLogMessageType::AssuranceComplete.to_string(), "ASSURANCE-COMPLETE");
        assert_eq!(OperationType::ModifyDn.to_string(), "MODDN");
    }
}
