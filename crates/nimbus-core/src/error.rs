// Domain-level error types.
//
// Everything user-facing in the CLI and TUI funnels through
// `CoreError`; transport errors from nimbus-api are folded in via
// `From` so callers can use `?` at the seam.

use thiserror::Error;

use crate::model::ResourceKind;

/// Errors produced by domain operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A resource ID whose prefix matches no known kind.
    #[error("unknown resource type for ID '{id}'")]
    UnknownResourceKind { id: String },

    /// The resolved kind does not support the requested operation.
    #[error("{kind} resources do not support {operation}")]
    UnsupportedOperation {
        kind: ResourceKind,
        operation: &'static str,
    },

    /// The device grant expired before the operator approved it.
    #[error("login timed out; please try again")]
    AuthorizationExpired,

    /// The token endpoint rejected the grant outright.
    #[error("login failed: {message}")]
    AuthorizationFailed { message: String },

    /// Network or API failure, passed through opaquely.
    #[error("{message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    /// Operator input that fails a precondition.
    #[error("{message}")]
    Validation { message: String },

    /// Missing or malformed local configuration.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<nimbus_api::Error> for CoreError {
    fn from(err: nimbus_api::Error) -> Self {
        match err {
            nimbus_api::Error::Api { status, message } => Self::Api {
                message,
                status: Some(status),
            },
            nimbus_api::Error::Unauthorized { message } => Self::Api {
                message,
                status: Some(401),
            },
            // The poller consumes this before conversion; if it leaks,
            // treat it as a failed login rather than panicking.
            nimbus_api::Error::AuthorizationPending => Self::AuthorizationFailed {
                message: "authorization still pending".to_owned(),
            },
            other => Self::Api {
                message: other.to_string(),
                status: None,
            },
        }
    }
}
