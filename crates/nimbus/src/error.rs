//! CLI error type with diagnostic codes, help text, and exit codes.

use miette::Diagnostic;
use nimbus_config::ConfigError;
use nimbus_core::CoreError;
use thiserror::Error;

/// Process exit codes. Scripts key off these, so they are stable.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("not logged in")]
    #[diagnostic(code(nimbus::auth::not_logged_in), help("run `nimbus login` first"))]
    NotLoggedIn,

    #[error("session expired")]
    #[diagnostic(code(nimbus::auth::session_expired), help("run `nimbus login` to refresh your session"))]
    SessionExpired,

    #[error("no workspace selected")]
    #[diagnostic(code(nimbus::config::no_workspace), help("run `nimbus workspace set` to pick one"))]
    NoWorkspace,

    #[error("login failed: {message}")]
    #[diagnostic(code(nimbus::auth::failed))]
    AuthFailed { message: String },

    #[error("login request expired before it was approved")]
    #[diagnostic(code(nimbus::auth::expired), help("run `nimbus login` again and approve the request promptly"))]
    AuthExpired,

    #[error("unknown resource ID '{id}'")]
    #[diagnostic(
        code(nimbus::resource::unknown),
        help("resource IDs start with srv-, dpg-, red-, or crn-")
    )]
    UnknownResource { id: String },

    #[error("{kind} resources do not support {operation}")]
    #[diagnostic(code(nimbus::resource::unsupported))]
    Unsupported {
        kind: String,
        operation: &'static str,
    },

    #[error("not found: {message}")]
    #[diagnostic(code(nimbus::api::not_found))]
    NotFound { message: String },

    #[error("API error: {message}")]
    #[diagnostic(code(nimbus::api::error))]
    Api { message: String },

    #[error("{message}")]
    #[diagnostic(code(nimbus::usage))]
    Usage { message: String },

    #[error("confirmation required")]
    #[diagnostic(
        code(nimbus::usage::confirm),
        help("re-run with --confirm to skip the prompt in scripts")
    )]
    ConfirmationRequired,

    #[error("configuration error: {message}")]
    #[diagnostic(code(nimbus::config::error))]
    Config { message: String },

    #[error("terminal error: {message}")]
    #[diagnostic(
        code(nimbus::terminal),
        help("re-run with `-o text` to bypass the interactive session")
    )]
    Terminal { message: String },
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotLoggedIn | Self::SessionExpired | Self::AuthFailed { .. } | Self::AuthExpired => {
                exit_code::AUTH
            }
            Self::UnknownResource { .. }
            | Self::Unsupported { .. }
            | Self::Usage { .. }
            | Self::ConfirmationRequired => exit_code::USAGE,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Terminal { .. } => exit_code::CONNECTION,
            Self::Api { .. } | Self::NoWorkspace | Self::Config { .. } => exit_code::GENERAL,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownResourceKind { id } => Self::UnknownResource { id },
            CoreError::UnsupportedOperation { kind, operation } => Self::Unsupported {
                kind: kind.to_string(),
                operation,
            },
            CoreError::AuthorizationExpired => Self::AuthExpired,
            CoreError::AuthorizationFailed { message } => Self::AuthFailed { message },
            CoreError::Api { message, status } => match status {
                Some(401) => Self::SessionExpired,
                Some(404) => Self::NotFound { message },
                _ => Self::Api { message },
            },
            CoreError::Validation { message } => Self::Usage { message },
            CoreError::Config { message } => Self::Config { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotLoggedIn => Self::NotLoggedIn,
            ConfigError::SessionExpired => Self::SessionExpired,
            ConfigError::NoWorkspace => Self::NoWorkspace,
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
