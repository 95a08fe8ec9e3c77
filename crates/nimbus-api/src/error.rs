// Transport-layer error types.
//
// Consumers (nimbus-core) translate these into domain-appropriate
// variants; the one signal that crosses layers untouched is
// `AuthorizationPending`, which the device-flow poller treats as
// "keep waiting" rather than a failure.

use thiserror::Error;

/// Errors produced by the Nimbus API client.
#[derive(Debug, Error)]
pub enum Error {
    /// Network / connection failure from reqwest.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success response from the API.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The API key was rejected or missing.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// OAuth device flow: the operator has not yet approved the grant.
    ///
    /// Loop-internal signal for the token poller -- never surfaced to
    /// the operator.
    #[error("authorization pending")]
    AuthorizationPending,

    /// A response body could not be decoded into the expected shape.
    #[error("failed to decode response: {message}")]
    Deserialization { message: String },

    /// A URL could not be constructed from the configured host.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Whether this error is the device-flow "not yet" signal.
    pub fn is_authorization_pending(&self) -> bool {
        matches!(self, Self::AuthorizationPending)
    }
}
