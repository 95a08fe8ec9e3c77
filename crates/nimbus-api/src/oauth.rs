//! OAuth device authorization endpoints.
//!
//! The CLI never sees a password: it requests a [`DeviceGrant`], shows
//! the user code + verification URL, and polls the token endpoint until
//! the operator approves the grant in their browser. The "authorization
//! pending" response is reported as [`Error::AuthorizationPending`] so
//! the poller (nimbus-core) can distinguish "not yet" from real failure.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::transport::NimbusClient;

/// A device authorization grant. Immutable; one per login attempt.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceGrant {
    /// Opaque code the CLI presents when polling for the token.
    pub device_code: String,
    /// Short code the operator types (or confirms) in the dashboard.
    pub user_code: String,
    /// Dashboard URL where the operator approves the grant.
    pub verification_uri: String,
    /// Same URL with the user code pre-filled.
    pub verification_uri_complete: String,
    /// Seconds until this grant expires.
    pub expires_in: u64,
    /// Minimum seconds between token polls.
    pub interval: u64,
}

/// The token issued once a grant is approved.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceToken {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires.
    pub expires_in: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    device_code: &'a str,
}

/// OAuth error body: `{"error": "authorization_pending"}` and friends.
#[derive(Deserialize)]
struct OauthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

const AUTHORIZATION_PENDING: &str = "authorization_pending";

impl NimbusClient {
    /// Request a new device authorization grant.
    pub async fn create_device_grant(&self) -> Result<DeviceGrant, Error> {
        let url = self.api_url("v1/oauth/device/grants")?;
        self.post(url, &serde_json::json!({})).await
    }

    /// Poll the token endpoint for a grant.
    ///
    /// Returns [`Error::AuthorizationPending`] while the operator has
    /// not yet approved; callers loop on that variant.
    pub async fn device_token(&self, grant: &DeviceGrant) -> Result<DeviceToken, Error> {
        let url = self.api_url("v1/oauth/device/token")?;
        let body = TokenRequest {
            device_code: &grant.device_code,
        };

        match self.post::<DeviceToken>(url, &body).await {
            Ok(token) => Ok(token),
            Err(Error::Api { status, message }) => {
                // The pending signal arrives as a 400 with an OAuth
                // error body; anything else is a hard failure.
                if let Ok(oauth) = serde_json::from_str::<OauthErrorBody>(&message) {
                    return Err(map_oauth_error(&oauth, status));
                }
                if message.contains(AUTHORIZATION_PENDING) {
                    return Err(Error::AuthorizationPending);
                }
                Err(Error::Api { status, message })
            }
            Err(other) => Err(other),
        }
    }
}

fn map_oauth_error(body: &OauthErrorBody, status: u16) -> Error {
    if body.error == AUTHORIZATION_PENDING {
        Error::AuthorizationPending
    } else {
        Error::Api {
            status,
            message: body
                .error_description
                .clone()
                .unwrap_or_else(|| body.error.clone()),
        }
    }
}
