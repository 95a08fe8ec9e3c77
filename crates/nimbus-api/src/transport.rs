// HTTP transport for the Nimbus REST API.
//
// Wraps `reqwest::Client` with base-URL construction, bearer auth, and
// response decoding. Endpoint modules (client, oauth, logs) are inherent
// methods in separate files to keep this module focused on mechanics.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Error body shape returned by the Nimbus API on non-2xx responses.
#[derive(serde::Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Raw HTTP client for the Nimbus API.
///
/// All endpoint methods return decoded payloads; HTTP status handling
/// and error-body parsing happen here so callers only see [`Error`].
pub struct NimbusClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<SecretString>,
}

impl NimbusClient {
    /// Create a client for `base_url`, optionally authenticated.
    ///
    /// The device-flow endpoints work without a key; everything else
    /// requires one.
    pub fn new(base_url: Url, api_key: Option<SecretString>) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("nimbus-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Create a client with a pre-built `reqwest::Client` (tests).
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        api_key: Option<SecretString>,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    /// The configured API host.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a full URL for an API path like `v1/services`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Apply bearer auth to a request builder, if a key is configured.
    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            None => builder,
        }
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET a URL and decode the JSON response.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.apply_auth(self.http.get(url)).send().await?;
        Self::decode(resp).await
    }

    /// GET a URL, returning the raw response for streaming consumers.
    pub(crate) async fn get_raw(&self, url: Url) -> Result<reqwest::Response, Error> {
        debug!("GET {} (stream)", url);
        let resp = self.apply_auth(self.http.get(url)).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            Err(Self::status_error(status, resp).await)
        }
    }

    /// POST a JSON body and decode the JSON response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);
        let resp = self
            .apply_auth(self.http.post(url).json(body))
            .send()
            .await?;
        Self::decode(resp).await
    }

    /// POST with no response body expected (e.g. restart).
    pub(crate) async fn post_empty(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        debug!("POST {}", url);
        let resp = self
            .apply_auth(self.http.post(url).json(body))
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::status_error(status, resp).await)
        }
    }

    /// Decode a 2xx JSON response, or map the failure status.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::status_error(status, resp).await);
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview = preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
            }
        })
    }

    /// Map a non-success status plus its body into an [`Error`].
    pub(crate) async fn status_error(
        status: reqwest::StatusCode,
        resp: reqwest::Response,
    ) -> Error {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| preview(&body).to_owned());

        if status == reqwest::StatusCode::UNAUTHORIZED {
            Error::Unauthorized { message }
        } else {
            Error::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

/// Leading slice of a body for error messages. Non-JSON error pages
/// can be arbitrary UTF-8, so the cut lands on a char boundary.
fn preview(body: &str) -> &str {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::preview;

    #[test]
    fn preview_cuts_inside_multibyte_chars_on_a_boundary() {
        let body = format!("{}€ and more", "a".repeat(199));
        // Byte 200 falls inside the euro sign; the cut backs up to 199.
        assert_eq!(preview(&body), "a".repeat(199));
    }

    #[test]
    fn preview_returns_short_bodies_whole() {
        assert_eq!(preview("short"), "short");
        let exactly = "b".repeat(200);
        assert_eq!(preview(&exactly), exactly);
    }
}
