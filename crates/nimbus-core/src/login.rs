//! Device authorization login flow.
//!
//! The poller is generic over the poll closure so the timing policy
//! (deadline from `expires_in`, cadence from `interval`) can be tested
//! with paused time and no real token endpoint.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use nimbus_api::{DeviceGrant, DeviceToken};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::error::CoreError;

/// API credentials as persisted to the config file after login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub key: String,
    /// Unix timestamp after which `key` is no longer valid.
    pub expires_at: i64,
    pub refresh_token: String,
}

/// Build the credentials to persist from a freshly issued token.
pub fn api_config_for_token(host: &str, token: &DeviceToken, now: DateTime<Utc>) -> ApiConfig {
    let lifetime = ChronoDuration::seconds(i64::try_from(token.expires_in).unwrap_or(i64::MAX));
    ApiConfig {
        host: host.to_owned(),
        key: token.access_token.clone(),
        expires_at: (now + lifetime).timestamp(),
        refresh_token: token.refresh_token.clone(),
    }
}

/// Poll until the operator approves the grant, it expires, or the
/// token endpoint fails hard.
///
/// One poll per `grant.interval` seconds, starting one interval after
/// the call. "Authorization pending" responses keep the loop going;
/// any other error ends it. Expiry is checked after each pending poll,
/// so a grant with `expires_in` of N seconds gets every poll up to and
/// including the one at the N second mark.
pub async fn poll_for_token<F, Fut>(grant: &DeviceGrant, mut poll: F) -> Result<DeviceToken, CoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<DeviceToken, nimbus_api::Error>>,
{
    let deadline = Instant::now() + Duration::from_secs(grant.expires_in);
    let period = Duration::from_secs(grant.interval.max(1));
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match poll().await {
            Ok(token) => return Ok(token),
            Err(err) if err.is_authorization_pending() => {
                debug!("authorization pending, will poll again");
            }
            Err(err) => {
                return Err(CoreError::AuthorizationFailed {
                    message: err.to_string(),
                });
            }
        }
        if Instant::now() >= deadline {
            return Err(CoreError::AuthorizationExpired);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn grant(expires_in: u64, interval: u64) -> DeviceGrant {
        DeviceGrant {
            device_code: "dev-code".into(),
            user_code: "WDJB-MJHT".into(),
            verification_uri: "https://dashboard.nimbus.dev/device".into(),
            verification_uri_complete: "https://dashboard.nimbus.dev/device?code=WDJB-MJHT".into(),
            expires_in,
            interval,
        }
    }

    fn token() -> DeviceToken {
        DeviceToken {
            access_token: "tok-abc".into(),
            refresh_token: "ref-xyz".into(),
            expires_in: 3600,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_once_the_operator_approves() {
        let attempts = Cell::new(0u32);
        let start = Instant::now();

        let result = poll_for_token(&grant(5, 1), || {
            attempts.set(attempts.get() + 1);
            let n = attempts.get();
            async move {
                if n < 5 {
                    Err(nimbus_api::Error::AuthorizationPending)
                } else {
                    Ok(token())
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result.access_token, "tok-abc");
        assert_eq!(attempts.get(), 5);
        // Polls ran at 1s..5s; the approving poll lands at the 5s mark.
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn expires_when_the_operator_never_approves() {
        let attempts = Cell::new(0u32);
        let start = Instant::now();

        let err = poll_for_token(&grant(5, 1), || {
            attempts.set(attempts.get() + 1);
            async { Err(nimbus_api::Error::AuthorizationPending) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, CoreError::AuthorizationExpired));
        // The final poll at the 5s deadline still ran before expiring.
        assert_eq!(attempts.get(), 5);
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn hard_failure_stops_the_loop() {
        let attempts = Cell::new(0u32);

        let err = poll_for_token(&grant(300, 5), || {
            attempts.set(attempts.get() + 1);
            let n = attempts.get();
            async move {
                if n == 1 {
                    Err(nimbus_api::Error::AuthorizationPending)
                } else {
                    Err(nimbus_api::Error::Api {
                        status: 400,
                        message: "access denied".into(),
                    })
                }
            }
        })
        .await
        .unwrap_err();

        match err {
            CoreError::AuthorizationFailed { message } => {
                assert!(message.contains("access denied"), "got: {message}");
            }
            other => panic!("expected AuthorizationFailed, got: {other:?}"),
        }
        assert_eq!(attempts.get(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_a_full_interval_before_the_first_poll() {
        let start = Instant::now();
        poll_for_token(&grant(60, 5), || async { Ok(token()) })
            .await
            .unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[test]
    fn api_config_carries_token_lifetime() {
        let now = DateTime::parse_from_rfc3339("2025-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let config = api_config_for_token("https://api.nimbus.dev", &token(), now);
        assert_eq!(config.host, "https://api.nimbus.dev");
        assert_eq!(config.key, "tok-abc");
        assert_eq!(config.expires_at, now.timestamp() + 3600);
        assert_eq!(config.refresh_token, "ref-xyz");
    }
}
