#![allow(clippy::unwrap_used)]
// Device-flow and log-streaming tests against wiremock.

use serde_json::json;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nimbus_api::{Error, ListLogsParams, NimbusClient};

async fn setup() -> (MockServer, NimbusClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = NimbusClient::with_client(reqwest::Client::new(), base_url, None);
    (server, client)
}

fn grant_body() -> serde_json::Value {
    json!({
        "deviceCode": "dev-code-1",
        "userCode": "WDJB-MJHT",
        "verificationUri": "https://dashboard.nimbus.dev/device",
        "verificationUriComplete": "https://dashboard.nimbus.dev/device?code=WDJB-MJHT",
        "expiresIn": 300,
        "interval": 5
    })
}

// ── Device flow ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_device_grant() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth/device/grants"))
        .respond_with(ResponseTemplate::new(201).set_body_json(grant_body()))
        .mount(&server)
        .await;

    let grant = client.create_device_grant().await.unwrap();
    assert_eq!(grant.user_code, "WDJB-MJHT");
    assert_eq!(grant.expires_in, 300);
    assert_eq!(grant.interval, 5);
}

#[tokio::test]
async fn test_device_token_pending() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth/device/grants"))
        .respond_with(ResponseTemplate::new(201).set_body_json(grant_body()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth/device/token"))
        .and(body_json(json!({ "deviceCode": "dev-code-1" })))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "authorization_pending" })),
        )
        .mount(&server)
        .await;

    let grant = client.create_device_grant().await.unwrap();
    let result = client.device_token(&grant).await;

    assert!(
        matches!(result, Err(Error::AuthorizationPending)),
        "expected AuthorizationPending, got: {result:?}"
    );
}

#[tokio::test]
async fn test_device_token_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth/device/grants"))
        .respond_with(ResponseTemplate::new(201).set_body_json(grant_body()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth/device/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "tok-abc",
            "refreshToken": "ref-xyz",
            "expiresIn": 3600
        })))
        .mount(&server)
        .await;

    let grant = client.create_device_grant().await.unwrap();
    let token = client.device_token(&grant).await.unwrap();
    assert_eq!(token.access_token, "tok-abc");
    assert_eq!(token.refresh_token, "ref-xyz");
}

#[tokio::test]
async fn test_device_token_denied_is_not_pending() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth/device/grants"))
        .respond_with(ResponseTemplate::new(201).set_body_json(grant_body()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth/device/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "access_denied",
            "error_description": "the operator declined the request"
        })))
        .mount(&server)
        .await;

    let grant = client.create_device_grant().await.unwrap();
    let result = client.device_token(&grant).await;

    match result {
        Err(Error::Api { ref message, .. }) => {
            assert!(message.contains("declined"), "got: {message}");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── Log tailing ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_tail_logs_streams_ndjson() {
    let (server, client) = setup().await;

    let line1 = json!({
        "id": "log-1",
        "timestamp": "2025-05-01T12:00:00Z",
        "message": "listening on :8080"
    });
    let line2 = json!({
        "id": "log-2",
        "timestamp": "2025-05-01T12:00:01Z",
        "message": "GET / 200",
        "level": "info"
    });
    let body = format!("{line1}\n{line2}\n");

    Mock::given(method("GET"))
        .and(path("/v1/logs/subscribe"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;

    let params = ListLogsParams {
        owner_id: "own-1".into(),
        resource_ids: vec!["srv-abc".into()],
        limit: 100,
        ..Default::default()
    };
    let cancel = CancellationToken::new();
    let mut rx = client.tail_logs(&params, cancel).await.unwrap();

    let first = rx.recv().await.unwrap();
    assert_eq!(first.message, "listening on :8080");
    let second = rx.recv().await.unwrap();
    assert_eq!(second.level.as_deref(), Some("info"));

    // Server closed the stream: channel ends.
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_tail_logs_subscribe_failure_is_synchronous() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/logs/subscribe"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "unknown resource" })),
        )
        .mount(&server)
        .await;

    let params = ListLogsParams {
        owner_id: "own-1".into(),
        limit: 100,
        ..Default::default()
    };
    let result = client.tail_logs(&params, CancellationToken::new()).await;

    assert!(
        matches!(result, Err(Error::Api { status: 400, .. })),
        "expected synchronous Api error, got: {result:?}"
    );
}
