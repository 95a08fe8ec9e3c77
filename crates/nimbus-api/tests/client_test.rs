#![allow(clippy::unwrap_used)]
// Integration tests for `NimbusClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nimbus_api::{Error, ListServicesParams, NimbusClient};

async fn setup() -> (MockServer, NimbusClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = NimbusClient::with_client(
        reqwest::Client::new(),
        base_url,
        Some("test-key".to_string().into()),
    );
    (server, client)
}

// ── Services ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_services() {
    let (server, client) = setup().await;

    let body = json!([{
        "id": "srv-abc123",
        "name": "web",
        "environment": { "id": "evm-1", "name": "production" },
        "project": { "id": "prj-1", "name": "storefront" },
        "type": "web_service"
    }]);

    Mock::given(method("GET"))
        .and(path("/v1/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let services = client
        .list_services(&ListServicesParams::default())
        .await
        .unwrap();

    assert_eq!(services.len(), 1);
    assert_eq!(services[0].id, "srv-abc123");
    assert_eq!(
        services[0].environment.as_ref().unwrap().name,
        "production"
    );
    assert_eq!(services[0].project.as_ref().unwrap().name, "storefront");
}

#[tokio::test]
async fn test_list_services_params() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/services"))
        .and(query_param("environmentId", "evm-9"))
        .and(query_param("includePreviews", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let services = client
        .list_services(&ListServicesParams {
            environment_ids: vec!["evm-9".into()],
            include_previews: true,
        })
        .await
        .unwrap();

    assert!(services.is_empty());
}

#[tokio::test]
async fn test_restart_service() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/services/srv-abc123/restart"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    client.restart_service("srv-abc123").await.unwrap();
}

// ── Jobs ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_cancel_job() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/services/srv-1/jobs/job-2/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "job-2",
            "serviceId": "srv-1",
            "status": "canceled"
        })))
        .mount(&server)
        .await;

    let job = client.cancel_job("srv-1", "job-2").await.unwrap();
    assert_eq!(job.status.as_deref(), Some("canceled"));
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/services"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "invalid API key" })),
        )
        .mount(&server)
        .await;

    let result = client.list_services(&ListServicesParams::default()).await;
    match result {
        Err(Error::Unauthorized { ref message }) => {
            assert!(message.contains("invalid API key"), "got: {message}");
        }
        other => panic!("expected Unauthorized, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_body_preview_respects_utf8_boundaries() {
    let (server, client) = setup().await;

    // Non-JSON error page whose 200th byte falls inside a multi-byte
    // character. The preview must truncate cleanly, not panic.
    let body = format!("{}€ server fell over", "a".repeat(199));
    Mock::given(method("GET"))
        .and(path("/v1/services"))
        .respond_with(ResponseTemplate::new(500).set_body_string(body))
        .mount(&server)
        .await;

    let result = client.list_services(&ListServicesParams::default()).await;
    match result {
        Err(Error::Api {
            status,
            ref message,
        }) => {
            assert_eq!(status, 500);
            assert_eq!(message, &"a".repeat(199));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_api_error_passthrough() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/postgres/dpg-missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "postgres not found" })),
        )
        .mount(&server)
        .await;

    let result = client.get_postgres("dpg-missing").await;
    match result {
        Err(Error::Api {
            status,
            ref message,
        }) => {
            assert_eq!(status, 404);
            assert!(message.contains("not found"), "got: {message}");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}
