//! Resource dispatch: one facade over the per-kind API endpoints.
//!
//! `ResourceService` resolves the kind from the ID prefix, fans list
//! calls out concurrently, and rejects unsupported operations before
//! any network traffic happens.

use std::sync::Arc;

use nimbus_api::{ListKeyValueParams, ListPostgresParams, ListServicesParams, NimbusClient};
use tracing::debug;

use crate::error::CoreError;
use crate::model::{Resource, ResourceKind};

/// Filters applied to every per-kind list call.
#[derive(Debug, Clone, Default)]
pub struct ResourceQuery {
    pub environment_ids: Vec<String>,
    pub include_previews: bool,
}

impl ResourceQuery {
    fn service_params(&self) -> ListServicesParams {
        ListServicesParams {
            environment_ids: self.environment_ids.clone(),
            include_previews: self.include_previews,
        }
    }

    fn postgres_params(&self) -> ListPostgresParams {
        ListPostgresParams {
            environment_ids: self.environment_ids.clone(),
        }
    }

    fn key_value_params(&self) -> ListKeyValueParams {
        ListKeyValueParams {
            environment_ids: self.environment_ids.clone(),
        }
    }
}

/// Uniform resource operations across kinds.
#[derive(Clone)]
pub struct ResourceService {
    client: Arc<NimbusClient>,
}

impl ResourceService {
    pub fn new(client: Arc<NimbusClient>) -> Self {
        Self { client }
    }

    /// List every resource the query matches, across all kinds.
    ///
    /// The three kind lists are fetched concurrently; the first failure
    /// aborts the whole call and drops the sibling fetches. The merged
    /// result is sorted by name (case-insensitive) then ID, so the same
    /// platform state always renders in the same order.
    pub async fn list_all(&self, query: &ResourceQuery) -> Result<Vec<Resource>, CoreError> {
        let (services, databases, stores) = tokio::try_join!(
            async {
                self.client
                    .list_services(&query.service_params())
                    .await
                    .map_err(CoreError::from)
            },
            async {
                self.client
                    .list_postgres(&query.postgres_params())
                    .await
                    .map_err(CoreError::from)
            },
            async {
                self.client
                    .list_key_value(&query.key_value_params())
                    .await
                    .map_err(CoreError::from)
            },
        )?;

        let mut resources: Vec<Resource> = services
            .into_iter()
            .map(Resource::from)
            .chain(databases.into_iter().map(Resource::from))
            .chain(stores.into_iter().map(Resource::from))
            .collect();
        resources.sort_by_key(Resource::sort_key);

        debug!(count = resources.len(), "listed resources");
        Ok(resources)
    }

    /// Fetch a single resource by ID.
    pub async fn get(&self, id: &str) -> Result<Resource, CoreError> {
        match ResourceKind::from_id(id)? {
            ResourceKind::Service => Ok(self.client.get_service(id).await?.into()),
            ResourceKind::Postgres => Ok(self.client.get_postgres(id).await?.into()),
            ResourceKind::KeyValue => Ok(self.client.get_key_value(id).await?.into()),
            kind @ ResourceKind::CronJob => Err(CoreError::UnsupportedOperation {
                kind,
                operation: "fetch",
            }),
        }
    }

    /// Restart a resource by ID.
    ///
    /// Kinds that cannot restart are rejected here, before any request
    /// is made.
    pub async fn restart(&self, id: &str) -> Result<(), CoreError> {
        match ResourceKind::from_id(id)? {
            ResourceKind::Service => Ok(self.client.restart_service(id).await?),
            ResourceKind::Postgres => Ok(self.client.restart_postgres(id).await?),
            kind @ (ResourceKind::KeyValue | ResourceKind::CronJob) => {
                Err(CoreError::UnsupportedOperation {
                    kind,
                    operation: "restart",
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, ResourceService) {
        let server = MockServer::start().await;
        let base_url = Url::parse(&server.uri()).unwrap();
        let client = NimbusClient::with_client(
            reqwest::Client::new(),
            base_url,
            Some("test-key".to_string().into()),
        );
        (server, ResourceService::new(Arc::new(client)))
    }

    /// A service pointed at a port nothing listens on; any request that
    /// actually goes out fails with a transport error, so tests can
    /// prove an operation was rejected before the network.
    fn unroutable() -> ResourceService {
        let base_url = Url::parse("http://127.0.0.1:9").unwrap();
        let client = NimbusClient::with_client(reqwest::Client::new(), base_url, None);
        ResourceService::new(Arc::new(client))
    }

    #[tokio::test]
    async fn list_all_merges_and_sorts() {
        let (server, service) = setup().await;

        Mock::given(method("GET"))
            .and(path("/v1/services"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "srv-2", "name": "Zeta" },
                { "id": "srv-1", "name": "alpha" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/postgres"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "dpg-1", "name": "main-db" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/key-value"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "red-1", "name": "alpha" }
            ])))
            .mount(&server)
            .await;

        let resources = service.list_all(&ResourceQuery::default()).await.unwrap();
        let ids: Vec<&str> = resources.iter().map(|r| r.id.as_str()).collect();
        // Case-insensitive by name, ID as tiebreaker for the two "alpha"s.
        assert_eq!(ids, vec!["red-1", "srv-1", "dpg-1", "srv-2"]);
    }

    #[tokio::test]
    async fn list_all_fails_fast_on_any_kind() {
        let (server, service) = setup().await;

        Mock::given(method("GET"))
            .and(path("/v1/services"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/postgres"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "message": "storage down" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/key-value"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = service
            .list_all(&ResourceQuery::default())
            .await
            .unwrap_err();
        match err {
            CoreError::Api { status, message } => {
                assert_eq!(status, Some(500));
                assert!(message.contains("storage down"), "got: {message}");
            }
            other => panic!("expected Api error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn restart_dispatches_by_prefix() {
        let (server, service) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v1/services/srv-1/restart"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/postgres/dpg-1/restart"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        service.restart("srv-1").await.unwrap();
        service.restart("dpg-1").await.unwrap();
    }

    #[tokio::test]
    async fn restart_cron_job_is_rejected_before_the_network() {
        let err = unroutable().restart("crn-abc").await.unwrap_err();
        match err {
            CoreError::UnsupportedOperation { kind, operation } => {
                assert_eq!(kind, ResourceKind::CronJob);
                assert_eq!(operation, "restart");
            }
            other => panic!("expected UnsupportedOperation, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn restart_key_value_is_rejected_before_the_network() {
        let err = unroutable().restart("red-abc").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnsupportedOperation {
                kind: ResourceKind::KeyValue,
                operation: "restart",
            }
        ));
    }

    #[tokio::test]
    async fn unknown_prefix_is_rejected_before_the_network() {
        let err = unroutable().get("bogus-id").await.unwrap_err();
        assert!(matches!(err, CoreError::UnknownResourceKind { .. }));
    }
}
