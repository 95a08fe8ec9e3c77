//! Resource and workspace endpoints.

use url::Url;

use crate::error::Error;
use crate::transport::NimbusClient;
use crate::types::{
    JobPayload, KeyValuePayload, ListKeyValueParams, ListPostgresParams, ListServicesParams,
    OwnerPayload, PostgresPayload, ServicePayload,
};

fn push_env_ids(url: &mut Url, environment_ids: &[String]) {
    let mut pairs = url.query_pairs_mut();
    for id in environment_ids {
        pairs.append_pair("environmentId", id);
    }
}

impl NimbusClient {
    // ── Services ─────────────────────────────────────────────────────

    pub async fn list_services(
        &self,
        params: &ListServicesParams,
    ) -> Result<Vec<ServicePayload>, Error> {
        let mut url = self.api_url("v1/services")?;
        push_env_ids(&mut url, &params.environment_ids);
        if params.include_previews {
            url.query_pairs_mut().append_pair("includePreviews", "true");
        }
        self.get(url).await
    }

    pub async fn get_service(&self, id: &str) -> Result<ServicePayload, Error> {
        let url = self.api_url(&format!("v1/services/{id}"))?;
        self.get(url).await
    }

    pub async fn restart_service(&self, id: &str) -> Result<(), Error> {
        let url = self.api_url(&format!("v1/services/{id}/restart"))?;
        self.post_empty(url, &serde_json::json!({})).await
    }

    // ── Postgres ─────────────────────────────────────────────────────

    pub async fn list_postgres(
        &self,
        params: &ListPostgresParams,
    ) -> Result<Vec<PostgresPayload>, Error> {
        let mut url = self.api_url("v1/postgres")?;
        push_env_ids(&mut url, &params.environment_ids);
        self.get(url).await
    }

    pub async fn get_postgres(&self, id: &str) -> Result<PostgresPayload, Error> {
        let url = self.api_url(&format!("v1/postgres/{id}"))?;
        self.get(url).await
    }

    pub async fn restart_postgres(&self, id: &str) -> Result<(), Error> {
        let url = self.api_url(&format!("v1/postgres/{id}/restart"))?;
        self.post_empty(url, &serde_json::json!({})).await
    }

    // ── Key value ────────────────────────────────────────────────────

    pub async fn list_key_value(
        &self,
        params: &ListKeyValueParams,
    ) -> Result<Vec<KeyValuePayload>, Error> {
        let mut url = self.api_url("v1/key-value")?;
        push_env_ids(&mut url, &params.environment_ids);
        self.get(url).await
    }

    pub async fn get_key_value(&self, id: &str) -> Result<KeyValuePayload, Error> {
        let url = self.api_url(&format!("v1/key-value/{id}"))?;
        self.get(url).await
    }

    // ── Jobs ─────────────────────────────────────────────────────────

    pub async fn cancel_job(&self, service_id: &str, job_id: &str) -> Result<JobPayload, Error> {
        let url = self.api_url(&format!("v1/services/{service_id}/jobs/{job_id}/cancel"))?;
        self.post(url, &serde_json::json!({})).await
    }

    // ── Workspaces (owners) ──────────────────────────────────────────

    pub async fn list_owners(&self) -> Result<Vec<OwnerPayload>, Error> {
        let url = self.api_url("v1/owners")?;
        self.get(url).await
    }

    /// Fetch a single owner. Also serves as the cheap "is this key
    /// still valid for this workspace" check at session start.
    pub async fn retrieve_owner(&self, id: &str) -> Result<OwnerPayload, Error> {
        let url = self.api_url(&format!("v1/owners/{id}"))?;
        self.get(url).await
    }
}
