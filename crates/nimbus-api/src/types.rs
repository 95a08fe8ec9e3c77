//! Typed payloads returned by the Nimbus REST API.
//!
//! These mirror the wire format exactly (camelCase fields); domain
//! shaping happens in nimbus-core. Treated as generated types -- keep
//! them free of behavior beyond serde.

use serde::{Deserialize, Serialize};

/// A named reference embedded in resource payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: String,
    pub name: String,
}

/// A deployed service (web service, private service, background worker).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePayload {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub environment: Option<NamedRef>,
    #[serde(default)]
    pub project: Option<NamedRef>,
    #[serde(default)]
    pub suspended: Option<String>,
    #[serde(rename = "type", default)]
    pub service_type: Option<String>,
}

/// A managed Postgres database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostgresPayload {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub environment: Option<NamedRef>,
    #[serde(default)]
    pub project: Option<NamedRef>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// A managed key value store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValuePayload {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub environment: Option<NamedRef>,
    #[serde(default)]
    pub project: Option<NamedRef>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A one-off job run against a service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPayload {
    pub id: String,
    pub service_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start_command: Option<String>,
}

/// A workspace (billing owner) the operator can act on behalf of.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerPayload {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

// ── List query parameters ───────────────────────────────────────────

/// Filter parameters for `GET /v1/services`.
#[derive(Debug, Clone, Default)]
pub struct ListServicesParams {
    pub environment_ids: Vec<String>,
    pub include_previews: bool,
}

/// Filter parameters for `GET /v1/postgres`.
#[derive(Debug, Clone, Default)]
pub struct ListPostgresParams {
    pub environment_ids: Vec<String>,
}

/// Filter parameters for `GET /v1/key-value`.
#[derive(Debug, Clone, Default)]
pub struct ListKeyValueParams {
    pub environment_ids: Vec<String>,
}
