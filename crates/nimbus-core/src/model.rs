// ── Domain model ──
//
// Canonical resource types shaped from nimbus-api payloads. The kind of
// a resource is carried entirely by its ID prefix, so resolution never
// needs a network round trip.

use std::fmt;

use serde::Serialize;
use strum::EnumIter;

use crate::error::CoreError;

// ── ResourceKind ────────────────────────────────────────────────────

/// Every resource kind the platform exposes, keyed by ID prefix.
///
/// `CronJob` is resolvable (so the dispatcher can name it in errors)
/// but currently supports no operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Service,
    Postgres,
    KeyValue,
    CronJob,
}

impl ResourceKind {
    /// The ID prefix for this kind, including the trailing dash.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Service => "srv-",
            Self::Postgres => "dpg-",
            Self::KeyValue => "red-",
            Self::CronJob => "crn-",
        }
    }

    /// Resolve a kind from a resource ID by prefix.
    ///
    /// Prefixes are disjoint; the first match wins. IDs with no known
    /// prefix are rejected without touching the network.
    pub fn from_id(id: &str) -> Result<Self, CoreError> {
        use strum::IntoEnumIterator;
        ResourceKind::iter()
            .find(|kind| id.starts_with(kind.prefix()))
            .ok_or_else(|| CoreError::UnknownResourceKind { id: id.to_owned() })
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Service => "service",
            Self::Postgres => "postgres",
            Self::KeyValue => "key value",
            Self::CronJob => "cron job",
        };
        write!(f, "{name}")
    }
}

// ── Resource ────────────────────────────────────────────────────────

/// Kind-specific fields, tagged for structured output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ResourceDetail {
    Service {
        #[serde(skip_serializing_if = "Option::is_none")]
        service_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        suspended: Option<String>,
    },
    Postgres {
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },
    KeyValue {
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<String>,
    },
}

/// A platform resource, uniform across kinds.
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(flatten)]
    pub detail: ResourceDetail,
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self.detail {
            ResourceDetail::Service { .. } => ResourceKind::Service,
            ResourceDetail::Postgres { .. } => ResourceKind::Postgres,
            ResourceDetail::KeyValue { .. } => ResourceKind::KeyValue,
        }
    }

    /// Short status string for table output, where the kind has one.
    pub fn status(&self) -> Option<&str> {
        match &self.detail {
            ResourceDetail::Service { suspended, .. } => suspended.as_deref(),
            ResourceDetail::Postgres { status, .. } | ResourceDetail::KeyValue { status } => {
                status.as_deref()
            }
        }
    }

    /// Header line for screens scoped to this resource:
    /// `name (project - environment)`, or just `name` when the scoping
    /// references are absent.
    pub fn breadcrumb(&self) -> String {
        match (&self.project_name, &self.environment_name) {
            (Some(project), Some(environment)) => {
                format!("{} ({project} - {environment})", self.name)
            }
            _ => self.name.clone(),
        }
    }

    /// Stable ordering key: case-insensitive name, ID as tiebreaker.
    pub fn sort_key(&self) -> (String, String) {
        (self.name.to_lowercase(), self.id.clone())
    }
}

fn ref_name(named: Option<nimbus_api::NamedRef>) -> Option<String> {
    named.map(|n| n.name)
}

impl From<nimbus_api::ServicePayload> for Resource {
    fn from(payload: nimbus_api::ServicePayload) -> Self {
        Self {
            id: payload.id,
            name: payload.name,
            environment_name: ref_name(payload.environment),
            project_name: ref_name(payload.project),
            detail: ResourceDetail::Service {
                service_type: payload.service_type,
                suspended: payload.suspended,
            },
        }
    }
}

impl From<nimbus_api::PostgresPayload> for Resource {
    fn from(payload: nimbus_api::PostgresPayload) -> Self {
        Self {
            id: payload.id,
            name: payload.name,
            environment_name: ref_name(payload.environment),
            project_name: ref_name(payload.project),
            detail: ResourceDetail::Postgres {
                status: payload.status,
                version: payload.version,
            },
        }
    }
}

impl From<nimbus_api::KeyValuePayload> for Resource {
    fn from(payload: nimbus_api::KeyValuePayload) -> Self {
        Self {
            id: payload.id,
            name: payload.name,
            environment_name: ref_name(payload.environment),
            project_name: ref_name(payload.project),
            detail: ResourceDetail::KeyValue {
                status: payload.status,
            },
        }
    }
}

// ── Workspace ───────────────────────────────────────────────────────

/// The workspace (owner) all commands are scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
}

impl From<nimbus_api::OwnerPayload> for Workspace {
    fn from(payload: nimbus_api::OwnerPayload) -> Self {
        Self {
            id: payload.id,
            name: payload.name,
        }
    }
}
