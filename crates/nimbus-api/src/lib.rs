// nimbus-api: async client for the Nimbus cloud platform REST API.
//
// This crate is the API client boundary: typed payloads in, [`Error`]
// out. Domain logic (kind dispatch, polling policy, sessions) lives in
// nimbus-core.

mod client;
pub mod error;
pub mod logs;
pub mod oauth;
mod transport;
pub mod types;

pub use error::Error;
pub use logs::{ListLogsParams, LogDirection, LogEntry, LogLabel, LogPage};
pub use oauth::{DeviceGrant, DeviceToken};
pub use transport::NimbusClient;
pub use types::{
    JobPayload, KeyValuePayload, ListKeyValueParams, ListPostgresParams, ListServicesParams,
    NamedRef, OwnerPayload, PostgresPayload, ServicePayload,
};
