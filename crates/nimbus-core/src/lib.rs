//! Domain layer between `nimbus-api` and the UI consumers (CLI / TUI).
//!
//! This crate owns the business logic shared by both command modes:
//!
//! - **[`ResourceService`]** — Uniform resource operations. Resolves a
//!   kind from the ID prefix, fans list calls out across kinds, and
//!   rejects unsupported operations before any network traffic.
//!
//! - **[`poll_for_token`]** — Device authorization poller. Turns a
//!   [`DeviceGrant`](nimbus_api::DeviceGrant) plus a poll closure into
//!   a token, honoring the grant's interval and expiry.
//!
//! - **Domain model** ([`model`]) — Canonical [`Resource`] /
//!   [`ResourceKind`] / [`Workspace`] types shaped from API payloads.

pub mod error;
pub mod login;
pub mod model;
pub mod resource;

pub use error::CoreError;
pub use login::{ApiConfig, api_config_for_token, poll_for_token};
pub use model::{Resource, ResourceDetail, ResourceKind, Workspace};
pub use resource::{ResourceQuery, ResourceService};
