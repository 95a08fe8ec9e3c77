//! The screens.

mod action;
mod login;
mod logs;
mod resources;
mod workspace;

pub use action::ConfirmScreen;
pub use login::LoginScreen;
pub use logs::LogsScreen;
pub use resources::ResourceListScreen;
pub use workspace::WorkspaceScreen;

use std::sync::Arc;

use chrono::Utc;
use nimbus_api::NimbusClient;
use nimbus_core::CoreError;
use url::Url;

/// Build an authenticated client from the current config.
///
/// Re-reads the config file on every call so screens created before a
/// login (gate chains) pick up the fresh key once they activate.
pub(crate) fn connect() -> Result<Arc<NimbusClient>, CoreError> {
    let config = nimbus_config::load_or_default();
    let key = nimbus_config::resolve_api_key(&config, Utc::now())?;
    let host = nimbus_config::resolve_host(&config);
    let url = parse_host(&host)?;
    Ok(Arc::new(NimbusClient::new(url, Some(key))?))
}

/// Build an unauthenticated client; the device flow needs no key.
pub(crate) fn connect_anonymous() -> Result<Arc<NimbusClient>, CoreError> {
    let config = nimbus_config::load_or_default();
    let host = nimbus_config::resolve_host(&config);
    let url = parse_host(&host)?;
    Ok(Arc::new(NimbusClient::new(url, None)?))
}

/// The selected workspace ID, required for log queries.
pub(crate) fn workspace_id() -> Result<String, CoreError> {
    let config = nimbus_config::load_or_default();
    Ok(config.workspace()?.id.clone())
}

fn parse_host(host: &str) -> Result<Url, CoreError> {
    Url::parse(host).map_err(|e| CoreError::config(format!("invalid API host '{host}': {e}")))
}
