//! Shared configuration for the Nimbus CLI and TUI.
//!
//! One TOML file holds the persisted login credentials
//! ([`nimbus_core::ApiConfig`]) and the selected workspace. Both
//! command modes read through this crate; the interactive gates check
//! [`resolve_api_key`] / [`Config::workspace`] before any screen runs.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use nimbus_core::ApiConfig;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default API host, used until a login or env override says otherwise.
pub const DEFAULT_HOST: &str = "https://api.nimbus.dev";

/// Env var that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "NIMBUS_CONFIG_PATH";

/// Env var that overrides the persisted API key.
pub const API_KEY_ENV: &str = "NIMBUS_API_KEY";

/// Env var that overrides the persisted API host.
pub const HOST_ENV: &str = "NIMBUS_HOST";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("not logged in; run 'nimbus login' first")]
    NotLoggedIn,

    #[error("your session has expired; run 'nimbus login' again")]
    SessionExpired,

    #[error("no workspace selected; run 'nimbus workspace set' first")]
    NoWorkspace,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<ConfigError> for nimbus_core::CoreError {
    fn from(err: ConfigError) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Workspace selection persisted alongside the credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRef {
    pub id: String,
    pub name: String,
}

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Credentials from the last successful login.
    pub api: Option<ApiConfig>,

    /// The workspace all commands are scoped to.
    pub workspace: Option<WorkspaceRef>,
}

impl Config {
    pub fn set_api(&mut self, api: ApiConfig) {
        self.api = Some(api);
    }

    pub fn set_workspace(&mut self, id: String, name: String) {
        self.workspace = Some(WorkspaceRef { id, name });
    }

    /// The selected workspace, or the error the gates surface.
    pub fn workspace(&self) -> Result<&WorkspaceRef, ConfigError> {
        self.workspace.as_ref().ok_or(ConfigError::NoWorkspace)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path.
///
/// `NIMBUS_CONFIG_PATH` wins when set; otherwise XDG / platform
/// conventions via `directories`.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("dev", "nimbus", "nimbus").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("nimbus");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the config from the canonical path, defaulting missing fields.
pub fn load() -> Result<Config, ConfigError> {
    load_from(&config_path())
}

/// Load config, returning a default if loading fails.
pub fn load_or_default() -> Config {
    load().unwrap_or_default()
}

pub fn load_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path));
    let config: Config = figment.extract()?;
    Ok(config)
}

/// Serialize config to TOML and write it to the canonical path.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    save_to(&config_path(), config)
}

pub fn save_to(path: &std::path::Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(config)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// The API host: env override, then the persisted login, then default.
pub fn resolve_host(config: &Config) -> String {
    if let Ok(host) = std::env::var(HOST_ENV) {
        return host;
    }
    config
        .api
        .as_ref()
        .map_or_else(|| DEFAULT_HOST.to_owned(), |api| api.host.clone())
}

/// The API key: env override, then the persisted login.
///
/// A persisted key past its expiry is rejected so the caller can send
/// the operator back through login instead of collecting 401s.
pub fn resolve_api_key(config: &Config, now: DateTime<Utc>) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(config, std::env::var(API_KEY_ENV).ok(), now)
}

fn resolve_api_key_with(
    config: &Config,
    env_key: Option<String>,
    now: DateTime<Utc>,
) -> Result<SecretString, ConfigError> {
    if let Some(key) = env_key {
        return Ok(SecretString::from(key));
    }
    let api = config.api.as_ref().ok_or(ConfigError::NotLoggedIn)?;
    if api.expires_at <= now.timestamp() {
        return Err(ConfigError::SessionExpired);
    }
    Ok(SecretString::from(api.key.clone()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn logged_in(expires_at: i64) -> Config {
        Config {
            api: Some(ApiConfig {
                host: "https://api.nimbus.dev".into(),
                key: "tok-abc".into(),
                expires_at,
                refresh_token: "ref-xyz".into(),
            }),
            workspace: None,
        }
    }

    #[test]
    fn round_trips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = logged_in(4_000_000_000);
        config.set_workspace("own-1".into(), "acme".into());
        save_to(&path, &config).unwrap();

        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded.api.unwrap().key, "tok-abc");
        assert_eq!(loaded.workspace.unwrap().name, "acme");
    }

    #[test]
    fn missing_file_loads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join("nope.toml")).unwrap();
        assert!(config.api.is_none());
        assert!(config.workspace.is_none());
    }

    #[test]
    fn env_key_wins_over_the_file() {
        let config = logged_in(0); // expired on disk
        let key = resolve_api_key_with(&config, Some("env-key".into()), Utc::now()).unwrap();
        assert_eq!(key.expose_secret(), "env-key");
    }

    #[test]
    fn expired_key_is_rejected() {
        let config = logged_in(Utc::now().timestamp() - 60);
        let err = resolve_api_key_with(&config, None, Utc::now()).unwrap_err();
        assert!(matches!(err, ConfigError::SessionExpired));
    }

    #[test]
    fn no_login_is_rejected() {
        let err = resolve_api_key_with(&Config::default(), None, Utc::now()).unwrap_err();
        assert!(matches!(err, ConfigError::NotLoggedIn));
    }

    #[test]
    fn no_workspace_is_rejected() {
        let err = Config::default().workspace().unwrap_err();
        assert!(matches!(err, ConfigError::NoWorkspace));
    }
}
