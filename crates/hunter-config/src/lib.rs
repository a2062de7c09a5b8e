//! Shared configuration for the hunter CLI.
//!
//! One flat TOML file plus `HUNTER_*` environment overrides, credential
//! resolution (injected value, then keyring), and translation to
//! `hunter_core::SessionConfig`.

mod credentials;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hunter_api::{CredentialProvider, Endpoints, ReconnectConfig, TlsMode, TransportConfig};
use hunter_core::SessionConfig;

pub use credentials::{
    API_KEY_ENTRY, ChainedCredential, CredentialSource, CredentialStore, KEYRING_SERVICE,
    KeyringStore, MemoryStore, set_api_secret_key,
};

/// Prefix for environment overrides (`HUNTER_API_BASE_URL`, ...).
pub const ENV_PREFIX: &str = "HUNTER_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("credential store error: {0}")]
    Keyring(String),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config ──────────────────────────────────────────────────────────

/// Top-level configuration. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// REST base, e.g. `http://127.0.0.1:5001/api`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Event-stream server, e.g. `http://127.0.0.1:5001`. Defaults to the
    /// REST host on port 5001.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_url: Option<String>,

    /// API key (plaintext; prefer `hunter key set`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_secret_key: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Accept any TLS certificate.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a PEM CA certificate for the REST server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,

    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,

    #[serde(default = "default_cache_max_age")]
    pub cache_max_age_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: None,
            socket_url: None,
            api_secret_key: None,
            timeout_secs: default_timeout(),
            insecure: false,
            ca_cert: None,
            reconnect_attempts: default_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay(),
            cache_max_age_secs: default_cache_max_age(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_reconnect_attempts() -> u32 {
    5
}
fn default_reconnect_delay() -> u64 {
    1000
}
fn default_cache_max_age() -> u64 {
    6 * 60 * 60
}

impl Config {
    /// Resolve the REST and event-stream addresses.
    pub fn endpoints(&self) -> Result<Endpoints, ConfigError> {
        Endpoints::resolve(self.api_base_url.as_deref(), self.socket_url.as_deref()).map_err(|e| {
            ConfigError::Validation {
                field: "api_base_url / socket_url".into(),
                reason: format!("invalid URL: {e}"),
            }
        })
    }

    pub fn transport(&self) -> TransportConfig {
        let tls = if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };

        TransportConfig {
            tls,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn reconnect(&self) -> ReconnectConfig {
        ReconnectConfig {
            delay: Duration::from_millis(self.reconnect_delay_ms),
            max_attempts: self.reconnect_attempts,
            ..ReconnectConfig::default()
        }
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_secs)
    }

    /// Build a `SessionConfig` using `credentials` for every REST call.
    pub fn to_session_config(
        &self,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<SessionConfig, ConfigError> {
        let mut session = SessionConfig::new(self.endpoints()?).with_credentials(credentials);
        session.transport = self.transport();
        session.reconnect = self.reconnect();
        session.cache_max_age = self.cache_max_age();
        Ok(session)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "baidu-index-hunter", "hunter").map_or_else(
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
    p.push("hunter");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Layers: built-in defaults, then the TOML file at `path`, then `HUNTER_*`.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Ok(figment_for(path).extract()?)
}
