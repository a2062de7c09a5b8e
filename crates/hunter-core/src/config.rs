// ── Runtime session configuration ──
//
// Describes how to reach the backend: endpoints, transport tuning,
// reconnect policy and the credential source. Never touches disk; the
// CLI (via `hunter-config`) builds one and hands it in.

use std::sync::Arc;
use std::time::Duration;

use hunter_api::{
    CredentialProvider, Endpoints, Notifier, ReconnectConfig, StaticCredential, TracingNotifier,
    TransportConfig,
};

use crate::store::DEFAULT_MAX_AGE;

/// Everything a [`SyncSession`](crate::SyncSession) needs.
#[derive(Clone)]
pub struct SessionConfig {
    pub endpoints: Endpoints,
    pub transport: TransportConfig,
    pub reconnect: ReconnectConfig,
    /// Lifetime of a cached time range.
    pub cache_max_age: Duration,
    /// Consulted on every REST call.
    pub credentials: Arc<dyn CredentialProvider>,
    /// Receives auth and application error notifications.
    pub notifier: Arc<dyn Notifier>,
}

impl SessionConfig {
    /// Defaults for everything but the endpoints. No credential.
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            endpoints,
            transport: TransportConfig::default(),
            reconnect: ReconnectConfig::default(),
            cache_max_age: DEFAULT_MAX_AGE,
            credentials: Arc::new(StaticCredential::none()),
            notifier: Arc::new(TracingNotifier),
        }
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("endpoints", &self.endpoints)
            .field("transport", &self.transport)
            .field("reconnect", &self.reconnect)
            .field("cache_max_age", &self.cache_max_age)
            .finish_non_exhaustive()
    }
}
