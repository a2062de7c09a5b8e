// Shared transport configuration.
//
// Resolves the REST base URL and the event-stream address once at startup,
// and builds the `reqwest::Client` used by the request layer. Nothing here
// reads ambient state: callers hand in whatever they resolved.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::TransportCause;

/// REST base used when nothing is configured.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5001/api";

/// Port the event-stream server listens on in development.
pub const DEFAULT_SOCKET_PORT: u16 = 5001;

const USER_AGENT: &str = concat!("hunter/", env!("CARGO_PKG_VERSION"));

// ── Endpoints ────────────────────────────────────────────────────────

/// Resolved addresses for the REST API and the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    api_base: Url,
    socket: Url,
}

impl Endpoints {
    /// Resolve endpoints from externally supplied values.
    ///
    /// `api_base` falls back to [`DEFAULT_API_BASE`]. `socket` falls back to
    /// the REST base's scheme and host on port [`DEFAULT_SOCKET_PORT`].
    pub fn resolve(api_base: Option<&str>, socket: Option<&str>) -> Result<Self, url::ParseError> {
        let api_base = match api_base.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Url::parse(raw)?,
            None => Url::parse(DEFAULT_API_BASE)?,
        };

        let socket = match socket.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Url::parse(raw)?,
            None => {
                let host = api_base.host_str().unwrap_or("127.0.0.1");
                Url::parse(&format!(
                    "{}://{host}:{DEFAULT_SOCKET_PORT}",
                    api_base.scheme()
                ))?
            }
        };

        Ok(Self { api_base, socket })
    }

    /// Base URL that REST paths are joined onto.
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Event-stream server address as configured (http/https form).
    pub fn socket(&self) -> &Url {
        &self.socket
    }

    /// Build a full URL for a REST path relative to the base.
    pub fn api_url(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = self.api_base.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}"))
    }

    /// WebSocket URL for the Socket.IO endpoint (Engine.IO v4, websocket transport).
    pub fn socket_io_url(&self) -> Result<Url, url::ParseError> {
        let scheme = match self.socket.scheme() {
            "https" | "wss" => "wss",
            _ => "ws",
        };
        let host = self.socket.host_str().unwrap_or("127.0.0.1");
        let authority = match self.socket.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        };
        Url::parse(&format!(
            "{scheme}://{authority}/socket.io/?EIO=4&transport=websocket"
        ))
    }
}

// ── TransportConfig ──────────────────────────────────────────────────

/// TLS verification mode for REST calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed development servers).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, TransportCause> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| TransportCause::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| TransportCause::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| TransportCause::Tls(format!("failed to build HTTP client: {e}")))
    }
}
