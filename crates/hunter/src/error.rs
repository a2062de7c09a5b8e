//! CLI error types with miette diagnostics.
//!
//! Maps request, session and configuration failures into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use hunter_api::{RequestError, TransportCause};
use hunter_config::ConfigError;
use hunter_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the backend at {url}")]
    #[diagnostic(
        code(hunter::connection_failed),
        help(
            "Check that the BaiduIndexHunter backend is running.\n\
             Override the address with --api-url or HUNTER_API_BASE_URL."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: RequestError,
    },

    #[error("TLS setup failed: {reason}")]
    #[diagnostic(
        code(hunter::tls_error),
        help("Use --insecure (-k) to accept any certificate, or set ca_cert in the config file.")
    )]
    Tls { reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(hunter::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    #[error("Event stream unavailable: {reason}")]
    #[diagnostic(code(hunter::event_stream), help("Check --socket-url or HUNTER_SOCKET_URL."))]
    EventStream { reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed (HTTP {status}): {message}")]
    #[diagnostic(
        code(hunter::auth_failed),
        help(
            "Store a valid API key with: hunter key set\n\
             Or set the HUNTER_API_SECRET_KEY environment variable."
        )
    )]
    AuthFailed { status: u16, message: String },

    // ── Backend ──────────────────────────────────────────────────────

    #[error("Backend error {code}: {message}")]
    #[diagnostic(code(hunter::api_error))]
    ApiError { code: i64, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hunter::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("{source}")]
    #[diagnostic(code(hunter::config), help("Config file: {path}"))]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(hunter::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Tls { .. } | Self::EventStream { .. } => {
                exit_code::CONNECTION
            }
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Classify a request failure against the backend at `url`.
    pub fn from_request(err: RequestError, url: &str) -> Self {
        match err {
            RequestError::Auth { status, message } => Self::AuthFailed { status, message },
            RequestError::Application { code, message } => Self::ApiError { code, message },
            RequestError::Transport(TransportCause::Timeout { timeout_secs }) => Self::Timeout {
                seconds: timeout_secs,
            },
            RequestError::Transport(TransportCause::Tls(reason)) => Self::Tls { reason },
            RequestError::Transport(TransportCause::InvalidUrl(e)) => Self::Validation {
                field: "path".into(),
                reason: e.to_string(),
            },
            err @ RequestError::Transport(_) => Self::ConnectionFailed {
                url: url.to_owned(),
                source: err,
            },
        }
    }

    pub fn from_core(err: CoreError, url: &str) -> Self {
        match err {
            CoreError::Request(err) => Self::from_request(err, url),
            CoreError::Event(err) => Self::EventStream {
                reason: err.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            source => Self::Config {
                path: hunter_config::config_path().display().to_string(),
                source,
            },
        }
    }
}
