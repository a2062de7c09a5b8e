use thiserror::Error;

/// Outcome taxonomy for every REST call made through [`ApiClient`](crate::ApiClient).
///
/// Callers never see raw `reqwest` failures: the request layer translates
/// each outcome into exactly one of these variants. Event-stream
/// connectivity is tracked separately as [`ConnectionState`](crate::ConnectionState)
/// and never surfaces here.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Server unreachable: DNS, timeout, refused connection, or a response
    /// that could not be understood at all.
    #[error("transport error: {0}")]
    Transport(#[from] TransportCause),

    /// The server rejected the bearer credential (HTTP 401).
    #[error("unauthorized (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    /// The server was reached but refused the request for a domain reason.
    #[error("application error {code}: {message}")]
    Application { code: i64, message: String },
}

/// Underlying cause of a [`RequestError::Transport`].
#[derive(Debug, Error)]
pub enum TransportCause {
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-success HTTP status without a parseable response envelope.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// Response body was not a valid envelope, with the raw body for debugging.
    #[error("failed to decode response: {message}")]
    Decode { message: String, body: String },

    /// HTTP client could not be constructed (TLS setup, bad CA file).
    #[error("TLS error: {0}")]
    Tls(String),
}

impl RequestError {
    /// Returns `true` if the credential was rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// The request layer never retries on its own; this is a hint for callers.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(TransportCause::Http(e)) => e.is_timeout() || e.is_connect(),
            Self::Transport(TransportCause::Timeout { .. }) => true,
            Self::Transport(TransportCause::Status { status }) => *status >= 500,
            _ => false,
        }
    }

    /// Application status code, if the server supplied one.
    pub fn application_code(&self) -> Option<i64> {
        match self {
            Self::Application { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Errors raised while setting up the event client.
///
/// Connection drops after setup are never reported through this type;
/// they only show up as lifecycle events.
#[derive(Debug, Error)]
pub enum EventError {
    /// The configured event-stream address cannot be used as a WebSocket URL.
    #[error("invalid event-stream URL: {0}")]
    InvalidUrl(String),

    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    Connect(String),

    /// The server refused the Socket.IO namespace connection.
    #[error("Socket.IO handshake rejected: {0}")]
    Handshake(String),

    /// A frame could not be decoded as an Engine.IO / Socket.IO packet.
    #[error("malformed packet: {0}")]
    Protocol(String),
}
