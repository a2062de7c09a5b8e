// ── Core error types ──
//
// REST failures pass through as `RequestError` so callers keep the full
// transport / auth / application taxonomy. Event-stream problems only
// surface here when the client cannot even be built.

use thiserror::Error;

use hunter_api::{EventError, RequestError};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("event stream setup failed: {0}")]
    Event(#[from] EventError),
}

impl CoreError {
    /// The request error, if this is one.
    pub fn as_request(&self) -> Option<&RequestError> {
        match self {
            Self::Request(err) => Some(err),
            Self::Event(_) => None,
        }
    }
}
