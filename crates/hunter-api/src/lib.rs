// hunter-api: Authenticated REST client and reconnecting Socket.IO event client

pub mod auth;
pub mod client;
mod endpoints;
pub mod error;
pub mod listeners;
pub mod models;
pub mod notify;
pub mod protocol;
pub mod transport;
pub mod websocket;

pub use auth::{CredentialProvider, StaticCredential};
pub use client::{ApiClient, SUCCESS_CODE};
pub use error::{EventError, RequestError, TransportCause};
pub use listeners::{Listener, ListenerRegistry, listener};
pub use models::{SystemLogPayload, TaskUpdatePayload, TimeRangeResponse};
pub use notify::{Notification, NotificationLevel, Notifier, TracingNotifier};
pub use transport::{Endpoints, TlsMode, TransportConfig};
pub use websocket::{
    CONNECT_EVENT, ConnectionState, DISCONNECT_EVENT, EventClient, ReconnectConfig,
    SYSTEM_LOG_EVENT, TASK_UPDATE_EVENT,
};

pub use reqwest::Method;
