// Authenticated REST client
//
// Wraps `reqwest::Client` with bearer-credential injection and envelope
// unwrapping. Every outcome collapses into `Result<payload, RequestError>`;
// auth and application failures additionally raise one notification.
// Endpoint helpers live in `endpoints.rs` as inherent methods.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{CredentialProvider, bearer_header};
use crate::error::{RequestError, TransportCause};
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::transport::{Endpoints, TransportConfig};

/// Application status code marking a successful response.
pub const SUCCESS_CODE: i64 = 10000;

const DEFAULT_ERROR_MESSAGE: &str = "system error";
const DEFAULT_AUTH_MESSAGE: &str = "unauthorized";
const AUTH_HINT: &str = "check the configured API key";

/// Response envelope: `{ "code": 10000, "msg": "...", "data": ... }`.
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Value,
}

/// HTTP client for the dashboard backend.
///
/// All methods return the unwrapped `data` payload -- the envelope is
/// stripped before the caller sees it. No call is ever retried here.
pub struct ApiClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    credentials: Arc<dyn CredentialProvider>,
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(
        endpoints: Endpoints,
        transport: &TransportConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, RequestError> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            endpoints,
            credentials,
            notifier: Arc::new(TracingNotifier),
            timeout: transport.timeout,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        endpoints: Endpoints,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            http,
            endpoints,
            credentials,
            notifier: Arc::new(TracingNotifier),
            timeout: TransportConfig::default().timeout,
        }
    }

    /// Replace the notification sink.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// The resolved endpoints.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    // ── Core request ─────────────────────────────────────────────────

    /// Issue a request against a path relative to the REST base.
    ///
    /// Attaches `Authorization: Bearer <token>` when the credential provider
    /// has one. Returns the envelope's `data` on the success code.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: Option<&[(&str, &str)]>,
    ) -> Result<Value, RequestError> {
        let result = self.dispatch(method, path, body, query).await;
        if let Err(ref err) = result {
            self.notify_for(err);
        }
        result
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: Option<&[(&str, &str)]>,
    ) -> Result<Value, RequestError> {
        let url = self.endpoints.api_url(path).map_err(TransportCause::from)?;
        debug!(%method, %url, "sending request");

        let mut request = self.http.request(method, url);
        if let Some(token) = self.credentials.bearer_token() {
            request = request.header(AUTHORIZATION, bearer_header(&token));
        }
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await.map_err(|e| self.transport_error(e))?;
        self.parse_envelope(resp).await
    }

    /// Classify a response: 401 → auth, success code → payload,
    /// any other code → application error.
    async fn parse_envelope(&self, resp: reqwest::Response) -> Result<Value, RequestError> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        let envelope = serde_json::from_str::<Envelope>(&body);

        if status == StatusCode::UNAUTHORIZED {
            let message = envelope
                .ok()
                .and_then(|env| env.msg)
                .unwrap_or_else(|| DEFAULT_AUTH_MESSAGE.into());
            return Err(RequestError::Auth {
                status: status.as_u16(),
                message,
            });
        }

        match envelope {
            Ok(env) if status.is_success() && env.code == SUCCESS_CODE => Ok(env.data),
            Ok(env) => Err(RequestError::Application {
                code: env.code,
                message: env.msg.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.into()),
            }),
            Err(_) if !status.is_success() => Err(TransportCause::Status {
                status: status.as_u16(),
            }
            .into()),
            Err(e) => Err(TransportCause::Decode {
                message: e.to_string(),
                body,
            }
            .into()),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> RequestError {
        if err.is_timeout() {
            TransportCause::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
            .into()
        } else {
            TransportCause::Http(err).into()
        }
    }

    fn notify_for(&self, err: &RequestError) {
        match err {
            RequestError::Auth { message, .. } => {
                warn!(%message, "request rejected: unauthorized");
                self.notifier
                    .notify(Notification::warning(format!("{message}, {AUTH_HINT}")));
            }
            RequestError::Application { code, message } => {
                warn!(code, %message, "request rejected by server");
                self.notifier.notify(Notification::error(message.clone()));
            }
            RequestError::Transport(cause) => {
                debug!(error = %cause, "request failed in transport");
            }
        }
    }

    // ── Typed helpers ────────────────────────────────────────────────

    /// GET and deserialize the payload.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        let data = self.send(Method::GET, path, None, None).await?;
        decode_payload(&data)
    }

    /// GET with query parameters and deserialize the payload.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RequestError> {
        let data = self.send(Method::GET, path, None, Some(query)).await?;
        decode_payload(&data)
    }

    /// POST a JSON body and deserialize the payload.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, RequestError> {
        let data = self.send(Method::POST, path, Some(body), None).await?;
        decode_payload(&data)
    }

    /// PUT a JSON body and deserialize the payload.
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, RequestError> {
        let data = self.send(Method::PUT, path, Some(body), None).await?;
        decode_payload(&data)
    }

    /// DELETE and deserialize the payload.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        let data = self.send(Method::DELETE, path, None, None).await?;
        decode_payload(&data)
    }
}

fn decode_payload<T: DeserializeOwned>(data: &Value) -> Result<T, RequestError> {
    T::deserialize(data).map_err(|e| {
        TransportCause::Decode {
            message: e.to_string(),
            body: data.to_string(),
        }
        .into()
    })
}
