//! Socket.IO event stream with auto-reconnect.
//!
//! Keeps at most one live connection to the backend's Socket.IO endpoint,
//! restores it after drops within a bounded attempt budget, and fans out
//! named server events to registered listeners. Connectivity problems are
//! never returned to callers; they only show up as the `connect` /
//! `disconnect` lifecycle events and in [`EventClient::state`].
//!
//! # Example
//!
//! ```rust,ignore
//! use hunter_api::{EventClient, ReconnectConfig, listener, TASK_UPDATE_EVENT};
//!
//! let client = EventClient::from_endpoints(&endpoints, ReconnectConfig::default())?;
//! client.on(TASK_UPDATE_EVENT, listener(|payload| println!("{payload}")));
//! client.connect();
//! // ...
//! client.disconnect();
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde_json::Value;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::error::EventError;
use crate::listeners::{Listener, ListenerRegistry};
use crate::protocol::{DEFAULT_NAMESPACE, EnginePacket, SocketPacket};
use crate::transport::Endpoints;

/// Lifecycle pseudo-event fired on entering `Connected` (payload `true`).
pub const CONNECT_EVENT: &str = "connect";

/// Lifecycle pseudo-event fired on leaving `Connected` (payload `false`).
pub const DISCONNECT_EVENT: &str = "disconnect";

/// Server event carrying task progress.
pub const TASK_UPDATE_EVENT: &str = "task_update";

/// Server event streaming backend log records.
pub const SYSTEM_LOG_EVENT: &str = "system_log";

// ── ConnectionState ──────────────────────────────────────────────────

/// Connection state. Only the client itself moves between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Fixed-interval reconnection policy.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Pause between attempts. Default: 1s.
    pub delay: Duration,

    /// Consecutive failed attempts before giving up. Default: 5.
    pub max_attempts: u32,

    /// Upper bound on WebSocket upgrade plus Socket.IO handshake. Default: 20s.
    pub handshake_timeout: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1000),
            max_attempts: 5,
            handshake_timeout: Duration::from_secs(20),
        }
    }
}

// ── EventClient ──────────────────────────────────────────────────────

/// Handle to the event stream.
///
/// Cheaply cloneable; every clone drives the same connection and listener
/// registry. Lifecycle: construct → [`connect`](Self::connect) →
/// [`disconnect`](Self::disconnect) → [`dispose`](Self::dispose).
#[derive(Clone)]
pub struct EventClient {
    inner: Arc<Inner>,
}

struct Inner {
    url: Url,
    reconnect: ReconnectConfig,
    listeners: ListenerRegistry,
    state: watch::Sender<ConnectionState>,
    session: Mutex<Session>,
}

/// Bumped on every `connect()`/`disconnect()`, so a background task from an
/// earlier session can no longer change state.
#[derive(Default)]
struct Session {
    generation: u64,
    cancel: Option<CancellationToken>,
}

impl EventClient {
    /// Create a client for a Socket.IO WebSocket URL. Does NOT connect.
    pub fn new(url: Url, reconnect: ReconnectConfig) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(Inner {
                url,
                reconnect,
                listeners: ListenerRegistry::new(),
                state,
                session: Mutex::new(Session::default()),
            }),
        }
    }

    /// Create a client for the event-stream address in `endpoints`.
    pub fn from_endpoints(
        endpoints: &Endpoints,
        reconnect: ReconnectConfig,
    ) -> Result<Self, EventError> {
        let url = endpoints
            .socket_io_url()
            .map_err(|e| EventError::InvalidUrl(e.to_string()))?;
        Ok(Self::new(url, reconnect))
    }

    /// The WebSocket URL this client connects to.
    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Start connecting in the background. Must be called within a Tokio runtime.
    ///
    /// A no-op while already `Connecting` or `Connected`.
    pub fn connect(&self) {
        let (generation, cancel) = {
            let mut session = self.inner.lock_session();
            if *self.inner.state.borrow() != ConnectionState::Disconnected {
                debug!("connect() ignored: event stream already active");
                return;
            }
            session.generation += 1;
            let cancel = CancellationToken::new();
            session.cancel = Some(cancel.clone());
            self.inner.state.send_replace(ConnectionState::Connecting);
            (session.generation, cancel)
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            run_session(inner, generation, cancel).await;
        });
    }

    /// Stop the connection and any pending reconnection. Safe from any state.
    pub fn disconnect(&self) {
        let previous = {
            let mut session = self.inner.lock_session();
            session.generation += 1;
            if let Some(cancel) = session.cancel.take() {
                cancel.cancel();
            }
            self.inner.state.send_replace(ConnectionState::Disconnected)
        };

        if previous != ConnectionState::Disconnected {
            info!("event stream disconnected by caller");
        }
        self.inner.emit_lifecycle(previous, ConnectionState::Disconnected);
    }

    /// Disconnect and drop every registered listener.
    pub fn dispose(&self) {
        self.disconnect();
        self.inner.listeners.clear();
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Subscribe to state changes.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    // ── Listeners ────────────────────────────────────────────────────

    /// Register a listener for a server event or lifecycle pseudo-event.
    pub fn on(&self, event: &str, listener: Listener) {
        self.inner.listeners.on(event, listener);
    }

    /// Remove the first registration of `listener` under `event`.
    pub fn off(&self, event: &str, listener: &Listener) -> bool {
        self.inner.listeners.off(event, listener)
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.inner.listeners.count(event)
    }
}

impl std::fmt::Debug for EventClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventClient")
            .field("url", &self.inner.url.as_str())
            .field("state", &self.state())
            .field("listeners", &self.inner.listeners)
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a state change requested by the background task of `generation`.
    ///
    /// Returns `false` if that session has since been superseded.
    fn transition(&self, generation: u64, next: ConnectionState) -> bool {
        let previous = {
            let mut session = self.lock_session();
            if session.generation != generation {
                return false;
            }
            if next == ConnectionState::Disconnected {
                session.cancel = None;
            }
            self.state.send_replace(next)
        };
        self.emit_lifecycle(previous, next);
        true
    }

    fn emit_lifecycle(&self, previous: ConnectionState, next: ConnectionState) {
        let connected = ConnectionState::Connected;
        if next == connected && previous != connected {
            self.listeners.dispatch(CONNECT_EVENT, &Value::Bool(true));
        } else if previous == connected && next != connected {
            self.listeners.dispatch(DISCONNECT_EVENT, &Value::Bool(false));
        }
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// How an established session ended.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    /// Socket dropped, errored, went silent or the engine closed: reconnect.
    TransportLost,
    /// Server disconnected the namespace: stay disconnected.
    ServerClosed,
    /// `disconnect()` was called.
    Cancelled,
}

/// Main loop: connect → read → on drop, wait → reconnect.
async fn run_session(inner: Arc<Inner>, generation: u64, cancel: CancellationToken) {
    let max_attempts = inner.reconnect.max_attempts.max(1);
    let mut failures: u32 = 0;

    loop {
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            outcome = connect_and_read(&inner, generation, &cancel) => outcome,
        };

        match outcome {
            Ok(SessionEnd::TransportLost) => {
                failures = 0;
                if !inner.transition(generation, ConnectionState::Connecting) {
                    break;
                }
                info!("event stream lost, reconnecting");
            }
            Ok(SessionEnd::ServerClosed) => {
                info!("event stream closed by server");
                inner.transition(generation, ConnectionState::Disconnected);
                break;
            }
            Ok(SessionEnd::Cancelled) => break,
            Err(e) => {
                failures += 1;
                warn!(
                    error = %e,
                    attempt = failures,
                    max_attempts,
                    "event stream connection attempt failed"
                );
                if failures >= max_attempts {
                    error!(max_attempts, "event stream reconnection limit reached, giving up");
                    inner.transition(generation, ConnectionState::Disconnected);
                    break;
                }
            }
        }

        trace!(delay_ms = inner.reconnect.delay.as_millis(), "waiting before reconnect");
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(inner.reconnect.delay) => {}
        }
    }

    debug!("event stream loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// One attempt: upgrade, handshake, then read until the connection ends.
///
/// `Err` means the handshake never completed (a failed attempt). Once
/// connected, every ending is reported as a [`SessionEnd`].
async fn connect_and_read(
    inner: &Inner,
    generation: u64,
    cancel: &CancellationToken,
) -> Result<SessionEnd, EventError> {
    debug!(url = %inner.url, "connecting to event stream");

    let (write, read, open) = tokio::time::timeout(inner.reconnect.handshake_timeout, async {
        let (ws_stream, _response) = tokio_tungstenite::connect_async(inner.url.as_str())
            .await
            .map_err(|e| EventError::Connect(e.to_string()))?;
        let (mut write, mut read) = ws_stream.split();
        let open = handshake(&mut write, &mut read).await?;
        Ok::<_, EventError>((write, read, open))
    })
    .await
    .map_err(|_| EventError::Connect("handshake timed out".into()))??;

    if !inner.transition(generation, ConnectionState::Connected) {
        return Ok(SessionEnd::Cancelled);
    }
    info!(sid = %open.sid, "event stream connected");

    // Server pings every `ping_interval`; silence beyond that plus the
    // grace period means the transport is dead.
    let liveness = Duration::from_millis(open.ping_interval.saturating_add(open.ping_timeout));
    read_events(inner, write, read, liveness, cancel).await
}

/// Engine.IO open → Socket.IO namespace connect.
async fn handshake<W, R>(
    write: &mut W,
    read: &mut R,
) -> Result<crate::protocol::OpenInfo, EventError>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
    R: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    let open = loop {
        match read_engine(read).await? {
            EnginePacket::Open(info) => break info,
            EnginePacket::Noop => {}
            other => {
                return Err(EventError::Protocol(format!(
                    "expected open packet, got {other:?}"
                )));
            }
        }
    };
    trace!(sid = %open.sid, ping_interval = open.ping_interval, "engine open");

    send_engine(write, EnginePacket::Message(SocketPacket::connect().encode())).await?;

    loop {
        match read_engine(read).await? {
            EnginePacket::Ping(data) => send_engine(write, EnginePacket::Pong(data)).await?,
            EnginePacket::Message(payload) => match SocketPacket::decode(&payload) {
                Ok(SocketPacket::Connect { .. }) => return Ok(open),
                Ok(packet @ SocketPacket::ConnectError { .. }) => {
                    return Err(EventError::Handshake(
                        packet.error_message().unwrap_or_default(),
                    ));
                }
                Ok(other) => trace!(?other, "ignoring packet before namespace connect"),
                Err(e) => debug!(error = %e, "skipping undecodable packet during handshake"),
            },
            EnginePacket::Close => {
                return Err(EventError::Connect("server closed during handshake".into()));
            }
            _ => {}
        }
    }
}

async fn read_events<W, R>(
    inner: &Inner,
    mut write: W,
    mut read: R,
    liveness: Duration,
    cancel: &CancellationToken,
) -> Result<SessionEnd, EventError>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
    R: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    loop {
        let packet = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                let _ = write.send(Message::Close(None)).await;
                return Ok(SessionEnd::Cancelled);
            }
            packet = tokio::time::timeout(liveness, read_engine(&mut read)) => packet,
        };

        let packet = match packet {
            Ok(Ok(packet)) => packet,
            Ok(Err(e)) => {
                warn!(error = %e, "event stream dropped");
                return Ok(SessionEnd::TransportLost);
            }
            Err(_) => {
                warn!(timeout_ms = liveness.as_millis(), "event stream went silent");
                return Ok(SessionEnd::TransportLost);
            }
        };

        match packet {
            EnginePacket::Ping(data) => {
                if let Err(e) = send_engine(&mut write, EnginePacket::Pong(data)).await {
                    warn!(error = %e, "failed to answer ping");
                    return Ok(SessionEnd::TransportLost);
                }
            }
            EnginePacket::Message(payload) => match SocketPacket::decode(&payload) {
                Ok(SocketPacket::Event { namespace, .. }) if namespace != DEFAULT_NAMESPACE => {
                    trace!(%namespace, "ignoring event for another namespace");
                }
                Ok(SocketPacket::Event { name, args, .. }) => dispatch_event(inner, &name, args),
                Ok(SocketPacket::Disconnect { namespace }) if namespace == DEFAULT_NAMESPACE => {
                    return Ok(SessionEnd::ServerClosed);
                }
                Ok(other) => trace!(?other, "ignoring socket packet"),
                Err(e) => debug!(error = %e, "skipping undecodable packet"),
            },
            EnginePacket::Close => {
                info!("engine closed by server");
                return Ok(SessionEnd::TransportLost);
            }
            _ => {}
        }
    }
}

/// Pass the first event argument, unchanged, to the event's listeners.
fn dispatch_event(inner: &Inner, name: &str, args: Vec<Value>) {
    if name == CONNECT_EVENT || name == DISCONNECT_EVENT {
        debug!(event = name, "ignoring server event with reserved lifecycle name");
        return;
    }
    let payload = args.into_iter().next().unwrap_or(Value::Null);
    let invoked = inner.listeners.dispatch(name, &payload);
    trace!(event = name, listeners = invoked, "dispatched server event");
}

// ── Frame helpers ────────────────────────────────────────────────────

/// Next Engine.IO packet. Undecodable text frames are skipped; a closed or
/// failed socket is an error.
async fn read_engine<R>(read: &mut R) -> Result<EnginePacket, EventError>
where
    R: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    loop {
        match read.next().await {
            Some(Ok(Message::Text(text))) => match EnginePacket::decode(text.as_str()) {
                Ok(packet) => return Ok(packet),
                Err(e) => debug!(error = %e, "skipping undecodable frame"),
            },
            Some(Ok(Message::Close(frame))) => {
                let reason = frame.map_or_else(
                    || "no close payload".to_owned(),
                    |cf| format!("code {}: {}", cf.code, cf.reason),
                );
                return Err(EventError::Connect(format!("socket closed ({reason})")));
            }
            Some(Ok(_)) => {
                // Binary, Ping, Pong, Frame -- tungstenite answers pings itself
            }
            Some(Err(e)) => return Err(EventError::Connect(e.to_string())),
            None => return Err(EventError::Connect("stream ended".into())),
        }
    }
}

async fn send_engine<W>(write: &mut W, packet: EnginePacket) -> Result<(), EventError>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    write
        .send(Message::text(packet.encode()))
        .await
        .map_err(|e| EventError::Connect(e.to_string()))
}

// ── Tests ────────────────────────────────────────────────────────────
