// ── Sync session ──
//
// Owns the REST client, the event client and the time-range cache for one
// front-end session. Constructed explicitly and passed to whoever needs it;
// there is no process-wide instance.

use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use hunter_api::{
    ApiClient, ConnectionState, EventClient, Listener, SYSTEM_LOG_EVENT, SystemLogPayload,
    TASK_UPDATE_EVENT, TaskUpdatePayload, listener,
};

use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::model::{SystemLogEntry, TaskUpdate};
use crate::store::TimeRangeStore;

/// Lifecycle: [`new`](Self::new) → [`connect`](Self::connect) →
/// [`disconnect`](Self::disconnect) → [`dispose`](Self::dispose).
///
/// Cheaply cloneable; clones share everything.
#[derive(Clone)]
pub struct SyncSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: Arc<ApiClient>,
    events: EventClient,
    time_range: TimeRangeStore,
}

impl SyncSession {
    /// Build the clients. Does NOT connect the event stream.
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Like [`new`](Self::new), with the clock the cache judges freshness by.
    pub fn with_clock(config: SessionConfig, clock: Arc<dyn Clock>) -> Result<Self, CoreError> {
        let SessionConfig {
            endpoints,
            transport,
            reconnect,
            cache_max_age,
            credentials,
            notifier,
        } = config;

        let events = EventClient::from_endpoints(&endpoints, reconnect)?;
        let api = Arc::new(
            ApiClient::new(endpoints, &transport, credentials)?.with_notifier(notifier),
        );
        let time_range = TimeRangeStore::with_clock(Arc::clone(&api), cache_max_age, clock);

        debug!(
            api = %api.endpoints().api_base(),
            socket = %events.url(),
            "sync session created"
        );

        Ok(Self {
            inner: Arc::new(SessionInner {
                api,
                events,
                time_range,
            }),
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn events(&self) -> &EventClient {
        &self.inner.events
    }

    pub fn time_range(&self) -> &TimeRangeStore {
        &self.inner.time_range
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start the event stream. Must be called within a Tokio runtime.
    pub fn connect(&self) {
        self.inner.events.connect();
    }

    pub fn disconnect(&self) {
        self.inner.events.disconnect();
    }

    /// Disconnect and drop every listener. The REST client and cache stay usable.
    pub fn dispose(&self) {
        self.inner.events.dispose();
        info!("sync session disposed");
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.inner.events.state()
    }

    // ── Typed listeners ──────────────────────────────────────────────

    /// Call `f` with every `task_update` event.
    ///
    /// Returns the registered handle for use with
    /// [`EventClient::off`]. Payloads that do not decode are skipped.
    pub fn on_task_update(&self, f: impl Fn(TaskUpdate) + Send + Sync + 'static) -> Listener {
        self.register::<TaskUpdatePayload, _>(TASK_UPDATE_EVENT, f)
    }

    /// Call `f` with every `system_log` record.
    pub fn on_system_log(&self, f: impl Fn(SystemLogEntry) + Send + Sync + 'static) -> Listener {
        self.register::<SystemLogPayload, _>(SYSTEM_LOG_EVENT, f)
    }

    fn register<P, T>(&self, event: &'static str, f: impl Fn(T) + Send + Sync + 'static) -> Listener
    where
        P: DeserializeOwned,
        T: From<P>,
    {
        let callback = typed_listener::<P, T>(event, f);
        self.inner.events.on(event, Arc::clone(&callback));
        callback
    }
}

impl std::fmt::Debug for SyncSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSession")
            .field("events", &self.inner.events)
            .field("time_range", &self.inner.time_range)
            .finish_non_exhaustive()
    }
}

fn typed_listener<P, T>(event: &'static str, f: impl Fn(T) + Send + Sync + 'static) -> Listener
where
    P: DeserializeOwned,
    T: From<P>,
{
    listener(move |payload| match P::deserialize(payload) {
        Ok(raw) => f(T::from(raw)),
        Err(e) => debug!(event, error = %e, "skipping malformed event payload"),
    })
}
