// ── Listener registry ──
//
// Maps event names to ordered callback lists. Dispatch iterates a snapshot
// taken before the first callback runs, so callbacks may register or
// remove listeners (including themselves) without disturbing the
// in-progress dispatch.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

/// Callback handle. Identity is pointer identity of the `Arc`.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Wrap a closure as a [`Listener`].
pub fn listener(f: impl Fn(&Value) + Send + Sync + 'static) -> Listener {
    Arc::new(f)
}

/// Event name → callbacks, invoked in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    entries: DashMap<String, Vec<Listener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener for `event`. Duplicates are kept.
    pub fn on(&self, event: &str, listener: Listener) {
        self.entries
            .entry(event.to_owned())
            .or_default()
            .push(listener);
    }

    /// Remove the first registration of `listener` under `event`.
    ///
    /// Returns `true` if a registration was removed.
    pub fn off(&self, event: &str, listener: &Listener) -> bool {
        let Some(mut callbacks) = self.entries.get_mut(event) else {
            return false;
        };
        let Some(index) = callbacks.iter().position(|cb| Arc::ptr_eq(cb, listener)) else {
            return false;
        };
        callbacks.remove(index);
        let now_empty = callbacks.is_empty();
        drop(callbacks);

        if now_empty {
            self.entries.remove_if(event, |_, cbs| cbs.is_empty());
        }
        true
    }

    /// Copy of the current callbacks for `event`.
    pub fn snapshot(&self, event: &str) -> Vec<Listener> {
        self.entries
            .get(event)
            .map(|cbs| cbs.value().clone())
            .unwrap_or_default()
    }

    /// Invoke every listener registered for `event`, once each, in order.
    ///
    /// Returns the number of callbacks invoked.
    pub fn dispatch(&self, event: &str, payload: &Value) -> usize {
        let callbacks = self.snapshot(event);
        for callback in &callbacks {
            callback(payload);
        }
        callbacks.len()
    }

    /// Number of listeners registered for `event`.
    pub fn count(&self, event: &str) -> usize {
        self.entries.get(event).map_or(0, |cbs| cbs.len())
    }

    /// Drop every registration.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for entry in &self.entries {
            map.entry(entry.key(), &entry.value().len());
        }
        map.finish()
    }
}
