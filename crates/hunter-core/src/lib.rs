// hunter-core: Sync session and cached server state between hunter-api and consumers.

pub mod clock;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SessionConfig;
pub use error::CoreError;
pub use model::{SystemLogEntry, TaskStatus, TaskUpdate, TimeRange, WeeklyBucket};
pub use session::SyncSession;
pub use store::{DEFAULT_MAX_AGE, TimeRangeStore, WeeklyBuckets};

// Transport-level types consumers need alongside the session.
pub use hunter_api::{ConnectionState, Listener, RequestError};
