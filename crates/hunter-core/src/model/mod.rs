// ── Domain model ──
//
// Canonical types handed to consumers (CLI, session listeners). Raw wire
// payloads from `hunter_api::models` are converted in `convert.rs`.

pub mod system_log;
pub mod task;
pub mod time_range;

pub use system_log::SystemLogEntry;
pub use task::{TaskStatus, TaskUpdate};
pub use time_range::{DATE_FORMAT, RAW_DATE_FORMAT, TimeRange, WeeklyBucket};
