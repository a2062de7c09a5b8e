// ── Cached server state ──
//
// Lock-free snapshots of slowly-changing server values, plus views derived
// from them on demand.

mod buckets;
mod time_range;

pub use buckets::WeeklyBuckets;
pub use time_range::{DEFAULT_MAX_AGE, TimeRangeStore};
