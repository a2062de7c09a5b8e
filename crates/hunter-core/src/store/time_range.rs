// ── Word-graph time range cache ──
//
// Holds the last fetched range for a bounded lifetime. Readers load an
// `Arc` snapshot, so a refresh replaces every field at once or not at all.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};

use hunter_api::{ApiClient, RequestError};

use super::buckets::WeeklyBuckets;
use crate::clock::{Clock, SystemClock};
use crate::model::TimeRange;

/// Six hours.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_millis(21_600_000);

struct CacheEntry {
    range: TimeRange,
    /// Epoch millis of the successful fetch. Never 0 for a stored entry
    /// unless the clock itself reads 0.
    fetched_at: u64,
}

/// TTL cache over `GET /word-graph/time-range`.
pub struct TimeRangeStore {
    api: Arc<ApiClient>,
    clock: Arc<dyn Clock>,
    max_age: Duration,
    entry: ArcSwapOption<CacheEntry>,
    /// Serializes fetches so concurrent callers share one request.
    fetch_gate: Mutex<()>,
    loading: AtomicBool,
    last_error: ArcSwapOption<String>,
}

impl TimeRangeStore {
    pub fn new(api: Arc<ApiClient>, max_age: Duration) -> Self {
        Self::with_clock(api, max_age, Arc::new(SystemClock))
    }

    pub fn with_clock(api: Arc<ApiClient>, max_age: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            clock,
            max_age,
            entry: ArcSwapOption::empty(),
            fetch_gate: Mutex::new(()),
            loading: AtomicBool::new(false),
            last_error: ArcSwapOption::empty(),
        }
    }

    // ── Fetching ─────────────────────────────────────────────────────

    /// Return the cached range, fetching it first when the cache is not
    /// valid or `force_refresh` is set.
    ///
    /// A failed fetch leaves the cached entry untouched and returns the
    /// request error as-is.
    pub async fn get_or_fetch(&self, force_refresh: bool) -> Result<TimeRange, RequestError> {
        if !force_refresh {
            if let Some(range) = self.valid_range() {
                trace!("time range served from cache");
                return Ok(range);
            }
        }

        let observed = self.fetched_at();
        let _gate = self.fetch_gate.lock().await;

        // A fetch that completed while this call waited answers it too.
        if !force_refresh || self.fetched_at() != observed {
            if let Some(range) = self.valid_range() {
                trace!("time range filled by a concurrent fetch");
                return Ok(range);
            }
        }

        let _loading = LoadingFlag::raise(&self.loading);
        self.last_error.store(None);
        debug!(force_refresh, "fetching word-graph time range");

        match self.api.word_graph_time_range().await {
            Ok(response) => {
                let range = TimeRange::from(response);
                let fetched_at = self.clock.now_millis();
                self.entry.store(Some(Arc::new(CacheEntry {
                    range: range.clone(),
                    fetched_at,
                })));
                info!(
                    start = ?range.start_date,
                    end = ?range.end_date,
                    fetched_at,
                    "time range cached"
                );
                Ok(range)
            }
            Err(err) => {
                warn!(error = %err, "time range fetch failed, cache left as is");
                self.last_error.store(Some(Arc::new(err.to_string())));
                Err(err)
            }
        }
    }

    /// Forget the cached range. The next `get_or_fetch` always fetches.
    pub fn invalidate(&self) {
        self.entry.store(None);
        self.last_error.store(None);
        debug!("time range cache cleared");
    }

    // ── Derived views ────────────────────────────────────────────────

    /// Weekly buckets over the cached range. No I/O.
    ///
    /// Uses whatever range is cached, expired or not; empty when either
    /// date is missing.
    pub fn weekly_buckets(&self) -> WeeklyBuckets {
        self.entry
            .load_full()
            .and_then(|entry| entry.range.bounds())
            .map_or_else(WeeklyBuckets::empty, |(start, end)| {
                WeeklyBuckets::new(start, end)
            })
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The cached range, or an empty one.
    pub fn time_range(&self) -> TimeRange {
        self.entry
            .load_full()
            .map(|entry| entry.range.clone())
            .unwrap_or_default()
    }

    /// Epoch millis of the last successful fetch, 0 if none.
    pub fn fetched_at(&self) -> u64 {
        self.entry.load_full().map_or(0, |entry| entry.fetched_at)
    }

    /// Whether `get_or_fetch(false)` would be answered without a request.
    pub fn is_valid(&self) -> bool {
        self.entry
            .load_full()
            .is_some_and(|entry| self.entry_is_valid(&entry))
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Message of the most recent failed fetch, cleared when the next one starts.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.load_full().map(|msg| msg.to_string())
    }

    fn valid_range(&self) -> Option<TimeRange> {
        let entry = self.entry.load_full()?;
        self.entry_is_valid(&entry).then(|| entry.range.clone())
    }

    fn entry_is_valid(&self, entry: &CacheEntry) -> bool {
        let max_age = u64::try_from(self.max_age.as_millis()).unwrap_or(u64::MAX);
        entry.fetched_at != 0
            && self.clock.now_millis().saturating_sub(entry.fetched_at) < max_age
            && entry.range.is_complete()
    }
}

impl std::fmt::Debug for TimeRangeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeRangeStore")
            .field("range", &self.time_range())
            .field("fetched_at", &self.fetched_at())
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

/// Clears the loading flag on drop, including when the fetch is cancelled.
struct LoadingFlag<'a>(&'a AtomicBool);

impl<'a> LoadingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
