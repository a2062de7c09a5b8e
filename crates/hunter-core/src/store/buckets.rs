// ── Weekly bucket sequence ──

use std::iter::FusedIterator;

use chrono::{Days, NaiveDate};

use crate::model::WeeklyBucket;

/// Lazy sequence of seven-day buckets over a date range.
///
/// Starts at the range's first day and steps a week at a time while the
/// bucket start is on or before the last day. The final bucket keeps its
/// full seven days even when that runs past the last day. Clone the
/// iterator to walk the same sequence again.
#[derive(Debug, Clone)]
pub struct WeeklyBuckets {
    next: Option<NaiveDate>,
    last: NaiveDate,
}

impl WeeklyBuckets {
    pub fn new(start: NaiveDate, last: NaiveDate) -> Self {
        Self {
            next: Some(start),
            last,
        }
    }

    /// A sequence that yields nothing.
    pub fn empty() -> Self {
        Self {
            next: None,
            last: NaiveDate::MIN,
        }
    }
}

impl Iterator for WeeklyBuckets {
    type Item = WeeklyBucket;

    fn next(&mut self) -> Option<WeeklyBucket> {
        let start = self.next.filter(|start| *start <= self.last)?;
        self.next = start.checked_add_days(Days::new(7));
        Some(WeeklyBucket::starting(start))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .filter(|start| *start <= self.last)
            .map_or(0, |start| {
                usize::try_from((self.last - start).num_days() / 7 + 1).unwrap_or(usize::MAX)
            });
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for WeeklyBuckets {}

impl FusedIterator for WeeklyBuckets {}
