// ── Time range and weekly buckets ──

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// `YYYY-MM-DD`, used for display and for the server's `startDate`/`endDate`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `YYYYMMDD`, used as the value submitted back to the server.
pub const RAW_DATE_FORMAT: &str = "%Y%m%d";

/// The interval for which the backend holds word-graph data.
///
/// Calendar dates only, no time zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_date_raw: Option<String>,
    pub end_date_raw: Option<String>,
}

impl TimeRange {
    /// Both ends, if both are known.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start_date?, self.end_date?))
    }

    pub fn is_complete(&self) -> bool {
        self.bounds().is_some()
    }
}

/// One selectable week: seven calendar days starting at `start_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    pub start_date: NaiveDate,
    /// `start_date + 6 days`, inclusive.
    pub end_date: NaiveDate,
    /// `start_date` as `YYYYMMDD`.
    pub value: String,
    /// `"YYYY-MM-DD ~ YYYY-MM-DD"`.
    pub label: String,
}

impl WeeklyBucket {
    pub fn starting(start_date: NaiveDate) -> Self {
        let end_date = start_date
            .checked_add_days(Days::new(6))
            .unwrap_or(NaiveDate::MAX);
        Self {
            start_date,
            end_date,
            value: start_date.format(RAW_DATE_FORMAT).to_string(),
            label: format!(
                "{} ~ {}",
                start_date.format(DATE_FORMAT),
                end_date.format(DATE_FORMAT)
            ),
        }
    }
}
