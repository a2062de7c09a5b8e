// ── API-to-domain type conversions ──
//
// Bridges raw `hunter_api::models` payloads into `hunter_core::model`
// types. Unparseable fields are dropped, not rejected: a range with a bad
// date simply never counts as complete.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::warn;

use hunter_api::models::{SystemLogPayload, TaskUpdatePayload, TimeRangeResponse};

use crate::model::{DATE_FORMAT, SystemLogEntry, TaskUpdate, TimeRange};

// ── Helpers ────────────────────────────────────────────────────────

fn parse_date(field: &str, raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            warn!(field, value = raw, error = %e, "ignoring unparseable date");
            None
        }
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

/// Log line numbers arrive as numbers or as strings.
fn line_number(raw: Option<&Value>) -> Option<u32> {
    match raw? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ── TimeRange ──────────────────────────────────────────────────────

impl From<TimeRangeResponse> for TimeRange {
    fn from(raw: TimeRangeResponse) -> Self {
        Self {
            start_date: parse_date("startDate", raw.start_date.as_deref()),
            end_date: parse_date("endDate", raw.end_date.as_deref()),
            start_date_raw: non_empty(raw.start_date_raw),
            end_date_raw: non_empty(raw.end_date_raw),
        }
    }
}

// ── Event payloads ─────────────────────────────────────────────────

impl From<TaskUpdatePayload> for TaskUpdate {
    fn from(raw: TaskUpdatePayload) -> Self {
        Self {
            task_id: raw.task_id.unwrap_or_default(),
            progress: raw.progress,
            status: non_empty(raw.status),
            completed_items: raw.completed_items,
            total_items: raw.total_items,
            error_message: non_empty(raw.error_message),
        }
    }
}

impl From<SystemLogPayload> for SystemLogEntry {
    fn from(raw: SystemLogPayload) -> Self {
        Self {
            line: line_number(raw.line.as_ref()),
            time: raw.time.unwrap_or_default(),
            level: raw.level.unwrap_or_else(|| "INFO".into()),
            name: raw.name.unwrap_or_default(),
            function: raw.function.unwrap_or_default(),
            message: raw.message.unwrap_or_default(),
        }
    }
}
