// Wire types for the backend's JSON payloads.
//
// Field names follow the server verbatim; `hunter-core` converts these
// into domain types.

use serde::{Deserialize, Serialize};

/// Payload of `GET /word-graph/time-range`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeResponse {
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub end_date: Option<String>,
    /// `YYYYMMDD`
    #[serde(default)]
    pub start_date_raw: Option<String>,
    /// `YYYYMMDD`
    #[serde(default)]
    pub end_date_raw: Option<String>,
}

/// Payload of the `task_update` event pushed over the event stream.
///
/// The server mixes naming styles (`taskId` next to `completed_items`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdatePayload {
    #[serde(rename = "taskId", default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub completed_items: Option<u64>,
    #[serde(default)]
    pub total_items: Option<u64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Payload of the `system_log` event: one backend log record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemLogPayload {
    /// `YYYY-MM-DD HH:MM:SS.mmm`, server local time.
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub function: Option<String>,
    /// Sent as a number by the logger and as a string by the greeting record.
    #[serde(default)]
    pub line: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}
