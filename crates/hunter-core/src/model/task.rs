// ── Task progress pushed over the event stream ──

use serde::{Deserialize, Serialize};

/// Task id the backend uses for its own connection greeting.
pub const SYSTEM_TASK_ID: &str = "system";

/// Lifecycle of a crawler task as reported by the backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
    /// Greeting sent under [`SYSTEM_TASK_ID`] when a client connects.
    Connected,
}

impl TaskStatus {
    /// No further updates are expected once a task reaches this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// One `task_update` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub task_id: String,
    /// Percentage, 0 to 100.
    pub progress: Option<f64>,
    /// Status string exactly as sent.
    pub status: Option<String>,
    pub completed_items: Option<u64>,
    pub total_items: Option<u64>,
    /// `None` when the server sent nothing or an empty string.
    pub error_message: Option<String>,
}

impl TaskUpdate {
    /// The status, if it is one this crate knows.
    pub fn status_kind(&self) -> Option<TaskStatus> {
        self.status.as_deref()?.parse().ok()
    }

    pub fn is_system(&self) -> bool {
        self.task_id == SYSTEM_TASK_ID
    }

    pub fn is_finished(&self) -> bool {
        self.status_kind().is_some_and(TaskStatus::is_terminal)
    }
}
