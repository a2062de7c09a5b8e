// ── Backend log record pushed over the event stream ──

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemLogEntry {
    pub time: String,
    /// Upper-case level name (`INFO`, `WARNING`, ...).
    pub level: String,
    pub name: String,
    pub function: String,
    pub line: Option<u32>,
    pub message: String,
}
