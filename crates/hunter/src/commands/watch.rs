//! `hunter watch`: stream task progress (and optionally backend logs).
//!
//! Runs until Ctrl-C, or until the event client gives up reconnecting.

use std::sync::Arc;

use serde::Serialize;

use hunter_api::{CONNECT_EVENT, DISCONNECT_EVENT, listener};
use hunter_core::{ConnectionState, SyncSession, SystemLogEntry, TaskStatus, TaskUpdate};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output::{self, paint};

/// One printed line of the stream.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum StreamLine<'a> {
    Connect,
    Disconnect,
    TaskUpdate(&'a TaskUpdate),
    SystemLog(&'a SystemLogEntry),
}

#[derive(Debug, Clone, Copy)]
struct Printer {
    format: OutputFormat,
    color: bool,
}

impl Printer {
    fn emit(self, line: &StreamLine<'_>) {
        let text = match self.format {
            OutputFormat::Table => self.human(line),
            OutputFormat::Json | OutputFormat::JsonCompact => {
                serde_json::to_string(line).unwrap_or_default()
            }
        };
        output::print_output(&text);
    }

    fn human(self, line: &StreamLine<'_>) -> String {
        let c = self.color;
        match line {
            StreamLine::Connect => paint("● connected", c, output::green),
            StreamLine::Disconnect => paint("○ disconnected", c, output::yellow),
            StreamLine::TaskUpdate(update) => task_line(update, c),
            StreamLine::SystemLog(entry) => format!(
                "{} {:<7} {}",
                paint(&entry.time, c, output::dim),
                entry.level,
                entry.message,
            ),
        }
    }
}

fn task_line(update: &TaskUpdate, color: bool) -> String {
    let status = update.status.as_deref().unwrap_or("unknown");
    let status = match update.status_kind() {
        Some(TaskStatus::Failed) => paint(status, color, output::red),
        Some(TaskStatus::Completed) => paint(status, color, output::green),
        Some(TaskStatus::Paused | TaskStatus::Cancelled) => paint(status, color, output::yellow),
        _ => status.to_owned(),
    };

    let mut line = format!("[{}] {status}", update.task_id);
    if let Some(progress) = update.progress {
        line.push_str(&format!(" {progress:.1}%"));
    }
    if let (Some(done), Some(total)) = (update.completed_items, update.total_items) {
        line.push_str(&format!(" ({done}/{total})"));
    }
    if let Some(ref err) = update.error_message {
        line.push_str(&format!(" {}", paint(err, color, output::red)));
    }
    line
}

fn wants(update: &TaskUpdate, filter: Option<&str>) -> bool {
    filter.is_none_or(|id| update.task_id == id || update.is_system())
}

pub async fn handle(
    args: &WatchArgs,
    session: &SyncSession,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let printer = Printer {
        format: global.output,
        color: output::should_color(global.color),
    };

    let events = session.events();
    events.on(CONNECT_EVENT, listener(move |_| printer.emit(&StreamLine::Connect)));
    events.on(
        DISCONNECT_EVENT,
        listener(move |_| printer.emit(&StreamLine::Disconnect)),
    );

    let filter: Option<Arc<str>> = args.task.as_deref().map(Arc::from);
    session.on_task_update(move |update| {
        if wants(&update, filter.as_deref()) {
            printer.emit(&StreamLine::TaskUpdate(&update));
        }
    });
    if args.logs {
        session.on_system_log(move |entry| printer.emit(&StreamLine::SystemLog(&entry)));
    }

    tracing::info!(url = %events.url(), "watching event stream");
    session.connect();
    let mut state = events.state_changes();

    let outcome = tokio::select! {
        res = tokio::signal::ctrl_c() => res.map_err(CliError::from),
        _ = state.wait_for(|s| *s == ConnectionState::Disconnected) => Err(CliError::EventStream {
            reason: format!("connection to {} closed", events.url()),
        }),
    };

    session.dispose();
    outcome
}
