//! Output formatting: table or JSON.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! JSON formats use serde.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use hunter_api::{Notification, NotificationLevel, Notifier};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Wrap `text` in the given paint only when color is enabled.
pub fn paint(text: &str, color: bool, style: fn(&str) -> String) -> String {
    if color { style(text) } else { text.to_owned() }
}

pub fn green(s: &str) -> String {
    s.green().to_string()
}

pub fn yellow(s: &str) -> String {
    s.yellow().to_string()
}

pub fn red(s: &str) -> String {
    s.red().bold().to_string()
}

pub fn dim(s: &str) -> String {
    s.dimmed().to_string()
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a single item. Table output uses `detail_fn`'s pre-formatted view.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
) -> Result<String, serde_json::Error>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => serde_json::to_string_pretty(data),
        OutputFormat::JsonCompact => serde_json::to_string(data),
    }
}

/// Render a raw JSON value. Table mode falls back to pretty JSON.
pub fn render_value(
    format: OutputFormat,
    value: &serde_json::Value,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Table | OutputFormat::Json => serde_json::to_string_pretty(value),
        OutputFormat::JsonCompact => serde_json::to_string(value),
    }
}

/// Print the rendered output to stdout.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

// ── Notifications ────────────────────────────────────────────────────

/// Prints request-layer notifications to stderr, one line each.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    color: bool,
}

impl TerminalNotifier {
    pub fn new(mode: ColorMode) -> Self {
        Self {
            color: should_color(mode) && io::stderr().is_terminal(),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        let tag = match notification.level {
            NotificationLevel::Warning => paint("warning", self.color, yellow),
            NotificationLevel::Error => paint("error", self.color, red),
        };
        let _ = writeln!(io::stderr().lock(), "{tag}: {}", notification.message);
    }
}
