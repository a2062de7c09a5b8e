//! Clap derive structures for the `hunter` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hunter -- live task progress and cached lookups for BaiduIndexHunter
#[derive(Debug, Parser)]
#[command(
    name = "hunter",
    version,
    about = "Watch and query a BaiduIndexHunter backend",
    long_about = "Command-line client for the BaiduIndexHunter data-collection backend.\n\n\
        Streams crawler task progress over Socket.IO and issues authenticated\n\
        REST calls with the configured API key.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// REST API base URL (e.g. http://127.0.0.1:5001/api)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Event-stream server URL (defaults to the API host on port 5001)
    #[arg(long, global = true)]
    pub socket_url: Option<String>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Accept any TLS certificate
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stream task progress until interrupted
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Show the word-graph time range and its weekly buckets
    #[command(alias = "tr")]
    TimeRange(TimeRangeArgs),

    /// Authenticated GET against an API path, printed as JSON
    Get(GetArgs),

    /// Manage the stored API key
    Key(KeyArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Also print backend log records
    #[arg(long, short = 'l')]
    pub logs: bool,

    /// Only show updates for this task
    #[arg(long, short = 't')]
    pub task: Option<String>,
}

#[derive(Debug, Args)]
pub struct TimeRangeArgs {
    /// Bypass the cache and fetch again
    #[arg(long, short = 'r')]
    pub refresh: bool,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Path relative to the API base (e.g. /task/list)
    pub path: String,

    /// Query parameter as key=value; repeatable
    #[arg(long = "query", short = 'q', value_name = "KEY=VALUE")]
    pub query: Vec<String>,
}

#[derive(Debug, Args)]
pub struct KeyArgs {
    #[command(subcommand)]
    pub command: KeyCommand,
}

#[derive(Debug, Subcommand)]
pub enum KeyCommand {
    /// Store an API key in the system keyring (prompts when KEY is omitted)
    Set {
        /// The key; a blank value removes the stored key
        key: Option<String>,
    },

    /// Remove the stored API key
    Clear,

    /// Show where the active API key comes from
    Status,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
