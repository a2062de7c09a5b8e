//! Command handlers. Each takes the live session and the global options.

pub mod get;
pub mod key;
pub mod time_range;
pub mod watch;

use hunter_core::SyncSession;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a session-backed command to its handler.
pub async fn dispatch(
    cmd: Command,
    session: &SyncSession,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Watch(args) => watch::handle(&args, session, global).await,
        Command::TimeRange(args) => time_range::handle(&args, session, global).await,
        Command::Get(args) => get::handle(&args, session, global).await,
        Command::Key(_) | Command::Completions(_) => unreachable!("handled before session setup"),
    }
}
