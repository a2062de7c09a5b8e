//! CLI-side configuration: the shared config file with global-flag overrides.

use std::sync::Arc;

use hunter_config::{ChainedCredential, Config, KeyringStore};
use hunter_core::SessionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::TerminalNotifier;

/// Load the config file plus `HUNTER_*` env, then apply command-line flags.
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = hunter_config::load_config()?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref url) = global.api_url {
        cfg.api_base_url = Some(url.clone());
    }
    if let Some(ref url) = global.socket_url {
        cfg.socket_url = Some(url.clone());
    }
    if let Some(secs) = global.timeout {
        cfg.timeout_secs = secs;
    }
    if global.insecure {
        cfg.insecure = true;
    }
}

/// The credential chain every command authenticates with.
pub fn credentials(cfg: &Config) -> ChainedCredential {
    ChainedCredential::new(
        cfg.api_secret_key.as_deref(),
        Arc::new(KeyringStore::default()),
    )
}

/// Full session wiring: config, keyring-backed credentials, terminal notices.
pub fn session_config(cfg: &Config, global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let session = cfg
        .to_session_config(Arc::new(credentials(cfg)))?
        .with_notifier(Arc::new(TerminalNotifier::new(global.color)));
    Ok(session)
}
