//! `hunter key`: manage the API key persisted in the system keyring.

use hunter_config::{
    ChainedCredential, Config, CredentialSource, CredentialStore, KeyringStore,
    set_api_secret_key,
};

use crate::cli::{GlobalOpts, KeyCommand};
use crate::config;
use crate::error::CliError;
use crate::output::{self, paint};

pub fn handle(cmd: &KeyCommand, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let store = KeyringStore::default();
    let color = output::should_color(global.color);

    match cmd {
        KeyCommand::Set { key } => {
            let key = match key {
                Some(key) => key.clone(),
                None => rpassword::prompt_password("API key: ")?,
            };
            set_api_secret_key(&store, &key)?;
            let msg = if key.trim().is_empty() {
                "API key removed"
            } else {
                "API key stored in system keyring"
            };
            output::print_output(&paint(msg, color, output::green));
        }
        KeyCommand::Clear => {
            store.clear()?;
            output::print_output(&paint("API key removed", color, output::green));
        }
        KeyCommand::Status => {
            output::print_output(&describe(&config::credentials(cfg), color));
        }
    }
    Ok(())
}

fn describe(cred: &ChainedCredential, color: bool) -> String {
    let (tag, detail) = match cred.source() {
        CredentialSource::Injected => (
            paint("injected", color, output::green),
            "build time, config file or HUNTER_API_SECRET_KEY",
        ),
        CredentialSource::Persisted => (paint("persisted", color, output::green), "system keyring"),
        CredentialSource::None => (
            paint("none", color, output::yellow),
            "requests are sent without Authorization",
        ),
    };
    format!("{tag} ({detail})")
}
