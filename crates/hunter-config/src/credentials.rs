// ── Credential chain ──
//
// Priority, checked on every request:
//   1. injected: the build-time `HUNTER_API_SECRET_KEY`, else the configured key
//   2. persisted: the system keyring entry
//   3. none: the request goes out without `Authorization`

use std::sync::{Arc, Mutex, PoisonError};

use secrecy::SecretString;

use hunter_api::CredentialProvider;
use hunter_api::auth::normalize;

use crate::ConfigError;

/// Keyring service name.
pub const KEYRING_SERVICE: &str = "baidu-index-hunter";

/// Fixed key the runtime credential is persisted under.
pub const API_KEY_ENTRY: &str = "baidu_index_hunter_api_key";

const BUILD_TIME_KEY: Option<&str> = option_env!("HUNTER_API_SECRET_KEY");

// ── Stores ──────────────────────────────────────────────────────────

/// Persistent slot for the runtime credential.
pub trait CredentialStore: Send + Sync {
    /// The stored value, `None` if nothing is stored.
    fn load(&self) -> Result<Option<String>, ConfigError>;
    fn save(&self, value: &str) -> Result<(), ConfigError>;
    /// Remove the stored value. Succeeds if nothing was stored.
    fn clear(&self) -> Result<(), ConfigError>;
}

/// The system keyring.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
    key: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            key: key.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, ConfigError> {
        keyring::Entry::new(&self.service, &self.key)
            .map_err(|e| ConfigError::Keyring(format!("failed to access keyring: {e}")))
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE, API_KEY_ENTRY)
    }
}

impl CredentialStore for KeyringStore {
    fn load(&self) -> Result<Option<String>, ConfigError> {
        match self.entry()?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(ConfigError::Keyring(e.to_string())),
        }
    }

    fn save(&self, value: &str) -> Result<(), ConfigError> {
        self.entry()?
            .set_password(value)
            .map_err(|e| ConfigError::Keyring(format!("failed to store API key: {e}")))
    }

    fn clear(&self) -> Result<(), ConfigError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(ConfigError::Keyring(format!("failed to remove API key: {e}"))),
        }
    }
}

/// In-process store, for tests and keyring-less environments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    value: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, ConfigError> {
        Ok(self
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, value: &str) -> Result<(), ConfigError> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(value.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), ConfigError> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Persist `key` as the runtime credential, trimmed. A blank key removes it.
pub fn set_api_secret_key(store: &dyn CredentialStore, key: &str) -> Result<(), ConfigError> {
    let key = key.trim();
    if key.is_empty() {
        store.clear()
    } else {
        store.save(key)
    }
}

// ── Provider ────────────────────────────────────────────────────────

/// Where the current credential comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Injected,
    Persisted,
    None,
}

/// [`CredentialProvider`] walking the injected value, then the store.
pub struct ChainedCredential {
    injected: Option<SecretString>,
    store: Arc<dyn CredentialStore>,
}

impl ChainedCredential {
    /// The build-time key wins over `configured`.
    pub fn new(configured: Option<&str>, store: Arc<dyn CredentialStore>) -> Self {
        Self::with_injected(BUILD_TIME_KEY.or(configured), store)
    }

    pub fn with_injected(injected: Option<&str>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            injected: normalize(injected.map(str::to_owned)),
            store,
        }
    }

    pub fn source(&self) -> CredentialSource {
        if self.injected.is_some() {
            CredentialSource::Injected
        } else if self.persisted().is_some() {
            CredentialSource::Persisted
        } else {
            CredentialSource::None
        }
    }

    // An unreadable store counts as empty.
    fn persisted(&self) -> Option<SecretString> {
        normalize(self.store.load().ok().flatten())
    }
}

impl CredentialProvider for ChainedCredential {
    fn bearer_token(&self) -> Option<SecretString> {
        self.injected.clone().or_else(|| self.persisted())
    }
}

impl std::fmt::Debug for ChainedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainedCredential")
            .field("source", &self.source())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn token(cred: &ChainedCredential) -> Option<String> {
        cred.bearer_token().map(|s| s.expose_secret().to_owned())
    }

    #[test]
    fn injected_value_wins_over_store() {
        let store = Arc::new(MemoryStore::with_value("from-keyring"));
        let cred = ChainedCredential::with_injected(Some(" injected "), store);

        assert_eq!(token(&cred).as_deref(), Some("injected"));
        assert_eq!(cred.source(), CredentialSource::Injected);
    }

    #[test]
    fn store_used_when_nothing_injected() {
        let store = Arc::new(MemoryStore::with_value("from-keyring"));
        let cred = ChainedCredential::with_injected(Some("   "), store);

        assert_eq!(token(&cred).as_deref(), Some("from-keyring"));
        assert_eq!(cred.source(), CredentialSource::Persisted);
    }

    #[test]
    fn absent_everywhere_means_no_header() {
        let cred = ChainedCredential::with_injected(None, Arc::new(MemoryStore::default()));
        assert_eq!(token(&cred), None);
        assert_eq!(cred.source(), CredentialSource::None);
    }

    #[test]
    fn store_changes_apply_to_next_lookup() {
        let store = Arc::new(MemoryStore::default());
        let cred = ChainedCredential::with_injected(None, store.clone());
        assert_eq!(token(&cred), None);

        set_api_secret_key(store.as_ref(), "  fresh-key\n").unwrap();
        assert_eq!(token(&cred).as_deref(), Some("fresh-key"));
        assert_eq!(store.load().unwrap().as_deref(), Some("fresh-key"));

        set_api_secret_key(store.as_ref(), " ").unwrap();
        assert_eq!(token(&cred), None);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn blank_persisted_value_is_absent() {
        let cred =
            ChainedCredential::with_injected(None, Arc::new(MemoryStore::with_value("  ")));
        assert_eq!(token(&cred), None);
    }
}
