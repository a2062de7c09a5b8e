use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

/// Source of the bearer credential attached to REST calls.
///
/// Consulted on every request, so a credential persisted mid-session takes
/// effect on the next call without rebuilding the client.
pub trait CredentialProvider: Send + Sync {
    /// The current token, or `None` to send the request unauthenticated.
    fn bearer_token(&self) -> Option<SecretString>;
}

/// A fixed credential (or none at all).
#[derive(Debug, Clone, Default)]
pub struct StaticCredential(Option<SecretString>);

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(normalize(Some(token.into())))
    }

    /// Send every request without an `Authorization` header.
    pub fn none() -> Self {
        Self(None)
    }
}

impl CredentialProvider for StaticCredential {
    fn bearer_token(&self) -> Option<SecretString> {
        self.0.clone()
    }
}

impl<T: CredentialProvider + ?Sized> CredentialProvider for Arc<T> {
    fn bearer_token(&self) -> Option<SecretString> {
        (**self).bearer_token()
    }
}

/// Trim a raw credential; blank values count as absent.
pub fn normalize(raw: Option<String>) -> Option<SecretString> {
    raw.map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .map(SecretString::from)
}

/// Render the `Authorization` header value for a token.
pub(crate) fn bearer_header(token: &SecretString) -> String {
    format!("Bearer {}", token.expose_secret())
}
