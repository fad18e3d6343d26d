//! Process-wide default credential for outbound requests.
//!
//! Every request issued through [`super::api::HttpIdentityApi`] consults the
//! same handle. Clones share state, so the session store and the HTTP client
//! can each hold one.

#[cfg(test)]
#[path = "credential_test.rs"]
mod credential_test;

use std::sync::{Arc, PoisonError, RwLock};

/// Shared slot holding the bearer token attached to outbound requests.
#[derive(Clone, Debug, Default)]
pub struct CredentialHeader {
    token: Arc<RwLock<Option<String>>>,
}

impl CredentialHeader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `token` to every subsequent request.
    pub fn set(&self, token: &str) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
    }

    /// Stop attaching a credential. The header is omitted, not sent empty.
    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The raw token currently attached, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// `Authorization` header value, or `None` when no credential is set.
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        self.token().map(|t| format!("Bearer {t}"))
    }
}
