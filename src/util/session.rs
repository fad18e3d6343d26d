//! Session persistence.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store owns the durable credential. It has no policy of its
//! own: the auth state machine decides when to persist, clear or read, and
//! this module performs the side effects on durable storage and on the
//! outbound request credential.
//!
//! ORDERING
//! ========
//! `persist` writes storage before attaching the credential, so a failed
//! write leaves requests unauthenticated. `clear` detaches the credential
//! first, so requests stop carrying it even when storage removal fails.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use super::storage::{CredentialStorage, StorageError};
use crate::net::credential::CredentialHeader;

/// Durable credential plus its mirror on the outbound request header.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn CredentialStorage>,
    key: String,
    header: CredentialHeader,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("key", &self.key)
            .field("attached", &self.header.token().is_some())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(storage: Arc<dyn CredentialStorage>, key: impl Into<String>, header: CredentialHeader) -> Self {
        Self { storage, key: key.into(), header }
    }

    /// Store `token` durably and attach it to every outbound request.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write fails; the outbound credential
    /// is left as it was.
    pub fn persist(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set(&self.key, token)?;
        self.header.set(token);
        Ok(())
    }

    /// Detach the outbound credential and remove the durable token.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if removal fails. The outbound credential is
    /// detached regardless.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.header.clear();
        self.storage.remove(&self.key)
    }

    /// The persisted token, if any. Never touches the network.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if storage cannot be read.
    pub fn read(&self) -> Result<Option<String>, StorageError> {
        self.storage.get(&self.key)
    }

    /// Handle to the outbound credential this store drives.
    #[must_use]
    pub fn header(&self) -> &CredentialHeader {
        &self.header
    }
}
