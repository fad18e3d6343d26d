//! Authentication state machine for the current operator.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthMachine` is the single source of truth for "is the operator logged
//! in". Route guards and views read [`AuthState`] from it and subscribe to
//! its transitions; nothing else mutates session state.
//!
//! ```text
//! UNINITIALIZED --initialize (valid token)--> AUTHENTICATED
//! UNINITIALIZED --initialize (no token)-----> ANONYMOUS
//! ANONYMOUS -----login ok-------------------> AUTHENTICATED
//! AUTHENTICATED -logout---------------------> ANONYMOUS
//! ```
//!
//! CONCURRENCY
//! ===========
//! The browser drives this from one thread, but async operations interleave.
//! Every transition is `reduce(previous, action)` applied under one lock, and
//! listeners run after the lock is released with the new value, so no reader
//! sees a half-applied transition. `initialize` runs at most once. Logout bumps
//! a generation counter; a login or bootstrap that resolves after a newer
//! logout is discarded instead of resurrecting the session.
//!
//! ERROR HANDLING
//! ==============
//! Bootstrap failures (storage errors, unusable tokens) are logged and
//! resolve to anonymous; bootstrap never leaves `is_initialized` false.
//! Login failures are returned to the caller untouched by any state change.
//! Logout cannot fail.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::net::api::IdentityApi;
use crate::net::types::{ApiError, LoginRequest};
use crate::util::session::SessionStore;
use crate::util::storage::StorageError;
use crate::util::token::{self, TokenStatus};

/// Authentication status visible to guards and views.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AuthState {
    /// A valid credential is currently held.
    pub is_authenticated: bool,
    /// Startup bootstrap has finished. Never reverts once true.
    pub is_initialized: bool,
}

/// Inputs to [`reduce`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthAction {
    /// Bootstrap finished with the given outcome.
    Initialize { is_authenticated: bool },
    /// A credential was obtained and persisted.
    Login,
    /// The credential was discarded.
    Logout,
}

/// Pure transition function.
#[must_use]
pub fn reduce(state: AuthState, action: AuthAction) -> AuthState {
    match action {
        AuthAction::Initialize { is_authenticated } => AuthState { is_authenticated, is_initialized: true },
        AuthAction::Login => AuthState { is_authenticated: true, ..state },
        AuthAction::Logout => AuthState { is_authenticated: false, ..state },
    }
}

/// Why a login attempt did not authenticate the operator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// The identity API rejected the credentials or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The token was issued but could not be persisted.
    #[error("could not save session: {0}")]
    Storage(#[from] StorageError),

    /// Login was attempted before bootstrap finished.
    #[error("authentication is still initializing")]
    NotInitialized,

    /// A logout happened while the request was in flight.
    #[error("login superseded by logout")]
    Superseded,
}

impl LoginError {
    /// Human-readable reason for presentation layers.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Api(ApiError::Rejected { detail, .. }) => detail.clone(),
            Self::Api(ApiError::Transport(_)) => "Unable to reach the server.".to_owned(),
            Self::Api(_) => "Unexpected response from the server.".to_owned(),
            Self::Storage(_) => "Could not save your session in this browser.".to_owned(),
            Self::NotInitialized => "Still starting up, please try again.".to_owned(),
            Self::Superseded => "Login was cancelled.".to_owned(),
        }
    }
}

type Listener = Arc<dyn Fn(AuthState) + Send + Sync>;

struct Inner {
    api: Arc<dyn IdentityApi>,
    session: SessionStore,
    state: Mutex<AuthState>,
    init_started: AtomicBool,
    generation: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
}

/// Handle to the process-wide authentication state machine.
///
/// Clones share the same machine. Create one at startup, call
/// [`AuthMachine::initialize`], then pass it to whatever needs it.
#[derive(Clone)]
pub struct AuthMachine {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for AuthMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthMachine")
            .field("state", &self.state())
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

impl AuthMachine {
    /// New machine in the uninitialized state.
    pub fn new(api: Arc<dyn IdentityApi>, session: SessionStore) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                session,
                state: Mutex::new(AuthState::default()),
                init_started: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
            }),
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> AuthState {
        *self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The identity API this machine logs in against.
    #[must_use]
    pub fn api(&self) -> Arc<dyn IdentityApi> {
        Arc::clone(&self.inner.api)
    }

    /// Restore the session from durable storage.
    ///
    /// Only the first call does anything; later or concurrent calls return
    /// immediately. Always ends with `is_initialized == true`.
    #[allow(clippy::unused_async)]
    pub async fn initialize(&self) {
        if self.inner.init_started.swap(true, Ordering::SeqCst) {
            log::debug!("auth: initialize already started; ignoring");
            return;
        }

        let generation = self.generation();
        let restored = match self.restore_session() {
            Ok(restored) => restored,
            Err(e) => {
                log::warn!("auth: session restore failed, continuing anonymous: {e}");
                false
            }
        };

        let is_authenticated = if restored && generation != self.generation() {
            log::info!("auth: logout during bootstrap; discarding restored session");
            false
        } else {
            restored
        };

        self.dispatch(AuthAction::Initialize { is_authenticated });
        log::info!("auth: initialized (authenticated: {is_authenticated})");
    }

    fn restore_session(&self) -> Result<bool, StorageError> {
        let Some(stored) = self.inner.session.read()? else {
            return Ok(false);
        };
        match token::inspect(&stored) {
            TokenStatus::Valid(credential) => {
                self.inner.session.persist(&credential.token)?;
                log::debug!("auth: restored session expiring at {}", credential.expires_at);
                Ok(true)
            }
            status => {
                log::info!("auth: discarding stored token ({status:?})");
                if let Err(e) = self.inner.session.clear() {
                    log::warn!("auth: could not remove stale token: {e}");
                }
                Ok(false)
            }
        }
    }

    /// Log in with the identity API and persist the returned token.
    ///
    /// The token is persisted before the state flips, so anything reacting
    /// to `is_authenticated` already has the credential attached.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError`] when the API rejects the attempt, the token
    /// cannot be stored, bootstrap has not finished, or a logout happened
    /// while the request was in flight. State is unchanged in every case.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<(), LoginError> {
        if !self.state().is_initialized {
            log::warn!("auth: login attempted before initialization");
            return Err(LoginError::NotInitialized);
        }

        let generation = self.generation();
        let request = LoginRequest { email: identifier.to_owned(), password: secret.to_owned() };
        let response = self.inner.api.login(&request).await.map_err(|e| {
            log::info!("auth: login failed: {e}");
            LoginError::from(e)
        })?;

        if generation != self.generation() {
            log::info!("auth: login resolved after logout; discarding token");
            return Err(LoginError::Superseded);
        }

        self.inner.session.persist(&response.access_token)?;
        self.dispatch(AuthAction::Login);
        log::info!("auth: logged in");
        Ok(())
    }

    /// Clear the session and drop to anonymous. Never fails.
    pub fn logout(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self.inner.session.clear() {
            log::warn!("auth: storage clear failed during logout: {e}");
        }
        self.dispatch(AuthAction::Logout);
        log::info!("auth: logged out");
    }

    /// Register `listener` to run after every state change.
    ///
    /// The listener is removed when the returned [`Subscription`] drops.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(AuthState) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        Subscription { machine: Arc::downgrade(&self.inner), id }
    }

    fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    fn dispatch(&self, action: AuthAction) {
        let next = {
            let mut state = self.inner.state.lock().unwrap_or_else(PoisonError::into_inner);
            let next = reduce(*state, action);
            if next == *state {
                return;
            }
            *state = next;
            next
        };

        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(next);
        }
    }
}

/// Keeps a listener registered; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    machine: Weak<Inner>,
    id: u64,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.machine.upgrade() {
            inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}
