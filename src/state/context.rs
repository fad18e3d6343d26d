//! Reactive bridge between the auth state machine and the Leptos view tree.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthMachine` knows nothing about Leptos. `AuthContext` subscribes to it
//! and mirrors every transition into an `RwSignal<AuthState>`, so guards and
//! pages re-render when the operator logs in or out. The context is built
//! once in `App` and handed to guards as a prop.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use std::sync::Arc;

use leptos::prelude::*;

use super::auth::{AuthMachine, AuthState, Subscription};
use crate::config::ClientConfig;
use crate::net::api::HttpIdentityApi;
use crate::net::credential::CredentialHeader;
use crate::util::guard::IntentSlot;
use crate::util::session::SessionStore;
use crate::util::storage::BrowserStorage;

/// Auth handles shared by the whole view tree.
#[derive(Clone)]
pub struct AuthContext {
    pub machine: AuthMachine,
    /// Mirror of `machine.state()`, updated on every transition.
    pub state: RwSignal<AuthState>,
    /// Destination remembered across a login redirect.
    pub intents: IntentSlot,
    _subscription: Arc<Subscription>,
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("machine", &self.machine)
            .field("intents", &self.intents)
            .finish_non_exhaustive()
    }
}

impl AuthContext {
    /// Wrap `machine`, seeding the signal with its current state.
    pub fn new(machine: AuthMachine) -> Self {
        let state = RwSignal::new(machine.state());
        let subscription = machine.subscribe(move |next| {
            if state.try_set(next).is_some() {
                log::debug!("auth: state signal disposed; dropping {next:?}");
            }
        });
        Self { machine, state, intents: IntentSlot::new(), _subscription: Arc::new(subscription) }
    }

    /// Wire the browser-backed machine: `localStorage`, the shared request
    /// credential and the HTTP identity API at `config.api_base_url`.
    pub fn in_browser(config: &ClientConfig) -> Self {
        let header = CredentialHeader::new();
        let api = Arc::new(HttpIdentityApi::new(config.api_base_url.clone(), header.clone()));
        log::info!("auth: identity API at {}", api.base_url());
        let session = SessionStore::new(Arc::new(BrowserStorage), config.storage_key.clone(), header);
        Self::new(AuthMachine::new(api, session))
    }

    /// Start session restore in the background. Safe to call repeatedly.
    pub fn bootstrap(&self) {
        #[cfg(feature = "hydrate")]
        {
            let machine = self.machine.clone();
            leptos::task::spawn_local(async move {
                machine.initialize().await;
            });
        }
    }

    /// Log out and forget any destination remembered for the next login.
    pub fn logout(&self) {
        self.machine.logout();
        self.intents.discard();
    }
}
