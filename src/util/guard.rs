//! Route guard decisions.
//!
//! SYSTEM CONTEXT
//! ==============
//! Guard components in `components::guard` are thin: they read the auth
//! signal and the router location, call [`evaluate`], and act on the
//! returned [`GuardDecision`]. All branching lives here so it can be tested
//! without a browser.
//!
//! DESIGN
//! ======
//! `decide` is a pure function of guard kind, auth state and location.
//! `evaluate` adds the single side effect guards have: remembering where an
//! unauthenticated operator was heading so login can send them back.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::sync::{Arc, Mutex, PoisonError};

use crate::routes::{LANDING_PATH, LOGIN_PATH, REGISTER_PATH};
use crate::state::auth::AuthState;

/// Which audience a guarded view is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GuardKind {
    /// Only authenticated operators may see the view.
    Authenticated,
    /// Only anonymous visitors may see the view (login, register).
    Anonymous,
}

/// Pre-redirect destination, restored after a successful login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationIntent {
    pub path: String,
}

/// Where a guard sends the browser instead of rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    /// Location to remember for after login, set on login redirects only.
    pub intent: Option<NavigationIntent>,
    /// Replace the current history entry rather than pushing.
    pub replace: bool,
}

/// Outcome of evaluating a guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Bootstrap has not finished; render nothing.
    Pending,
    /// Render the guarded child.
    Render,
    /// Navigate elsewhere; render nothing.
    Redirect(Redirect),
}

impl GuardDecision {
    #[must_use]
    pub fn renders(&self) -> bool {
        matches!(self, Self::Render)
    }
}

/// Holds at most one pending [`NavigationIntent`].
#[derive(Clone, Debug, Default)]
pub struct IntentSlot {
    slot: Arc<Mutex<Option<NavigationIntent>>>,
}

impl IntentSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&self, intent: NavigationIntent) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(intent);
    }

    pub fn take(&self) -> Option<NavigationIntent> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    pub fn discard(&self) {
        self.take();
    }

    #[must_use]
    pub fn peek(&self) -> Option<NavigationIntent> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Pure guard decision for `kind` at `location` under `state`.
#[must_use]
pub fn decide(kind: GuardKind, state: AuthState, location: &str) -> GuardDecision {
    if !state.is_initialized {
        return GuardDecision::Pending;
    }
    match (kind, state.is_authenticated) {
        (GuardKind::Authenticated, true) | (GuardKind::Anonymous, false) => GuardDecision::Render,
        (GuardKind::Authenticated, false) => GuardDecision::Redirect(Redirect {
            to: LOGIN_PATH.to_owned(),
            intent: Some(NavigationIntent { path: location.to_owned() }),
            replace: true,
        }),
        (GuardKind::Anonymous, true) => GuardDecision::Redirect(Redirect {
            to: LANDING_PATH.to_owned(),
            intent: None,
            replace: true,
        }),
    }
}

/// [`decide`], plus bookkeeping of the pending navigation intent.
///
/// A login redirect remembers where the operator was going. Once they are
/// authenticated, the anonymous-only guard sends them there instead of the
/// landing route. Rendering a protected view drops any stale intent.
#[must_use]
pub fn evaluate(kind: GuardKind, state: AuthState, location: &str, intents: &IntentSlot) -> GuardDecision {
    match decide(kind, state, location) {
        GuardDecision::Redirect(redirect) if kind == GuardKind::Authenticated => {
            if let Some(intent) = redirect.intent.clone() {
                log::debug!("guard: remembering intent {}", intent.path);
                intents.remember(intent);
            }
            GuardDecision::Redirect(redirect)
        }
        GuardDecision::Redirect(mut redirect) => {
            if let Some(intent) = intents.take().filter(|i| is_protected_target(&i.path)) {
                log::debug!("guard: resuming intent {}", intent.path);
                redirect.to = intent.path;
            }
            GuardDecision::Redirect(redirect)
        }
        GuardDecision::Render if kind == GuardKind::Authenticated => {
            intents.discard();
            GuardDecision::Render
        }
        decision => decision,
    }
}

/// [`evaluate`] for a guard that last decided `previous`.
///
/// A protected view that was rendering and now redirects has lost its
/// session to a logout, so its location is not resumed by the next login.
#[must_use]
pub fn reevaluate(
    kind: GuardKind,
    previous: &GuardDecision,
    state: AuthState,
    location: &str,
    intents: &IntentSlot,
) -> GuardDecision {
    match evaluate(kind, state, location, intents) {
        GuardDecision::Redirect(mut redirect) if kind == GuardKind::Authenticated && previous.renders() => {
            intents.discard();
            redirect.intent = None;
            GuardDecision::Redirect(redirect)
        }
        decision => decision,
    }
}

/// Router location as a single navigable target (`/path?query`).
#[must_use]
pub fn location_target(pathname: &str, search: &str) -> String {
    let search = search.trim_start_matches('?');
    if search.is_empty() {
        pathname.to_owned()
    } else {
        format!("{pathname}?{search}")
    }
}

fn is_protected_target(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with(LOGIN_PATH) && !path.starts_with(REGISTER_PATH)
}
