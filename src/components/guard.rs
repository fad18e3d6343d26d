//! Route guard components.
//!
//! Both guards re-run [`reevaluate`] in an effect whenever the auth signal or
//! the router location changes, so a logout while a protected view is
//! mounted redirects immediately.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::state::context::AuthContext;
use crate::util::guard::{GuardDecision, GuardKind, location_target, reevaluate};

/// Renders `children` only for an authenticated operator; otherwise sends
/// them to the login page and remembers where they were going.
#[component]
pub fn RequireAuth(auth: AuthContext, children: ChildrenFn) -> impl IntoView {
    guarded(GuardKind::Authenticated, auth, children)
}

/// Renders `children` only for anonymous visitors; authenticated operators
/// go to the landing route, or back to the page that sent them to login.
#[component]
pub fn RequireAnonymous(auth: AuthContext, children: ChildrenFn) -> impl IntoView {
    guarded(GuardKind::Anonymous, auth, children)
}

fn guarded(kind: GuardKind, auth: AuthContext, children: ChildrenFn) -> impl IntoView {
    let location = use_location();
    let navigate = use_navigate();
    let decision = RwSignal::new(GuardDecision::Pending);

    let intents = auth.intents.clone();
    let state = auth.state;
    Effect::new(move || {
        let target = location_target(&location.pathname.get(), &location.search.get());
        let previous = decision.get_untracked();
        let next = reevaluate(kind, &previous, state.get(), &target, &intents);
        if let GuardDecision::Redirect(redirect) = &next {
            log::debug!("guard: {kind:?} redirecting {target} -> {}", redirect.to);
            navigate(&redirect.to, NavigateOptions { replace: redirect.replace, ..NavigateOptions::default() });
        }
        decision.set(next);
    });

    view! {
        <Show when=move || decision.with(GuardDecision::renders)>
            {children()}
        </Show>
    }
}
