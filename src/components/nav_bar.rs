//! Top navigation bar shown above authenticated pages.

use leptos::prelude::*;
use leptos_router::components::A;

use crate::routes::LANDING_PATH;
use crate::state::context::AuthContext;

#[component]
pub fn NavBar(auth: AuthContext) -> impl IntoView {
    let on_logout = move |_| auth.logout();

    view! {
        <nav class="nav-bar">
            <span class="nav-bar__brand">
                <A href=LANDING_PATH>"Lookout"</A>
            </span>
            <button class="btn nav-bar__logout" on:click=on_logout>
                "Log out"
            </button>
        </nav>
    }
}
