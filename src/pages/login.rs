//! Login page: email + password against the identity API.
//!
//! On success the auth state flips and the surrounding `RequireAnonymous`
//! guard navigates away; this page only reports failures.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::components::A;

use crate::routes::REGISTER_PATH;
use crate::state::context::AuthContext;

pub(crate) const REQUIRED_FIELD: &str = "This is required field";

/// Trimmed email and raw password, both required.
pub(crate) fn validate_login_input(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(REQUIRED_FIELD);
    }
    Ok((email.to_owned(), password.to_owned()))
}

#[component]
pub fn LoginPage(auth: AuthContext) -> impl IntoView {
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    let state = auth.state;

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (email_value, password_value) = match validate_login_input(&email.get(), &password.get()) {
            Ok(values) => values,
            Err(msg) => {
                info.set(msg.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set(String::new());

        #[cfg(feature = "hydrate")]
        {
            let machine = auth.machine.clone();
            leptos::task::spawn_local(async move {
                if let Err(e) = machine.login(&email_value, &password_value).await {
                    info.set(e.reason());
                }
                busy.set(false);
            });
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Login"</h1>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="Email"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button
                        class="login-button"
                        type="submit"
                        disabled=move || busy.get() || !state.get().is_initialized
                    >
                        {move || if busy.get() { "Logging in..." } else { "Login" }}
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <A href=REGISTER_PATH>"Register instead"</A>
            </div>
        </div>
    }
}
