//! Operator registration page.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use super::login::REQUIRED_FIELD;
use crate::net::types::RegisterRequest;
use crate::routes::LOGIN_PATH;
use crate::state::context::AuthContext;

pub(crate) const NAME_LEN: std::ops::RangeInclusive<usize> = 5..=24;

/// Validate the registration form, checking fields in display order.
pub(crate) fn validate_register_input(
    email: &str,
    username: &str,
    password: &str,
) -> Result<RegisterRequest, &'static str> {
    let email = email.trim();
    let username = username.trim();
    if email.is_empty() || username.is_empty() || password.is_empty() {
        return Err(REQUIRED_FIELD);
    }
    let username_len = username.chars().count();
    if username_len < *NAME_LEN.start() {
        return Err("Username must be at least 5 characters");
    }
    if username_len > *NAME_LEN.end() {
        return Err("Username must be at most 24 characters");
    }
    let password_len = password.chars().count();
    if password_len < *NAME_LEN.start() {
        return Err("Password must be at least 5 characters long");
    }
    if password_len > *NAME_LEN.end() {
        return Err("Password must be at most 24 characters");
    }
    Ok(RegisterRequest { email: email.to_owned(), username: username.to_owned(), password: password.to_owned() })
}

#[component]
pub fn RegisterPage(auth: AuthContext) -> impl IntoView {
    let email = RwSignal::new(String::new());
    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let navigate = use_navigate();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let request = match validate_register_input(&email.get(), &username.get(), &password.get()) {
            Ok(request) => request,
            Err(msg) => {
                info.set(msg.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set("Creating account...".to_owned());

        #[cfg(feature = "hydrate")]
        {
            let api = auth.machine.api();
            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                match api.register(&request).await {
                    Ok(()) => {
                        log::info!("register: account created for {}", request.email);
                        navigate(LOGIN_PATH, NavigateOptions { replace: true, ..NavigateOptions::default() });
                    }
                    Err(e) => {
                        log::info!("register: rejected: {e}");
                        info.set(e.to_string());
                        busy.set(false);
                    }
                }
            });
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Register"</h1>
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
                        type="text"
                        placeholder="username"
                        prop:value=move || username.get()
                        on:input=move |ev| username.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Register"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <A href=LOGIN_PATH>"Login instead"</A>
            </div>
        </div>
    }
}
