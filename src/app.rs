//! Root application component with routing and the auth context.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    ParamSegment, StaticSegment,
    components::{Redirect, Route, Router, Routes},
};

use crate::components::guard::{RequireAnonymous, RequireAuth};
use crate::components::nav_bar::NavBar;
use crate::config::ClientConfig;
use crate::pages::{login::LoginPage, photo::PhotoPage, profile::ProfilePage, register::RegisterPage};
use crate::routes::LANDING_PATH;
use crate::state::context::AuthContext;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Builds the auth context, starts session restore and shows a loading
/// indicator until it finishes, then hands over to the router.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = ClientConfig::load().unwrap_or_else(|e| {
        log::warn!("config: {e}; using defaults");
        ClientConfig::default()
    });
    let auth = AuthContext::in_browser(&config);
    auth.bootstrap();
    let state = auth.state;

    let login = anonymous_only(auth.clone(), |auth| view! { <LoginPage auth/> });
    let register = anonymous_only(auth.clone(), |auth| view! { <RegisterPage auth/> });
    let photo = protected(auth.clone(), |auth| view! { <PhotoPage auth/> });
    let profile = protected(auth, |auth| view! { <ProfilePage auth/> });

    view! {
        <Stylesheet id="leptos" href="/pkg/lookout.css"/>
        <Title text="Lookout"/>

        <Router>
            <Show
                when=move || state.get().is_initialized
                fallback=|| view! { <div class="app-loading"><div class="spinner"></div></div> }
            >
                <Routes clone:login clone:register clone:photo clone:profile fallback=|| view! { <Redirect path=LANDING_PATH/> }>
                    <Route path=StaticSegment("login") view=login.clone()/>
                    <Route path=StaticSegment("register") view=register.clone()/>
                    <Route path=StaticSegment("") view=photo.clone()/>
                    <Route path=ParamSegment("profile_id") view=profile.clone()/>
                </Routes>
            </Show>
        </Router>
    }
}

/// Route view for an authenticated page under the navigation bar.
fn protected<V>(
    auth: AuthContext,
    page: impl Fn(AuthContext) -> V + Send + Sync + Clone + 'static,
) -> impl Fn() -> AnyView + Send + Sync + Clone + 'static
where
    V: IntoView + 'static,
{
    move || {
        let inner = auth.clone();
        let page = page.clone();
        view! {
            <RequireAuth auth=auth.clone()>
                <NavBar auth=inner.clone()/>
                {page(inner.clone())}
            </RequireAuth>
        }
        .into_any()
    }
}

/// Route view for a page only anonymous visitors may see.
fn anonymous_only<V>(
    auth: AuthContext,
    page: impl Fn(AuthContext) -> V + Send + Sync + Clone + 'static,
) -> impl Fn() -> AnyView + Send + Sync + Clone + 'static
where
    V: IntoView + 'static,
{
    move || {
        let inner = auth.clone();
        let page = page.clone();
        view! {
            <RequireAnonymous auth=auth.clone()>
                {page(inner.clone())}
            </RequireAnonymous>
        }
        .into_any()
    }
}
