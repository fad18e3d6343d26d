//! # lookout
//!
//! Leptos + WASM operator console for photo-based identity lookups.
//!
//! The crate is built around a small authentication core: a token validator
//! (`util::token`), a session store over durable browser storage
//! (`util::session`), and the auth state machine (`state::auth`) that route
//! guards (`util::guard`, `components::guard`) consult before rendering.
//! Pages drive the remote identity API through `net::api`.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod routes;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_support;

/// WASM entry point: install browser logging and hydrate the server-rendered
/// body.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        leptos::logging::warn!("console logger already installed: {e}");
    }
    leptos::mount::hydrate_body(app::App);
}
