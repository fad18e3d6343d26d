//! Client-side application state.
//!
//! DESIGN
//! ======
//! `auth` is framework-free and owns every session transition. `context`
//! adapts it to Leptos signals for the view tree.

pub mod auth;
pub mod context;
