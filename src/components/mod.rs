//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Guards decide whether a routed page renders; the navigation bar frames
//! authenticated pages. Both receive the `AuthContext` as a prop.

pub mod guard;
pub mod nav_bar;
