//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration. Form validation and data
//! loading live in plain functions next to the component so they can be
//! tested natively.

pub mod login;
pub mod photo;
pub mod profile;
pub mod register;
