//! Networking modules for the remote identity API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` issues REST calls, `credential` holds the default bearer credential
//! those calls carry, and `types` defines the wire schema.

pub mod api;
pub mod credential;
pub mod types;
