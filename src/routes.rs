//! Route surface of the client.

/// Login entry point; unauthenticated operators are sent here.
pub const LOGIN_PATH: &str = "/login";

/// Operator registration.
pub const REGISTER_PATH: &str = "/register";

/// Default authenticated landing route (photo input).
pub const LANDING_PATH: &str = "/";

/// Profile view for `profile_id`.
#[must_use]
pub fn profile_path(profile_id: &str) -> String {
    format!("/{profile_id}")
}
