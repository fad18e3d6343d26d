//! Client configuration.
//!
//! Natively the values come from the process environment; in the browser
//! they are baked in at build time with `option_env!`.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_STORAGE_KEY: &str = "accessToken";

pub const API_BASE_URL_VAR: &str = "LOOKOUT_API_BASE_URL";
pub const STORAGE_KEY_VAR: &str = "LOOKOUT_STORAGE_KEY";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be an http(s) URL, got '{value}'")]
    InvalidUrl { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Identity API origin, without a trailing `/`.
    pub api_base_url: String,
    /// Durable storage key holding the bearer token.
    pub storage_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { api_base_url: DEFAULT_API_BASE_URL.to_owned(), storage_key: DEFAULT_STORAGE_KEY.to_owned() }
    }
}

impl ClientConfig {
    /// Load configuration for the current target.
    ///
    /// Optional:
    /// - `LOOKOUT_API_BASE_URL`: default `http://localhost:8000`
    /// - `LOOKOUT_STORAGE_KEY`: default `accessToken`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a non-http(s) base URL or an empty key.
    pub fn load() -> Result<Self, ConfigError> {
        #[cfg(feature = "hydrate")]
        {
            Self::from_lookup(|var| match var {
                API_BASE_URL_VAR => option_env!("LOOKOUT_API_BASE_URL").map(str::to_owned),
                STORAGE_KEY_VAR => option_env!("LOOKOUT_STORAGE_KEY").map(str::to_owned),
                _ => None,
            })
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Self::from_lookup(|var| std::env::var(var).ok())
        }
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::load`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = parse_base_url(lookup(API_BASE_URL_VAR).as_deref())?;
        let storage_key = match lookup(STORAGE_KEY_VAR) {
            None => DEFAULT_STORAGE_KEY.to_owned(),
            Some(key) if key.trim().is_empty() => return Err(ConfigError::Empty { var: STORAGE_KEY_VAR }),
            Some(key) => key.trim().to_owned(),
        };
        Ok(Self { api_base_url, storage_key })
    }
}

fn parse_base_url(raw: Option<&str>) -> Result<String, ConfigError> {
    let raw = raw.map_or(DEFAULT_API_BASE_URL, str::trim);
    if raw.is_empty() {
        return Err(ConfigError::Empty { var: API_BASE_URL_VAR });
    }
    let base = raw.trim_end_matches('/');
    let has_host = base
        .strip_prefix("https://")
        .or_else(|| base.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(ConfigError::InvalidUrl { var: API_BASE_URL_VAR, value: raw.to_owned() });
    }
    Ok(base.to_owned())
}
