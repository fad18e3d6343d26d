//! Wire types for the remote identity API.
//!
//! DESIGN
//! ======
//! Field names mirror the backend's JSON exactly. Profile fields the backend
//! may omit are `Option` so a partially filled record still renders.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /admins/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful `POST /admins/login` response.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Body of `POST /admins/register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Identity profile resolved from a photo.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Identifier for `GET /profiles/profile-photo/{photo_id}`.
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub photo_id: Option<String>,
    /// ISO 8601 creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// ISO 8601 last-update timestamp.
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Profile {
    /// First and last name joined, skipping whichever is missing.
    #[must_use]
    pub fn display_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

/// A photo selected by the operator for identity lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Binary profile photo returned by the API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfilePhoto {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ProfilePhoto {
    /// Inline `data:` URL suitable for an `<img src>`.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

/// Error payload returned with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Failure talking to the identity API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body did not match the expected schema.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The response carried a content type the client cannot display.
    #[error("unsupported media type: {0}")]
    UnsupportedMedia(String),
}

impl ApiError {
    /// Build a rejection from a status code and raw response body.
    ///
    /// Uses the server's `detail` when it is a plain string, otherwise a
    /// generic status message.
    #[must_use]
    pub fn rejected(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| match b.detail {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .unwrap_or_else(|| format!("request failed: {status}"));
        Self::Rejected { status, detail }
    }

    /// HTTP status for rejections, `None` for transport-level failures.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
