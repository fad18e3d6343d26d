//! REST client for the remote identity API.
//!
//! Client-side (hydrate): HTTP calls via `gloo-net`.
//! Native (SSR, tests, other hosts): HTTP calls via `reqwest`.
//!
//! Both transports attach the shared [`CredentialHeader`] to every request,
//! so persisting or clearing a session takes effect on the next call without
//! rebuilding the client.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become [`ApiError::Rejected`] carrying the server's
//! `detail` text; network failures become [`ApiError::Transport`]. Nothing
//! here panics.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;

use super::credential::CredentialHeader;
use super::types::{ApiError, LoginRequest, LoginResponse, PhotoUpload, Profile, ProfilePhoto, RegisterRequest};

const LOGIN_PATH: &str = "/admins/login";
const REGISTER_PATH: &str = "/admins/register";
const VERIFY_PROFILE_PATH: &str = "/profiles/verify-profile";

fn profile_path(profile_id: &str) -> String {
    format!("/profiles/profile/{profile_id}")
}

fn profile_photo_path(photo_id: &str) -> String {
    format!("/profiles/profile-photo/{photo_id}")
}

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

/// Accept only image payloads for profile photos.
fn check_photo_content_type(content_type: Option<&str>) -> Result<String, ApiError> {
    let content_type = content_type.unwrap_or_default().trim();
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    if essence.starts_with("image/") {
        Ok(essence.to_owned())
    } else {
        Err(ApiError::UnsupportedMedia(if content_type.is_empty() {
            "missing content type".to_owned()
        } else {
            content_type.to_owned()
        }))
    }
}

/// Operations the client consumes from the identity service.
///
/// Futures are not `Send`: the browser runs everything on one thread.
#[async_trait(?Send)]
pub trait IdentityApi: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;

    /// Create a new operator account.
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError>;

    /// Upload a photo and resolve it to a profile.
    async fn verify_photo(&self, photo: &PhotoUpload) -> Result<Profile, ApiError>;

    /// Fetch a profile by identifier.
    async fn fetch_profile(&self, profile_id: &str) -> Result<Profile, ApiError>;

    /// Fetch the binary photo attached to a profile.
    async fn fetch_profile_photo(&self, photo_id: &str) -> Result<ProfilePhoto, ApiError>;
}

/// HTTP implementation of [`IdentityApi`].
#[derive(Clone)]
pub struct HttpIdentityApi {
    base_url: String,
    credential: CredentialHeader,
    #[cfg(not(feature = "hydrate"))]
    http: reqwest::Client,
}

impl std::fmt::Debug for HttpIdentityApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpIdentityApi")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpIdentityApi {
    /// Client rooted at `base_url`, attaching whatever `credential` holds.
    pub fn new(base_url: impl Into<String>, credential: CredentialHeader) -> Self {
        Self {
            base_url: base_url.into(),
            credential,
            #[cfg(not(feature = "hydrate"))]
            http: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

// =============================================================================
// BROWSER TRANSPORT
// =============================================================================

#[cfg(feature = "hydrate")]
impl HttpIdentityApi {
    fn authorize(&self, builder: gloo_net::http::RequestBuilder) -> gloo_net::http::RequestBuilder {
        match self.credential.authorization() {
            Some(value) => builder.header("Authorization", &value),
            None => builder,
        }
    }

    async fn send(&self, request: gloo_net::http::Request) -> Result<gloo_net::http::Response, ApiError> {
        let resp = request.send().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        if resp.ok() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::rejected(status, &body))
    }

    async fn post_json<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<gloo_net::http::Response, ApiError> {
        let request = self
            .authorize(gloo_net::http::Request::post(&self.url(path)))
            .json(body)
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        self.send(request).await
    }

    async fn get(&self, path: &str) -> Result<gloo_net::http::Response, ApiError> {
        let request = self
            .authorize(gloo_net::http::Request::get(&self.url(path)))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        self.send(request).await
    }
}

#[cfg(feature = "hydrate")]
fn photo_form(photo: &PhotoUpload) -> Result<web_sys::FormData, ApiError> {
    let js_err = |e: wasm_bindgen::JsValue| ApiError::Transport(format!("{e:?}"));
    let bytes = js_sys::Uint8Array::from(photo.bytes.as_slice());
    let parts = js_sys::Array::of1(&bytes);
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(&photo.content_type);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_err)?;
    let form = web_sys::FormData::new().map_err(js_err)?;
    form.append_with_blob_and_filename("photo", &blob, &photo.file_name)
        .map_err(js_err)?;
    Ok(form)
}

#[cfg(feature = "hydrate")]
#[async_trait(?Send)]
impl IdentityApi for HttpIdentityApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let resp = self.post_json(LOGIN_PATH, request).await?;
        resp.json::<LoginResponse>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        self.post_json(REGISTER_PATH, request).await?;
        Ok(())
    }

    async fn verify_photo(&self, photo: &PhotoUpload) -> Result<Profile, ApiError> {
        let request = self
            .authorize(gloo_net::http::Request::post(&self.url(VERIFY_PROFILE_PATH)))
            .body(photo_form(photo)?)
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let resp = self.send(request).await?;
        resp.json::<Profile>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn fetch_profile(&self, profile_id: &str) -> Result<Profile, ApiError> {
        let resp = self.get(&profile_path(profile_id)).await?;
        resp.json::<Profile>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn fetch_profile_photo(&self, photo_id: &str) -> Result<ProfilePhoto, ApiError> {
        let resp = self.get(&profile_photo_path(photo_id)).await?;
        let content_type = check_photo_content_type(resp.headers().get("content-type").as_deref())?;
        let bytes = resp
            .binary()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(ProfilePhoto { content_type, bytes })
    }
}

// =============================================================================
// NATIVE TRANSPORT
// =============================================================================

#[cfg(not(feature = "hydrate"))]
impl HttpIdentityApi {
    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.credential.authorization() {
            Some(value) => builder.header(reqwest::header::AUTHORIZATION, value),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let resp = self
            .authorize(builder)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::rejected(status.as_u16(), &body))
    }
}

#[cfg(not(feature = "hydrate"))]
#[async_trait(?Send)]
impl IdentityApi for HttpIdentityApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let resp = self.send(self.http.post(self.url(LOGIN_PATH)).json(request)).await?;
        resp.json::<LoginResponse>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        self.send(self.http.post(self.url(REGISTER_PATH)).json(request))
            .await?;
        Ok(())
    }

    async fn verify_photo(&self, photo: &PhotoUpload) -> Result<Profile, ApiError> {
        let part = reqwest::multipart::Part::bytes(photo.bytes.clone())
            .file_name(photo.file_name.clone())
            .mime_str(&photo.content_type)
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("photo", part);
        let resp = self
            .send(self.http.post(self.url(VERIFY_PROFILE_PATH)).multipart(form))
            .await?;
        resp.json::<Profile>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn fetch_profile(&self, profile_id: &str) -> Result<Profile, ApiError> {
        let resp = self.send(self.http.get(self.url(&profile_path(profile_id)))).await?;
        resp.json::<Profile>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn fetch_profile_photo(&self, photo_id: &str) -> Result<ProfilePhoto, ApiError> {
        let resp = self.send(self.http.get(self.url(&profile_photo_path(photo_id)))).await?;
        let header = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let content_type = check_photo_content_type(header)?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(ProfilePhoto { content_type, bytes: bytes.to_vec() })
    }
}
