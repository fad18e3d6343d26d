//! `HttpIdentityApi` and `AuthMachine` against a stub identity server.

use std::sync::Arc;

use axum::Json;
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};

use lookout::net::api::{HttpIdentityApi, IdentityApi};
use lookout::net::credential::CredentialHeader;
use lookout::net::types::{ApiError, LoginRequest, PhotoUpload, RegisterRequest};
use lookout::state::auth::{AuthMachine, AuthState};
use lookout::util::clock::now_unix_secs;
use lookout::util::session::SessionStore;
use lookout::util::storage::{CredentialStorage, MemoryStorage};

const KEY: &str = "accessToken";

fn valid_token() -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": "a@b.com", "exp": now_unix_secs() + 3600 }).to_string());
    format!("{header}.{payload}.c2ln")
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn authorized(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {token}"))
}

fn profile_json(id: u64) -> Value {
    json!({
        "id": id,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "age": 36,
        "email": "ada@example.test",
        "photo_id": "p-17",
    })
}

/// Spawn the stub server and return its base URL.
async fn spawn_stub(token: String) -> String {
    let login_token = token.clone();
    let profile_token = token.clone();
    let photo_token = token;

    let app = axum::Router::new()
        .route(
            "/admins/login",
            post(move |Json(body): Json<Value>| {
                let token = login_token.clone();
                async move {
                    if body["password"] == "secret" {
                        Json(json!({ "access_token": token, "token_type": "bearer" })).into_response()
                    } else {
                        detail(StatusCode::UNAUTHORIZED, "Invalid email or password")
                    }
                }
            }),
        )
        .route(
            "/admins/register",
            post(|Json(body): Json<Value>| async move {
                if body["username"] == "taken" {
                    detail(StatusCode::BAD_REQUEST, "Username already registered")
                } else {
                    (StatusCode::CREATED, Json(json!({ "id": 1 }))).into_response()
                }
            }),
        )
        .route(
            "/profiles/profile/{id}",
            get(move |Path(id): Path<u64>, headers: HeaderMap| {
                let token = profile_token.clone();
                async move {
                    if authorized(&headers, &token) {
                        Json(profile_json(id)).into_response()
                    } else {
                        detail(StatusCode::UNAUTHORIZED, "Not authenticated")
                    }
                }
            }),
        )
        .route(
            "/profiles/profile-photo/{id}",
            get(|Path(id): Path<String>| async move {
                if id == "p-17" {
                    ([(header::CONTENT_TYPE, "image/jpeg")], b"jpg".to_vec()).into_response()
                } else {
                    detail(StatusCode::NOT_FOUND, "Photo not found")
                }
            }),
        )
        .route(
            "/profiles/verify-profile",
            post(move |headers: HeaderMap| {
                let token = photo_token.clone();
                async move {
                    let multipart = headers
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .is_some_and(|v| v.starts_with("multipart/form-data"));
                    if !authorized(&headers, &token) {
                        detail(StatusCode::UNAUTHORIZED, "Not authenticated")
                    } else if !multipart {
                        detail(StatusCode::UNPROCESSABLE_ENTITY, "photo is required")
                    } else {
                        Json(profile_json(17)).into_response()
                    }
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

struct Client {
    api: Arc<HttpIdentityApi>,
    header: CredentialHeader,
    storage: Arc<MemoryStorage>,
    session: SessionStore,
}

fn client(base_url: &str, storage: MemoryStorage) -> Client {
    let header = CredentialHeader::new();
    let api = Arc::new(HttpIdentityApi::new(base_url, header.clone()));
    let storage = Arc::new(storage);
    let session = SessionStore::new(storage.clone(), KEY, header.clone());
    Client { api, header, storage, session }
}

// =============================================================
// Credential attachment
// =============================================================

#[tokio::test]
async fn requests_carry_bearer_only_after_persist() {
    let token = valid_token();
    let base = spawn_stub(token.clone()).await;
    let c = client(&base, MemoryStorage::new());

    let before = c.api.fetch_profile("17").await.unwrap_err();
    assert_eq!(before.status(), Some(401));

    c.session.persist(&token).unwrap();
    let profile = c.api.fetch_profile("17").await.unwrap();
    assert_eq!(profile.id, "17");
    assert_eq!(profile.photo_id.as_deref(), Some("p-17"));

    c.session.clear().unwrap();
    assert_eq!(c.header.authorization(), None);
    let after = c.api.fetch_profile("17").await.unwrap_err();
    assert_eq!(after, ApiError::Rejected { status: 401, detail: "Not authenticated".to_owned() });
}

// =============================================================
// Identity API
// =============================================================

#[tokio::test]
async fn login_returns_access_token() {
    let token = valid_token();
    let base = spawn_stub(token.clone()).await;
    let c = client(&base, MemoryStorage::new());

    let request = LoginRequest { email: "a@b.com".to_owned(), password: "secret".to_owned() };
    let response = c.api.login(&request).await.unwrap();

    assert_eq!(response.access_token, token);
}

#[tokio::test]
async fn register_surfaces_server_detail() {
    let base = spawn_stub(valid_token()).await;
    let c = client(&base, MemoryStorage::new());

    let ok = RegisterRequest { email: "a@b.com".to_owned(), username: "agent".to_owned(), password: "secret".to_owned() };
    c.api.register(&ok).await.unwrap();

    let taken = RegisterRequest { username: "taken".to_owned(), ..ok };
    let err = c.api.register(&taken).await.unwrap_err();
    assert_eq!(err.to_string(), "Username already registered");
}

#[tokio::test]
async fn photo_lookup_and_profile_photo() {
    let token = valid_token();
    let base = spawn_stub(token.clone()).await;
    let c = client(&base, MemoryStorage::new());
    c.session.persist(&token).unwrap();

    let upload = PhotoUpload { file_name: "face.jpg".to_owned(), content_type: "image/jpeg".to_owned(), bytes: vec![0xff, 0xd8] };
    let profile = c.api.verify_photo(&upload).await.unwrap();
    assert_eq!(profile.id, "17");

    let photo = c.api.fetch_profile_photo("p-17").await.unwrap();
    assert_eq!(photo.content_type, "image/jpeg");
    assert_eq!(photo.bytes, b"jpg");

    let missing = c.api.fetch_profile_photo("p-0").await.unwrap_err();
    assert_eq!(missing.status(), Some(404));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let c = client(&format!("http://{addr}"), MemoryStorage::new());

    let request = LoginRequest { email: "a@b.com".to_owned(), password: "secret".to_owned() };
    let err = c.api.login(&request).await.unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
}

// =============================================================
// Auth machine over the wire
// =============================================================

#[tokio::test]
async fn machine_login_persists_and_survives_reload() {
    let token = valid_token();
    let base = spawn_stub(token.clone()).await;
    let c = client(&base, MemoryStorage::new());
    let machine = AuthMachine::new(c.api.clone(), c.session.clone());
    machine.initialize().await;
    assert_eq!(machine.state(), AuthState { is_authenticated: false, is_initialized: true });

    machine.login("a@b.com", "secret").await.unwrap();

    assert!(machine.state().is_authenticated);
    assert_eq!(c.storage.get(KEY).unwrap(), Some(token.clone()));
    assert!(c.api.fetch_profile("17").await.is_ok());

    let reloaded = client(&base, MemoryStorage::with_entry(KEY, &token));
    let machine = AuthMachine::new(reloaded.api.clone(), reloaded.session.clone());
    machine.initialize().await;
    assert_eq!(machine.state(), AuthState { is_authenticated: true, is_initialized: true });
    assert!(reloaded.api.fetch_profile("17").await.is_ok());
}

#[tokio::test]
async fn machine_login_rejection_carries_detail() {
    let base = spawn_stub(valid_token()).await;
    let c = client(&base, MemoryStorage::new());
    let machine = AuthMachine::new(c.api.clone(), c.session.clone());
    machine.initialize().await;

    let err = machine.login("a@b.com", "wrong").await.unwrap_err();

    assert_eq!(err.reason(), "Invalid email or password");
    assert_eq!(machine.state(), AuthState { is_authenticated: false, is_initialized: true });
    assert_eq!(c.storage.get(KEY).unwrap(), None);
}
