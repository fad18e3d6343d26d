//! Shared fixtures for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::net::api::IdentityApi;
use crate::net::credential::CredentialHeader;
use crate::net::types::{ApiError, LoginRequest, LoginResponse, PhotoUpload, Profile, ProfilePhoto, RegisterRequest};
use crate::state::auth::AuthMachine;
use crate::util::clock::now_unix_secs;
use crate::util::session::SessionStore;
use crate::util::storage::{CredentialStorage, StorageError};

pub const TOKEN_KEY: &str = "accessToken";

// =============================================================================
// TOKENS
// =============================================================================

/// Unsigned JWT-shaped token with the given payload.
pub fn mint_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub fn token_expiring_at(exp: i64) -> String {
    mint_token(&serde_json::json!({ "sub": "a@b.com", "exp": exp }))
}

/// Token valid for another hour by the process clock.
pub fn fresh_token() -> String {
    token_expiring_at(now_unix_secs() + 3600)
}

// =============================================================================
// STORAGE
// =============================================================================

/// In-memory storage that counts reads and can be told to fail.
#[derive(Default)]
pub struct TestStorage {
    entries: Mutex<HashMap<String, String>>,
    reads: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl TestStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(key: &str, token: &str) -> Self {
        let storage = Self::new();
        storage.entries.lock().unwrap().insert(key.to_owned(), token.to_owned());
        storage
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Read without counting or failing.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

impl CredentialStorage for TestStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Access("read blocked".to_owned()));
        }
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Access("quota exceeded".to_owned()));
        }
        self.entries.lock().unwrap().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Access("remove blocked".to_owned()));
        }
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

// =============================================================================
// IDENTITY API
// =============================================================================

/// Scripted identity API. Login results are consumed in order; once the
/// script runs out every login is rejected.
#[derive(Default)]
pub struct MockApi {
    logins: Mutex<VecDeque<Result<LoginResponse, ApiError>>>,
    login_calls: AtomicUsize,
    pub seen_requests: Mutex<Vec<LoginRequest>>,
    before_login_returns: Mutex<Option<Box<dyn FnOnce() + Send>>>,
    pub registrations: Mutex<Vec<RegisterRequest>>,
    register_result: Mutex<Option<ApiError>>,
    profile: Mutex<Option<Result<Profile, ApiError>>>,
    photo: Mutex<Option<Result<ProfilePhoto, ApiError>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepting(token: &str) -> Self {
        let api = Self::new();
        api.push_login(Ok(LoginResponse { access_token: token.to_owned() }));
        api
    }

    pub fn rejecting(status: u16, detail: &str) -> Self {
        let api = Self::new();
        api.push_login(Err(ApiError::Rejected { status, detail: detail.to_owned() }));
        api
    }

    pub fn push_login(&self, result: Result<LoginResponse, ApiError>) {
        self.logins.lock().unwrap().push_back(result);
    }

    /// Run `hook` inside the next login call, before it resolves.
    pub fn on_next_login(&self, hook: impl FnOnce() + Send + 'static) {
        *self.before_login_returns.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn fail_register(&self, error: ApiError) {
        *self.register_result.lock().unwrap() = Some(error);
    }

    /// Answer both `verify_photo` and `fetch_profile` with `result`.
    pub fn serve_profile(&self, result: Result<Profile, ApiError>) {
        *self.profile.lock().unwrap() = Some(result);
    }

    pub fn serve_photo(&self, result: Result<ProfilePhoto, ApiError>) {
        *self.photo.lock().unwrap() = Some(result);
    }
}

fn not_scripted<T>() -> Result<T, ApiError> {
    Err(ApiError::Transport("not scripted".to_owned()))
}

#[async_trait(?Send)]
impl IdentityApi for MockApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_requests.lock().unwrap().push(request.clone());
        let hook = self.before_login_returns.lock().unwrap().take();
        if let Some(hook) = hook {
            hook();
        }
        self.logins
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::rejected(401, r#"{"detail":"Invalid email or password"}"#)))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        self.registrations.lock().unwrap().push(request.clone());
        match self.register_result.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn verify_photo(&self, _photo: &PhotoUpload) -> Result<Profile, ApiError> {
        self.profile.lock().unwrap().clone().unwrap_or_else(not_scripted)
    }

    async fn fetch_profile(&self, _profile_id: &str) -> Result<Profile, ApiError> {
        self.profile.lock().unwrap().clone().unwrap_or_else(not_scripted)
    }

    async fn fetch_profile_photo(&self, _photo_id: &str) -> Result<ProfilePhoto, ApiError> {
        self.photo.lock().unwrap().clone().unwrap_or_else(not_scripted)
    }
}

// =============================================================================
// MACHINE
// =============================================================================

/// Everything a state-machine test needs to poke at.
pub struct Harness {
    pub machine: AuthMachine,
    pub api: Arc<MockApi>,
    pub storage: Arc<TestStorage>,
    pub header: CredentialHeader,
}

impl Harness {
    pub fn new(api: MockApi, storage: TestStorage) -> Self {
        let api = Arc::new(api);
        let storage = Arc::new(storage);
        let header = CredentialHeader::new();
        let session = SessionStore::new(storage.clone(), TOKEN_KEY, header.clone());
        let machine = AuthMachine::new(api.clone(), session);
        Self { machine, api, storage, header }
    }

    /// Harness over empty storage and an API that rejects everything.
    pub fn anonymous() -> Self {
        Self::new(MockApi::new(), TestStorage::new())
    }

    pub fn stored_token(&self) -> Option<String> {
        self.storage.peek(TOKEN_KEY)
    }
}
