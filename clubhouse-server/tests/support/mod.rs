#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use clubhouse_core::cipher::{EncryptedSecret, SecretCipher};
use clubhouse_core::errors::{Error, Result};
use clubhouse_core::gate::AccessGate;
use clubhouse_core::keys::MasterKey;
use clubhouse_core::principal::Role;
use clubhouse_core::session::{MemorySessions, SessionProvider};
use clubhouse_core::store::{
    BestEffort, ClubStore, ContentCounts, MemoryClubStore, UserRecord,
};
use clubhouse_core::vault::SecretVault;
use clubhouse_server::AppState;

pub fn test_key() -> MasterKey {
    MasterKey::from_hex(&"a".repeat(64)).expect("test key")
}

pub fn test_cipher() -> SecretCipher {
    SecretCipher::new(&test_key())
}

/// Router plus handles to the backends behind it, so tests can seed
/// accounts and sessions and inspect what was persisted.
pub struct TestContext {
    pub sessions: Arc<MemorySessions>,
    pub store: Arc<MemoryClubStore>,
    pub router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let sessions = Arc::new(MemorySessions::new());
        let store = Arc::new(MemoryClubStore::new());
        let router = build_router(
            Arc::clone(&sessions),
            Arc::clone(&store) as Arc<dyn ClubStore>,
        );
        Self {
            sessions,
            store,
            router,
        }
    }

    /// Same wiring, but the store's tally read always fails.
    pub fn with_failing_counts() -> Self {
        let sessions = Arc::new(MemorySessions::new());
        let store = Arc::new(MemoryClubStore::new());
        let failing = Arc::new(FailingCountsStore {
            inner: Arc::clone(&store),
        });
        let router = build_router(Arc::clone(&sessions), failing as Arc<dyn ClubStore>);
        Self {
            sessions,
            store,
            router,
        }
    }

    pub fn seed_user(&self, user: UserRecord) {
        self.store.insert_user(user);
    }

    pub fn login(&self, user: &UserRecord, token: &str) {
        self.sessions.insert(token, user.principal().expect("principal"));
    }

    pub fn seed_member(&self, id: &str, approved: bool, token: &str) -> UserRecord {
        let user = UserRecord::new(id, format!("Member {id}"), format!("{id}@club.test"))
            .with_approval(approved);
        self.seed_user(user.clone());
        self.login(&user, token);
        user
    }

    pub fn seed_admin(&self, id: &str, token: &str) -> UserRecord {
        let user = UserRecord::new(id, format!("Admin {id}"), format!("{id}@club.test"))
            .with_role(Role::Admin)
            .with_approval(true);
        self.seed_user(user.clone());
        self.login(&user, token);
        user
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.expect("request")
    }
}

fn build_router(sessions: Arc<MemorySessions>, store: Arc<dyn ClubStore>) -> Router {
    let sessions: Arc<dyn SessionProvider> = sessions;
    let gate = Arc::new(AccessGate::new(sessions));
    let vault = Arc::new(SecretVault::new(test_cipher(), Arc::clone(&store)));
    clubhouse_server::http::router(AppState::new(gate, vault, store))
}

pub fn empty_request(method: &str, path: &str, token: Option<&str>) -> Request<Body> {
    request_builder(method, path, token)
        .body(Body::empty())
        .expect("request")
}

pub fn json_request(method: &str, path: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    request_builder(method, path, token)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn request_builder(method: &str, path: &str, token: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Fetch the at-rest blob for a user straight from the store.
pub async fn stored_blob(store: &MemoryClubStore, id: &str) -> Option<EncryptedSecret> {
    store
        .user_by_id(id)
        .await
        .expect("fetch")
        .expect("user present")
        .secret
}

/// Store whose dashboard tallies are permanently unavailable; account
/// operations still hit the wrapped store.
pub struct FailingCountsStore {
    pub inner: Arc<MemoryClubStore>,
}

#[async_trait]
impl ClubStore for FailingCountsStore {
    async fn user_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        self.inner.user_by_id(id).await
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        self.inner.list_users().await
    }

    async fn update_user_secret(
        &self,
        id: &str,
        secret: Option<EncryptedSecret>,
    ) -> Result<UserRecord> {
        self.inner.update_user_secret(id, secret).await
    }

    async fn update_user_approval(&self, id: &str, approved: bool) -> Result<UserRecord> {
        self.inner.update_user_approval(id, approved).await
    }

    async fn content_counts(&self) -> BestEffort<ContentCounts> {
        Err(Error::Storage("tally backend offline".to_string()))
    }
}
