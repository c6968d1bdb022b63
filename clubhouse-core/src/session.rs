use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::principal::Principal;

/// Source of truth for session tokens.
///
/// Returns `None` for every failure mode (unknown token, expired session,
/// revoked account) so callers cannot distinguish them; the uniform answer
/// keeps token probing uninformative.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Resolve a bearer token to the principal it was issued for.
    async fn validate_session(&self, token: &str) -> Option<Principal>;
}

#[async_trait]
impl<T: SessionProvider + ?Sized> SessionProvider for Box<T> {
    async fn validate_session(&self, token: &str) -> Option<Principal> {
        (**self).validate_session(token).await
    }
}

#[async_trait]
impl<T: SessionProvider + ?Sized> SessionProvider for Arc<T> {
    async fn validate_session(&self, token: &str) -> Option<Principal> {
        (**self).validate_session(token).await
    }
}

/// In-process session table for tests and single-node deployments.
#[derive(Default)]
pub struct MemorySessions {
    sessions: Mutex<HashMap<String, Principal>>,
}

impl MemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for a principal, replacing any previous holder.
    pub fn insert(&self, token: impl Into<String>, principal: Principal) {
        self.sessions
            .lock()
            .unwrap()
            .insert(token.into(), principal);
    }

    /// Drop a token; validation of it returns `None` afterwards.
    pub fn revoke(&self, token: &str) {
        self.sessions.lock().unwrap().remove(token);
    }
}

#[async_trait]
impl SessionProvider for MemorySessions {
    async fn validate_session(&self, token: &str) -> Option<Principal> {
        self.sessions.lock().unwrap().get(token).cloned()
    }
}
