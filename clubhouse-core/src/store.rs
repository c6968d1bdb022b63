use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cipher::EncryptedSecret;
use crate::errors::{Error, Result};
use crate::principal::{Principal, Role};

/// Stored club account.
///
/// `secret` is always the at-rest encrypted form; plaintext never reaches
/// the store. The two secret timestamps are written independently: storing
/// touches `secret_updated_at`, deleting touches `secret_deleted_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<EncryptedSecret>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// New unapproved member with no stored secret.
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role: Role::Member,
            approved: false,
            secret: None,
            secret_updated_at: None,
            secret_deleted_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_approval(mut self, approved: bool) -> Self {
        self.approved = approved;
        self
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Identity the account authenticates as.
    pub fn principal(&self) -> Result<Principal> {
        Principal::new(self.id.clone(), self.role, self.approved)
    }
}

/// Club-wide content tallies for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentCounts {
    pub members: u64,
    pub events: u64,
    pub resources: u64,
}

/// Result of a read the caller is expected to survive.
///
/// Signatures returning `BestEffort` mark the operation as degradable:
/// the caller logs the error and carries on with the value absent,
/// instead of failing whatever it was doing.
pub type BestEffort<T> = core::result::Result<T, Error>;

/// Persistence seam for club accounts and dashboard tallies.
///
/// Update operations return the record as written so callers can answer
/// with fresh state without a second read.
#[async_trait]
pub trait ClubStore: Send + Sync {
    /// Fetch one account; `Ok(None)` when the id is unknown.
    async fn user_by_id(&self, id: &str) -> Result<Option<UserRecord>>;

    /// All accounts, newest first.
    async fn list_users(&self) -> Result<Vec<UserRecord>>;

    /// Replace (or with `None`, remove) an account's stored secret.
    async fn update_user_secret(
        &self,
        id: &str,
        secret: Option<EncryptedSecret>,
    ) -> Result<UserRecord>;

    /// Flip an account's approval flag.
    async fn update_user_approval(&self, id: &str, approved: bool) -> Result<UserRecord>;

    /// Current dashboard tallies. Best-effort: dashboards render without
    /// them.
    async fn content_counts(&self) -> BestEffort<ContentCounts>;
}

#[async_trait]
impl<T: ClubStore + ?Sized> ClubStore for Box<T> {
    async fn user_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        (**self).user_by_id(id).await
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        (**self).list_users().await
    }

    async fn update_user_secret(
        &self,
        id: &str,
        secret: Option<EncryptedSecret>,
    ) -> Result<UserRecord> {
        (**self).update_user_secret(id, secret).await
    }

    async fn update_user_approval(&self, id: &str, approved: bool) -> Result<UserRecord> {
        (**self).update_user_approval(id, approved).await
    }

    async fn content_counts(&self) -> BestEffort<ContentCounts> {
        (**self).content_counts().await
    }
}

#[async_trait]
impl<T: ClubStore + ?Sized> ClubStore for Arc<T> {
    async fn user_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        (**self).user_by_id(id).await
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        (**self).list_users().await
    }

    async fn update_user_secret(
        &self,
        id: &str,
        secret: Option<EncryptedSecret>,
    ) -> Result<UserRecord> {
        (**self).update_user_secret(id, secret).await
    }

    async fn update_user_approval(&self, id: &str, approved: bool) -> Result<UserRecord> {
        (**self).update_user_approval(id, approved).await
    }

    async fn content_counts(&self) -> BestEffort<ContentCounts> {
        (**self).content_counts().await
    }
}

fn user_not_found(id: &str) -> Error {
    Error::NotFound {
        entity: format!("user {id}"),
    }
}

/// In-process store for tests and single-node deployments.
#[derive(Default)]
pub struct MemoryClubStore {
    users: Mutex<HashMap<String, UserRecord>>,
    // (events, resources); the member tally is derived from the user map.
    tallies: Mutex<(u64, u64)>,
}

impl MemoryClubStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an account.
    pub fn insert_user(&self, user: UserRecord) {
        self.users.lock().unwrap().insert(user.id.clone(), user);
    }

    /// Set the event and resource tallies reported by `content_counts`.
    pub fn set_content_tallies(&self, events: u64, resources: u64) {
        *self.tallies.lock().unwrap() = (events, resources);
    }
}

#[async_trait]
impl ClubStore for MemoryClubStore {
    async fn user_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update_user_secret(
        &self,
        id: &str,
        secret: Option<EncryptedSecret>,
    ) -> Result<UserRecord> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(id).ok_or_else(|| user_not_found(id))?;
        match secret {
            Some(secret) => {
                user.secret = Some(secret);
                user.secret_updated_at = Some(Utc::now());
            }
            None => {
                user.secret = None;
                user.secret_deleted_at = Some(Utc::now());
            }
        }
        Ok(user.clone())
    }

    async fn update_user_approval(&self, id: &str, approved: bool) -> Result<UserRecord> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(id).ok_or_else(|| user_not_found(id))?;
        user.approved = approved;
        Ok(user.clone())
    }

    async fn content_counts(&self) -> BestEffort<ContentCounts> {
        let members = self.users.lock().unwrap().len() as u64;
        let (events, resources) = *self.tallies.lock().unwrap();
        Ok(ContentCounts {
            members,
            events,
            resources,
        })
    }
}
