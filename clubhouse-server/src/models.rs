use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clubhouse_core::principal::Role;
use clubhouse_core::store::{ContentCounts, UserRecord};

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSecretRequest {
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedResponse {
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretStatusResponse {
    pub present: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalRequest {
    pub approved: bool,
}

/// Admin-facing view of an account. Everything except the secret itself;
/// presence and timestamps only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub approved: bool,
    pub has_secret: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserSummary {
    fn from(value: UserRecord) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            role: value.role,
            approved: value.approved,
            has_secret: value.secret.is_some(),
            secret_updated_at: value.secret_updated_at,
            secret_deleted_at: value.secret_deleted_at,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<UserSummary>,
}

/// Dashboard stats. `content` is `null` when the tally read failed;
/// `users` and `pending` come from the primary listing and never degrade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub users: u64,
    pub pending: u64,
    pub content: Option<ContentCounts>,
}
