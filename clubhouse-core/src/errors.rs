use thiserror::Error;

/// Result alias for vault and store operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Result alias for decryption operations.
pub type DecryptResult<T> = core::result::Result<T, DecryptError>;

/// Canonical error surface for vault and store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{field} must not be empty")]
    EmptyComponent { field: &'static str },
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("crypto error: {0}")]
    Crypto(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("{entity} not found")]
    NotFound { entity: String },
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Rejection of master key material. Fatal at startup.
///
/// Neither variant carries the offending material; key bytes must never
/// reach a log line or an error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("master key must be 64 hex characters (32 bytes), got {chars} characters")]
    InvalidKeyLength { chars: usize },
    #[error("master key must be hex encoded")]
    InvalidKeyEncoding,
}

/// Decrypt failure. Callers treat both variants as "secret unavailable";
/// the split exists only for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecryptError {
    #[error("stored secret is not in nonce.tag.ciphertext form")]
    MalformedBlob,
    #[error("message authentication failed")]
    AuthenticationFailed,
}

/// Terminal outcome of the access gate for a rejected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateRejection {
    #[error("authentication required")]
    Unauthenticated,
    #[error("account is pending administrator approval")]
    PendingApproval,
    #[error("admin access required")]
    Forbidden,
}

impl GateRejection {
    /// Stable machine-readable code, where one exists for callers to branch on.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            GateRejection::PendingApproval => Some("NOT_APPROVED"),
            GateRejection::Unauthenticated | GateRejection::Forbidden => None,
        }
    }
}
