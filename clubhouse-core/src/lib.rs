//! Core primitives for the clubhouse backend: the secret codec, the
//! encrypt-before-store vault, and the layered access gate.

pub mod cipher;
pub mod errors;
pub mod gate;
pub mod keys;
pub mod principal;
pub mod session;
pub mod store;
pub mod vault;

pub use cipher::{EncryptedSecret, SecretCipher, NONCE_LEN, TAG_LEN};
pub use errors::{DecryptError, DecryptResult, Error, GateRejection, KeyError, Result};
pub use gate::AccessGate;
pub use keys::{MasterKey, MASTER_KEY_HEX_LEN, MASTER_KEY_LEN};
pub use principal::{Principal, Role};
pub use session::{MemorySessions, SessionProvider};
pub use store::{BestEffort, ClubStore, ContentCounts, MemoryClubStore, UserRecord};
pub use vault::SecretVault;
