use std::fmt;
use std::str::FromStr;

use crate::errors::KeyError;

/// Raw master key length in bytes (AES-256).
pub const MASTER_KEY_LEN: usize = 32;

/// Length of the hex encoding of the master key.
pub const MASTER_KEY_HEX_LEN: usize = 2 * MASTER_KEY_LEN;

/// Process-wide symmetric key, loaded once at startup and immutable for the
/// process lifetime.
///
/// The only fallible path into this type is [`MasterKey::from_hex`], so any
/// cipher built from a `MasterKey` holds exactly 32 validated bytes. The
/// `Debug` impl is redacted; the key must never appear in logs or responses.
#[derive(Clone, PartialEq, Eq)]
pub struct MasterKey([u8; MASTER_KEY_LEN]);

impl MasterKey {
    /// Decode key material from its 64-character hex form.
    pub fn from_hex(material: &str) -> Result<Self, KeyError> {
        let material = material.trim();
        if material.len() != MASTER_KEY_HEX_LEN {
            return Err(KeyError::InvalidKeyLength {
                chars: material.len(),
            });
        }

        let decoded = hex::decode(material).map_err(|_| KeyError::InvalidKeyEncoding)?;
        let mut bytes = [0u8; MASTER_KEY_LEN];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }

    /// Construct directly from raw bytes.
    pub fn from_bytes(bytes: [u8; MASTER_KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub(crate) fn bytes(&self) -> &[u8; MASTER_KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

impl FromStr for MasterKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MasterKey::from_hex(s)
    }
}
