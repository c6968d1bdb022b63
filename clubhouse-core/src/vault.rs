use tracing::warn;

use crate::cipher::SecretCipher;
use crate::errors::{Error, Result};
use crate::store::{ClubStore, UserRecord};

/// Encrypt-before-store facade over a [`ClubStore`].
///
/// All plaintext handling happens inside this type: callers hand in and
/// receive plaintext, the store only ever sees [`EncryptedSecret`]
/// blobs. Reveal failures (malformed blob, failed authentication) are
/// collapsed into `None` so callers cannot learn why a stored value was
/// unreadable.
///
/// [`EncryptedSecret`]: crate::cipher::EncryptedSecret
pub struct SecretVault<S> {
    cipher: SecretCipher,
    store: S,
}

impl<S: ClubStore> SecretVault<S> {
    pub fn new(cipher: SecretCipher, store: S) -> Self {
        Self { cipher, store }
    }

    /// Encrypt a plaintext secret and persist it for the user.
    ///
    /// The value is trimmed first; storing an empty secret is an error,
    /// deletion is a separate operation.
    pub async fn store_secret(&self, user_id: &str, plaintext: &str) -> Result<UserRecord> {
        let plaintext = plaintext.trim();
        if plaintext.is_empty() {
            return Err(Error::EmptyComponent { field: "secret" });
        }
        let sealed = self.cipher.encrypt(plaintext)?;
        self.store.update_user_secret(user_id, Some(sealed)).await
    }

    /// Whether the user currently has a stored secret.
    ///
    /// Unknown users simply have none; presence is the only fact exposed.
    pub async fn has_secret(&self, user_id: &str) -> Result<bool> {
        let user = self.store.user_by_id(user_id).await?;
        Ok(user.is_some_and(|user| user.has_secret()))
    }

    /// Remove the user's stored secret.
    pub async fn delete_secret(&self, user_id: &str) -> Result<UserRecord> {
        self.store.update_user_secret(user_id, None).await
    }

    /// Decrypt the user's stored secret for use by an integration.
    ///
    /// `Ok(None)` covers the unknown user, the user without a secret, and
    /// the blob that failed to open; only the last is logged, since it
    /// means stored data no longer matches the master key.
    pub async fn reveal_secret(&self, user_id: &str) -> Result<Option<String>> {
        let Some(user) = self.store.user_by_id(user_id).await? else {
            return Ok(None);
        };
        let Some(sealed) = user.secret else {
            return Ok(None);
        };

        match self.cipher.decrypt(&sealed) {
            Ok(plaintext) => Ok(Some(plaintext)),
            Err(err) => {
                warn!(
                    target = "audit",
                    action = "secret.reveal_failed",
                    user = %user_id,
                    error = %err,
                    "stored secret could not be opened"
                );
                Ok(None)
            }
        }
    }
}
