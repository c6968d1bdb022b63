use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{DecryptError, DecryptResult, Error, Result};
use crate::keys::MasterKey;

/// Nonce length for AES-256-GCM.
pub const NONCE_LEN: usize = 12;

/// Authentication tag length produced by GCM.
pub const TAG_LEN: usize = 16;

/// At-rest form of a protected value: nonce, authentication tag, ciphertext.
///
/// Persisted as three hex segments joined by dots
/// (`nonce.tag.ciphertext`), which is the compatibility contract with
/// every blob already written by earlier deployments. Only
/// [`SecretCipher`] produces or consumes the triple; everything else
/// treats it as opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedSecret {
    nonce: [u8; NONCE_LEN],
    tag: [u8; TAG_LEN],
    ciphertext: Vec<u8>,
}

impl EncryptedSecret {
    /// Parse the dot-delimited hex wire form.
    ///
    /// Any shape violation (segment count, non-hex content, wrong nonce or
    /// tag length) is reported as [`DecryptError::MalformedBlob`] without
    /// touching the cipher.
    pub fn parse(input: &str) -> DecryptResult<Self> {
        let mut segments = input.split('.');
        let (Some(nonce), Some(tag), Some(ciphertext), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(DecryptError::MalformedBlob);
        };

        Ok(Self {
            nonce: decode_fixed(nonce)?,
            tag: decode_fixed(tag)?,
            ciphertext: hex::decode(ciphertext).map_err(|_| DecryptError::MalformedBlob)?,
        })
    }

    /// Nonce the value was sealed under.
    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    /// GCM authentication tag.
    pub fn tag(&self) -> &[u8; TAG_LEN] {
        &self.tag
    }

    /// Ciphertext body, without the tag.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}

fn decode_fixed<const N: usize>(segment: &str) -> DecryptResult<[u8; N]> {
    let bytes = hex::decode(segment).map_err(|_| DecryptError::MalformedBlob)?;
    bytes.try_into().map_err(|_| DecryptError::MalformedBlob)
}

impl fmt::Display for EncryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            hex::encode(self.nonce),
            hex::encode(self.tag),
            hex::encode(&self.ciphertext)
        )
    }
}

impl FromStr for EncryptedSecret {
    type Err = DecryptError;

    fn from_str(s: &str) -> DecryptResult<Self> {
        EncryptedSecret::parse(s)
    }
}

impl TryFrom<&str> for EncryptedSecret {
    type Error = DecryptError;

    fn try_from(value: &str) -> DecryptResult<Self> {
        EncryptedSecret::parse(value)
    }
}

impl TryFrom<String> for EncryptedSecret {
    type Error = DecryptError;

    fn try_from(value: String) -> DecryptResult<Self> {
        EncryptedSecret::parse(&value)
    }
}

impl Serialize for EncryptedSecret {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EncryptedSecret {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        EncryptedSecret::parse(&value).map_err(serde::de::Error::custom)
    }
}

/// Authenticated-encryption codec for per-user account secrets.
///
/// Stateless apart from the key; one instance serves the whole process.
/// Construction is infallible because [`MasterKey`] already guarantees
/// 32 bytes of validated material.
#[derive(Clone)]
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl SecretCipher {
    /// Build the codec from a validated master key.
    pub fn new(key: &MasterKey) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.bytes())),
        }
    }

    /// Seal a plaintext secret under a fresh random nonce.
    ///
    /// Two calls with the same input produce different blobs; callers must
    /// not expect deterministic output.
    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedSecret> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce);

        let sealed = self
            .cipher
            .encrypt(&Nonce::from(nonce), plaintext.as_bytes())
            .map_err(|_| Error::Crypto("failed to encrypt payload".into()))?;

        // aes-gcm appends the tag to the ciphertext; the wire format keeps
        // the two in separate segments.
        let boundary = sealed.len() - TAG_LEN;
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&sealed[boundary..]);

        Ok(EncryptedSecret {
            nonce,
            tag,
            ciphertext: sealed[..boundary].to_vec(),
        })
    }

    /// Open a stored blob, verifying its authentication tag.
    ///
    /// Tag mismatch yields [`DecryptError::AuthenticationFailed`] and no
    /// partial plaintext. Plaintext that is not valid UTF-8 is reported as
    /// a malformed blob; secrets are strings by contract.
    pub fn decrypt(&self, secret: &EncryptedSecret) -> DecryptResult<String> {
        let mut sealed = Vec::with_capacity(secret.ciphertext.len() + TAG_LEN);
        sealed.extend_from_slice(&secret.ciphertext);
        sealed.extend_from_slice(&secret.tag);

        let plaintext = self
            .cipher
            .decrypt(&Nonce::from(secret.nonce), sealed.as_slice())
            .map_err(|_| DecryptError::AuthenticationFailed)?;

        String::from_utf8(plaintext).map_err(|_| DecryptError::MalformedBlob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cipher_for(material: char) -> SecretCipher {
        let key = MasterKey::from_hex(&material.to_string().repeat(64)).expect("test key");
        SecretCipher::new(&key)
    }

    fn flip_hex_char(rendered: &str, segment: usize) -> String {
        let mut segments: Vec<String> = rendered.split('.').map(str::to_string).collect();
        let target = &mut segments[segment];
        let first = target.remove(0);
        let replacement = if first == '0' { '1' } else { '0' };
        target.insert(0, replacement);
        segments.join(".")
    }

    #[test]
    fn roundtrip_preserves_plaintext() {
        let cipher = cipher_for('a');
        let sealed = cipher.encrypt("sk-test-123").expect("encrypt");
        assert_eq!(cipher.decrypt(&sealed).expect("decrypt"), "sk-test-123");
    }

    #[test]
    fn wire_form_is_three_hex_segments() {
        let cipher = cipher_for('a');
        let sealed = cipher.encrypt("sk-test-123").expect("encrypt");
        let rendered = sealed.to_string();

        let segments: Vec<&str> = rendered.split('.').collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].len(), 2 * NONCE_LEN);
        assert_eq!(segments[1].len(), 2 * TAG_LEN);
        assert!(!segments[2].is_empty());
        for segment in &segments {
            assert!(segment.chars().all(|c| c.is_ascii_hexdigit()));
        }
        assert!(!rendered.contains("sk-test-123"));

        let reparsed = EncryptedSecret::parse(&rendered).expect("parse");
        assert_eq!(cipher.decrypt(&reparsed).expect("decrypt"), "sk-test-123");
    }

    #[test]
    fn encryption_is_nondeterministic() {
        let cipher = cipher_for('a');
        let first = cipher.encrypt("same input").expect("encrypt");
        let second = cipher.encrypt("same input").expect("encrypt");
        assert_ne!(first, second);
        assert_ne!(first.nonce(), second.nonce());
    }

    #[test]
    fn tampered_tag_fails_authentication() {
        let cipher = cipher_for('a');
        let sealed = cipher.encrypt("critical").expect("encrypt");

        let tampered = flip_hex_char(&sealed.to_string(), 1);
        let tampered = EncryptedSecret::parse(&tampered).expect("shape still valid");
        assert_eq!(
            cipher.decrypt(&tampered),
            Err(DecryptError::AuthenticationFailed)
        );
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let cipher = cipher_for('a');
        let sealed = cipher.encrypt("critical").expect("encrypt");

        let tampered = flip_hex_char(&sealed.to_string(), 2);
        let tampered = EncryptedSecret::parse(&tampered).expect("shape still valid");
        assert_eq!(
            cipher.decrypt(&tampered),
            Err(DecryptError::AuthenticationFailed)
        );
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let sealed = cipher_for('a').encrypt("critical").expect("encrypt");
        assert_eq!(
            cipher_for('b').decrypt(&sealed),
            Err(DecryptError::AuthenticationFailed)
        );
    }

    #[test]
    fn forged_blob_with_valid_shape_fails_authentication() {
        let forged = format!("{}.{}.{}", "00".repeat(12), "00".repeat(16), "deadbeef");
        let forged = EncryptedSecret::parse(&forged).expect("shape valid");
        assert_eq!(
            cipher_for('a').decrypt(&forged),
            Err(DecryptError::AuthenticationFailed)
        );
    }

    #[test]
    fn malformed_shapes_are_rejected_before_decryption() {
        let wrong_nonce_len = format!("{}.{}.{}", "aa".repeat(11), "bb".repeat(16), "cc");
        let wrong_tag_len = format!("{}.{}.{}", "aa".repeat(12), "bb".repeat(15), "cc");
        let non_hex_nonce = format!("{}.{}.{}", "zz".repeat(12), "bb".repeat(16), "cc");

        let cases = [
            "",
            "plain-api-key",
            "aabb.ccdd",
            "aa.bb.cc.dd",
            wrong_nonce_len.as_str(),
            wrong_tag_len.as_str(),
            non_hex_nonce.as_str(),
        ];
        for case in cases {
            assert_eq!(
                EncryptedSecret::parse(case),
                Err(DecryptError::MalformedBlob),
                "expected malformed: {case:?}"
            );
        }
    }

    #[test]
    fn serializes_as_wire_string() {
        let cipher = cipher_for('a');
        let sealed = cipher.encrypt("sk-test-123").expect("encrypt");

        let value = serde_json::to_value(&sealed).expect("serialize");
        assert_eq!(value, json!(sealed.to_string()));

        let restored: EncryptedSecret = serde_json::from_value(value).expect("deserialize");
        assert_eq!(restored, sealed);

        let malformed = serde_json::from_value::<EncryptedSecret>(json!("aa.bb"));
        assert!(malformed.is_err());
    }
}
