//! Encryption of stored password values.
//!
//! Stored form is URL-safe base64 (no padding) of `nonce (12 bytes) || ciphertext`.
//! The owner's id is bound as associated data.

use base64::{
    Engine,
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
};
use chacha20poly1305::{
    ChaCha20Poly1305, Key, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use rand::{RngCore, rngs::OsRng};
use std::fmt;
use tracing::error;
use uuid::Uuid;

pub const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Shown in place of a value that cannot be decrypted.
pub const DECRYPT_PLACEHOLDER: &str = "Error decrypting password";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherError {
    InvalidKey,
    Rng,
    Encrypt,
    Decrypt,
    Encoding,
}

impl fmt::Display for CipherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::InvalidKey => "encryption key must be 32 bytes of URL-safe base64",
            Self::Rng => "random number generator failure",
            Self::Encrypt => "encryption failure",
            Self::Decrypt => "decryption failure",
            Self::Encoding => "stored value is not valid ciphertext",
        };
        f.write_str(message)
    }
}

impl std::error::Error for CipherError {}

#[derive(Clone)]
pub struct SecretCipher {
    key: [u8; KEY_LEN],
}

impl fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl SecretCipher {
    #[must_use]
    pub const fn new(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Accepts padded or unpadded URL-safe base64.
    ///
    /// # Errors
    /// Returns `CipherError::InvalidKey` if the input does not decode to 32 bytes.
    pub fn from_base64(encoded: &str) -> Result<Self, CipherError> {
        let encoded = encoded.trim();
        let bytes = URL_SAFE
            .decode(encoded)
            .or_else(|_| URL_SAFE_NO_PAD.decode(encoded))
            .map_err(|_| CipherError::InvalidKey)?;
        let key = <[u8; KEY_LEN]>::try_from(bytes.as_slice()).map_err(|_| CipherError::InvalidKey)?;
        Ok(Self::new(key))
    }

    /// A fresh random key, URL-safe base64 with padding.
    ///
    /// # Errors
    /// Returns `CipherError::Rng` if the OS RNG fails.
    pub fn generate_key() -> Result<String, CipherError> {
        let mut key = [0u8; KEY_LEN];
        OsRng
            .try_fill_bytes(&mut key)
            .map_err(|_| CipherError::Rng)?;
        Ok(URL_SAFE.encode(key))
    }

    /// # Errors
    /// Returns an error if the RNG or the AEAD fails.
    #[allow(deprecated)]
    pub fn encrypt(&self, owner: Uuid, plaintext: &str) -> Result<String, CipherError> {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.key));

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce_bytes)
            .map_err(|_| CipherError::Rng)?;

        let aad = construct_aad(owner);
        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: &aad,
                },
            )
            .map_err(|_| CipherError::Encrypt)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    /// # Errors
    /// Returns an error if the stored value is malformed, was sealed under another
    /// key or owner, or is not UTF-8.
    #[allow(deprecated)]
    pub fn decrypt(&self, owner: Uuid, stored: &str) -> Result<String, CipherError> {
        let sealed = URL_SAFE_NO_PAD
            .decode(stored)
            .map_err(|_| CipherError::Encoding)?;
        if sealed.len() <= NONCE_LEN {
            return Err(CipherError::Encoding);
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.key));

        let aad = construct_aad(owner);
        let plaintext = cipher
            .decrypt(
                Nonce::from_slice(nonce_bytes),
                Payload {
                    msg: ciphertext,
                    aad: &aad,
                },
            )
            .map_err(|_| CipherError::Decrypt)?;

        String::from_utf8(plaintext).map_err(|_| CipherError::Encoding)
    }

    /// Decrypt for display; failures are logged and replaced by [`DECRYPT_PLACEHOLDER`].
    #[must_use]
    pub fn reveal(&self, owner: Uuid, record_id: Uuid, stored: &str) -> String {
        match self.decrypt(owner, stored) {
            Ok(plaintext) => plaintext,
            Err(err) => {
                error!(%record_id, "Error decrypting password: {err}");
                DECRYPT_PLACEHOLDER.to_string()
            }
        }
    }
}

fn construct_aad(owner: Uuid) -> Vec<u8> {
    format!("mypass-secret:v1|{owner}").into_bytes()
}
