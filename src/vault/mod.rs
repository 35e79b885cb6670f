//! Vault domain: stored record types, password generation, encryption of
//! password values and expiration tracking.

pub mod cipher;
pub mod events;
pub mod expiration;
pub mod generator;
pub mod models;

pub use cipher::{CipherError, DECRYPT_PLACEHOLDER, SecretCipher};
pub use events::{RecordKind, VaultEvent};
pub use expiration::{Expiry, ExpiryKind, Notice};
pub use generator::Complexity;
