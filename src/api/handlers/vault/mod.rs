//! Vault endpoints: saved passwords, logins, credit cards, identities and notes.
//!
//! Every handler authenticates through the session guard first and then scopes
//! all reads and writes by the caller's user id. Records owned by someone else
//! answer `404`, the same as missing ones.
//!
//! Flow Overview:
//! 1) Authenticate and refresh the session.
//! 2) Validate the payload.
//! 3) Encrypt password values, then write through `storage`. Saves of credit
//!    cards and identities run the expiration rule in the same transaction.
//! 4) Record the resulting [`VaultEvent`](crate::vault::VaultEvent)s.

pub(crate) mod credit_cards;
pub(crate) mod home;
pub(crate) mod identities;
pub(crate) mod logins;
pub(crate) mod notes;
pub(crate) mod passwords;
mod storage;
pub(crate) mod types;

use chrono::Utc;
use url::Url;

use crate::vault::{SecretCipher, expiration::DEFAULT_WINDOW_DAYS};
use storage::{ExpirationClock, VaultError};

const NAME_MAX: usize = 100;
const CARD_NUMBER_MIN: usize = 12;
const CARD_NUMBER_MAX: usize = 19;

/// Shared state for vault handlers.
#[derive(Debug)]
pub struct VaultState {
    cipher: SecretCipher,
    expiration_window_days: u32,
}

impl VaultState {
    #[must_use]
    pub fn new(cipher: SecretCipher) -> Self {
        Self {
            cipher,
            expiration_window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    #[must_use]
    pub fn with_expiration_window_days(mut self, days: u32) -> Self {
        self.expiration_window_days = days;
        self
    }

    #[must_use]
    pub fn cipher(&self) -> &SecretCipher {
        &self.cipher
    }

    #[must_use]
    pub fn expiration_window_days(&self) -> u32 {
        self.expiration_window_days
    }

    fn clock(&self) -> ExpirationClock {
        ExpirationClock {
            today: Utc::now().date_naive(),
            window_days: self.expiration_window_days,
        }
    }
}

/// Trimmed, non-empty and at most 100 characters.
fn required_name<'a>(value: &'a str, field: &'static str) -> Result<&'a str, VaultError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(VaultError::BadRequest(field));
    }
    if value.chars().count() > NAME_MAX {
        return Err(VaultError::BadRequest("Names must be at most 100 characters."));
    }
    Ok(value)
}

fn required(value: &str, message: &'static str) -> Result<(), VaultError> {
    if value.trim().is_empty() {
        Err(VaultError::BadRequest(message))
    } else {
        Ok(())
    }
}

fn valid_site_url(value: &str) -> Result<&str, VaultError> {
    let value = value.trim();
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(value),
        _ => Err(VaultError::BadRequest("Enter a valid URL.")),
    }
}

/// Digits only, spaces removed.
fn valid_card_number(value: &str) -> Result<String, VaultError> {
    let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    let length_ok = (CARD_NUMBER_MIN..=CARD_NUMBER_MAX).contains(&digits.len());
    if length_ok && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(digits)
    } else {
        Err(VaultError::BadRequest("Enter a valid card number."))
    }
}

fn valid_cvv(value: &str) -> Result<&str, VaultError> {
    let value = value.trim();
    if (3..=4).contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(value)
    } else {
        Err(VaultError::BadRequest("Enter a valid CVV."))
    }
}

/// Blank optional strings are stored as `NULL`.
fn optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
