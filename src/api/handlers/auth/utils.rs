//! Small helpers for auth validation, password hashing and session tokens.

use crate::recovery::MAX_ANSWER_LEN;
use anyhow::{Context, Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use regex::Regex;
use sha2::{Digest, Sha256};

pub(super) const USERNAME_MAX: usize = 150;
pub(super) const PASSWORD_MIN: usize = 8;

pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(super) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Letters and digits only.
pub(super) fn valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= USERNAME_MAX
        && username.chars().all(char::is_alphanumeric)
}

/// # Errors
/// Returns the user-facing reason the password is rejected.
pub(super) fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < PASSWORD_MIN {
        return Err("The password must be at least 8 characters long.");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("The password must contain at least one digit.");
    }
    if !password.chars().any(char::is_alphabetic) {
        return Err("The password must contain at least one letter.");
    }
    Ok(())
}

/// # Errors
/// Returns the user-facing reason the confirmation is rejected.
pub(super) fn validate_new_password(
    password: &str,
    confirmation: &str,
) -> Result<(), &'static str> {
    if password != confirmation {
        return Err("The two password fields didn't match.");
    }
    validate_password(password)
}

/// # Errors
/// Returns the user-facing reason the answer is rejected.
pub(super) fn validate_answer(answer: &str) -> Result<(), &'static str> {
    if answer.is_empty() {
        return Err("Security answers are required.");
    }
    if answer.chars().count() > MAX_ANSWER_LEN {
        return Err("Security answers must be at most 100 characters.");
    }
    Ok(())
}

/// Argon2id PHC string with a random 16-byte salt.
pub(super) fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut salt_bytes)
        .context("failed to generate password salt")?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|err| anyhow!("failed to encode password salt: {err}"))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?;
    Ok(hash.to_string())
}

/// False for a wrong password and for a malformed stored hash.
pub(super) fn verify_password(stored_hash: &str, password: &str) -> bool {
    PasswordHash::new(stored_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Create a new session token for the auth cookie.
/// The raw value is only returned to set the cookie; the database stores a hash.
pub(crate) fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

pub(crate) fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Name of the violated unique constraint, if that is what failed.
pub(super) fn unique_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if is_unique_violation(err) => db_err.constraint(),
        _ => None,
    }
}
