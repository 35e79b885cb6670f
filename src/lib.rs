//! # MyPass (Personal Password Manager)
//!
//! `mypass` stores a user's secrets behind a session-authenticated JSON API:
//! website logins, credit cards, identity documents, secure notes and saved
//! passwords.
//!
//! ## Sessions
//!
//! A session is a row keyed by the SHA-256 hash of a random token carried in the
//! `mypass_session` cookie (or a `Bearer` header). Every protected request first
//! checks that the session is authenticated, then that it has not been idle for
//! longer than the configured timeout. An idle session is deleted and the caller
//! gets `401` with an inactivity message.
//!
//! ## Secrets
//!
//! Password values are encrypted with `ChaCha20-Poly1305` under a key supplied at
//! startup. The owner's id is bound as associated data, so a ciphertext copied to
//! another user's row does not decrypt. A value that fails to decrypt is shown as
//! a placeholder instead of failing the request.
//!
//! ## Expiration notices
//!
//! Credit cards and identity documents carry expiration dates. Whenever such a
//! record is saved, each date falling within the notice window produces exactly
//! one in-app notification; a per-field flag prevents repeats until the date is
//! changed. A background sweep applies the same rule to every stored record.
//!
//! ## Recovery
//!
//! A forgotten password is reset by answering three security questions in order.
//! Progress lives in the caller's session and a successful third answer grants a
//! single reset.

pub mod api;
pub mod cli;
pub mod notifications;
pub mod recovery;
pub mod session;
pub mod vault;

#[cfg(test)]
mod test_support;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }
}
