//! Registration, login, sessions, account management and password recovery.
//!
//! ## Sessions
//!
//! Login creates a row in `user_sessions` keyed by the SHA-256 hash of a random
//! 32-byte token. The raw token only travels in the `mypass_session` cookie (or a
//! `Bearer` header). Anonymous rows exist too: password recovery keeps its
//! progress in the caller's session before anyone is logged in.
//!
//! ## Inactivity
//!
//! [`principal::require_auth`] runs the session guard on every protected request.
//! A session idle for longer than the configured timeout is deleted and the
//! caller gets `401` with "Your account has been locked due to inactivity."

pub(crate) mod account;
pub(crate) mod login;
pub(crate) mod principal;
pub(crate) mod recovery;
pub(crate) mod register;
pub(crate) mod session;
mod state;
mod storage;
pub(crate) mod types;
mod utils;

pub use state::AuthConfig;

#[cfg(test)]
mod tests;
