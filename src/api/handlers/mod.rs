//! API handlers for MyPass.
//!
//! `auth` owns sessions, registration, login and password recovery; `vault`
//! owns the stored records. Everything under `/v1` except registration, login
//! and recovery requires an authenticated, non-idle session.

pub mod auth;
pub mod health;
pub mod notifications;
pub mod root;
pub mod vault;
