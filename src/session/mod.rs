//! Per-request session state and the inactivity guard.
//!
//! Every browser holding a `mypass_session` cookie has one session row, whether
//! it is logged in or not; the recovery flow keeps its progress in an anonymous
//! session. [`SessionState`] is the in-memory view of that row: storage loads it,
//! [`guard`] decides, storage persists the outcome.

pub mod reaper;

pub use reaper::{prune_idle_sessions, spawn_session_reaper};

use crate::recovery::RecoveryProgress;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

pub const TIMEOUT_MESSAGE: &str = "Your account has been locked due to inactivity.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    user_id: Option<Uuid>,
    authenticated: bool,
    last_activity: DateTime<Utc>,
    recovery: Option<RecoveryProgress>,
}

impl SessionState {
    #[must_use]
    pub const fn anonymous(now: DateTime<Utc>) -> Self {
        Self {
            user_id: None,
            authenticated: false,
            last_activity: now,
            recovery: None,
        }
    }

    #[must_use]
    pub const fn from_parts(
        user_id: Option<Uuid>,
        authenticated: bool,
        last_activity: DateTime<Utc>,
        recovery: Option<RecoveryProgress>,
    ) -> Self {
        Self {
            user_id,
            authenticated,
            last_activity,
            recovery,
        }
    }

    /// True only when the login flag is set and a user is attached.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated && self.user_id.is_some()
    }

    #[must_use]
    pub const fn current_user(&self) -> Option<Uuid> {
        if self.authenticated {
            self.user_id
        } else {
            None
        }
    }

    #[must_use]
    pub const fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    #[must_use]
    pub const fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    #[must_use]
    pub const fn recovery(&self) -> Option<&RecoveryProgress> {
        self.recovery.as_ref()
    }

    pub fn set_recovery(&mut self, recovery: Option<RecoveryProgress>) {
        self.recovery = recovery;
    }

    /// Attach a user and mark the session authenticated. Any recovery progress is dropped.
    pub fn login(&mut self, user_id: Uuid, now: DateTime<Utc>) {
        self.user_id = Some(user_id);
        self.authenticated = true;
        self.last_activity = now;
        self.recovery = None;
    }

    pub fn logout(&mut self) {
        self.user_id = None;
        self.authenticated = false;
        self.recovery = None;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    /// Strictly greater than the timeout; activity stamped in the future never times out.
    #[must_use]
    pub fn has_timed_out(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        (now - self.last_activity)
            .to_std()
            .is_ok_and(|elapsed| elapsed > timeout)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardRejection {
    NotAuthenticated,
    TimedOut,
}

impl GuardRejection {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotAuthenticated => "Authentication required",
            Self::TimedOut => TIMEOUT_MESSAGE,
        }
    }
}

/// Checks run before every protected operation.
///
/// A session that is not authenticated is rejected first. An authenticated
/// session that has been idle past `timeout` is logged out and rejected. Otherwise
/// the activity timestamp is refreshed and the user id is returned.
///
/// # Errors
/// Returns the reason the request must not proceed.
pub fn guard(
    state: &mut SessionState,
    now: DateTime<Utc>,
    timeout: Duration,
) -> Result<Uuid, GuardRejection> {
    let Some(user_id) = state.current_user() else {
        return Err(GuardRejection::NotAuthenticated);
    };

    if state.has_timed_out(now, timeout) {
        state.logout();
        return Err(GuardRejection::TimedOut);
    }

    state.touch(now);
    Ok(user_id)
}
