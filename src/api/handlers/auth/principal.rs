//! Authenticated principal extraction.
//!
//! Flow Overview: read the session token, load the session row, run the
//! inactivity guard, and hand the user id to the handler. A timed out session
//! is deleted and its cookie cleared in the same response.

use axum::{
    http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, error};
use uuid::Uuid;

use super::{
    session::{clear_session_cookie, extract_session_token},
    state::AuthConfig,
    storage::{delete_session, lookup_session, touch_session},
    utils::hash_session_token,
};
use crate::session::{self, GuardRejection};

/// Authenticated user context derived from the session.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: Uuid,
    pub token_hash: Vec<u8>,
}

#[derive(Debug)]
pub enum AuthRejection {
    NotAuthenticated,
    TimedOut { clear_cookie: Option<HeaderValue> },
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                GuardRejection::NotAuthenticated.message(),
            )
                .into_response(),
            Self::TimedOut { clear_cookie } => {
                let mut headers = HeaderMap::new();
                if let Some(cookie) = clear_cookie {
                    headers.insert(SET_COOKIE, cookie);
                }
                (
                    StatusCode::UNAUTHORIZED,
                    headers,
                    GuardRejection::TimedOut.message(),
                )
                    .into_response()
            }
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Resolve the request's session into a principal.
///
/// # Errors
/// Rejects missing, anonymous and idle sessions with 401, storage failures with 500.
pub async fn require_auth(
    headers: &HeaderMap,
    pool: &PgPool,
    config: &AuthConfig,
) -> Result<Principal, AuthRejection> {
    let Some(token) = extract_session_token(headers) else {
        return Err(AuthRejection::NotAuthenticated);
    };
    let token_hash = hash_session_token(&token);

    let mut state = match lookup_session(pool, &token_hash).await {
        Ok(Some(state)) => state,
        Ok(None) => return Err(AuthRejection::NotAuthenticated),
        Err(err) => {
            error!("Failed to lookup session: {err}");
            return Err(AuthRejection::Internal);
        }
    };

    let now = Utc::now();
    match session::guard(&mut state, now, config.session_timeout()) {
        Ok(user_id) => {
            if let Err(err) = touch_session(pool, &token_hash, now).await {
                error!("Failed to refresh session activity: {err}");
                return Err(AuthRejection::Internal);
            }
            Ok(Principal {
                user_id,
                token_hash,
            })
        }
        Err(GuardRejection::NotAuthenticated) => Err(AuthRejection::NotAuthenticated),
        Err(GuardRejection::TimedOut) => {
            debug!("Session idle past {}s", config.session_timeout_seconds());
            if let Err(err) = delete_session(pool, &token_hash).await {
                error!("Failed to delete idle session: {err}");
            }
            Err(AuthRejection::TimedOut {
                clear_cookie: clear_session_cookie(config).ok(),
            })
        }
    }
}
