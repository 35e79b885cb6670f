use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};

use super::{
    session::{extract_session_token, session_cookie},
    state::AuthConfig,
    storage::{delete_session, find_credentials, insert_session},
    types::{LoginRequest, LoginResponse},
    utils::{hash_session_token, verify_password},
};
use crate::session::SessionState;

const INVALID_CREDENTIALS: &str = "Invalid username or password.";

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; session cookie set.", body = LoginResponse),
        (status = 401, description = "Invalid username or password.", body = String),
    ),
    tag = "auth"
)]
/// Verifies the credentials and starts a fresh authenticated session.
/// Any session the caller already carried is discarded first.
pub async fn login(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let username = payload.username.trim();
    let credentials = match find_credentials(&pool, username).await {
        Ok(Some(credentials)) => credentials,
        Ok(None) => return (StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS).into_response(),
        Err(err) => {
            error!("Failed to lookup user: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if !verify_password(&credentials.password_hash, &payload.password) {
        return (StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS).into_response();
    }

    if let Some(previous) = extract_session_token(&headers) {
        if let Err(err) = delete_session(&pool, &hash_session_token(&previous)).await {
            error!("Failed to discard previous session: {err}");
        }
    }

    let now = Utc::now();
    let mut state = SessionState::anonymous(now);
    state.login(credentials.id, now);

    let token = match insert_session(&pool, &state).await {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to create session: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut response_headers = HeaderMap::new();
    match session_cookie(&auth_config, &token) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    info!(user_id = %credentials.id, "User logged in");
    let response = LoginResponse {
        username: credentials.username,
        message: "You are now logged in!".to_string(),
    };
    (StatusCode::OK, response_headers, Json(response)).into_response()
}
