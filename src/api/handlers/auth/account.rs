//! Account endpoints for the logged-in user.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};

use super::{
    principal::{AuthRejection, require_auth},
    state::AuthConfig,
    storage::{find_credentials_by_id, update_password_hash},
    types::{AccountResponse, ChangePasswordRequest, MessageResponse},
    utils::{hash_password, validate_new_password, verify_password},
};

#[utoipa::path(
    get,
    path = "/v1/account",
    responses(
        (status = 200, description = "Current account.", body = AccountResponse),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
    ),
    tag = "account"
)]
pub async fn account(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match find_credentials_by_id(&pool, principal.user_id).await {
        Ok(Some(credentials)) => (
            StatusCode::OK,
            Json(AccountResponse {
                username: credentials.username,
            }),
        )
            .into_response(),
        Ok(None) => AuthRejection::NotAuthenticated.into_response(),
        Err(err) => {
            error!("Failed to load account: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/account/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed.", body = MessageResponse),
        (status = 400, description = "Wrong old password or invalid new password.", body = String),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
    ),
    tag = "account"
)]
/// Changes the password after re-checking the old one. The session stays valid.
pub async fn change_password(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    Json(payload): Json<ChangePasswordRequest>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    let credentials = match find_credentials_by_id(&pool, principal.user_id).await {
        Ok(Some(credentials)) => credentials,
        Ok(None) => return AuthRejection::NotAuthenticated.into_response(),
        Err(err) => {
            error!("Failed to load account: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if !verify_password(&credentials.password_hash, &payload.old_password) {
        return (
            StatusCode::BAD_REQUEST,
            "Your old password was entered incorrectly. Please enter it again.",
        )
            .into_response();
    }

    if let Err(message) =
        validate_new_password(&payload.new_password, &payload.new_password_confirmation)
    {
        return (StatusCode::BAD_REQUEST, message).into_response();
    }

    let password_hash = match hash_password(&payload.new_password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Failed to hash password: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if let Err(err) = update_password_hash(&pool, principal.user_id, &password_hash).await {
        error!("Failed to update password: {err}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    info!(user_id = %principal.user_id, "Password changed");
    (
        StatusCode::OK,
        Json(MessageResponse::new("Your password was successfully updated!")),
    )
        .into_response()
}
