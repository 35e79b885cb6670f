use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::{
    storage::{VaultError, list_saved_passwords},
    types::{SavedPasswordSummary, VaultHomeResponse},
};
use crate::{
    api::handlers::auth::{AuthConfig, principal::require_auth},
    notifications::NotificationRepo,
};

#[utoipa::path(
    get,
    path = "/v1/vault",
    responses(
        (status = 200, description = "Unread notifications and saved password names.", body = VaultHomeResponse),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
    ),
    tag = "vault"
)]
/// Landing view of the vault. Unread notifications are returned once and marked
/// read by the same request.
pub async fn home(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    let saved_passwords = match list_saved_passwords(&pool, principal.user_id).await {
        Ok(rows) => rows
            .into_iter()
            .map(|row| SavedPasswordSummary {
                id: row.id.to_string(),
                name: row.name,
            })
            .collect(),
        Err(err) => return VaultError::Database(err).into_response(),
    };

    // Must stay the last fallible step: unread notices are consumed here.
    let notifications = match NotificationRepo::take_unread(&pool, principal.user_id).await {
        Ok(rows) => rows,
        Err(err) => {
            error!("Failed to load notifications: {err:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };

    let body = VaultHomeResponse {
        notifications: notifications.into_iter().map(Into::into).collect(),
        saved_passwords,
    };
    (StatusCode::OK, Json(body)).into_response()
}
