//! In-app notifications for the signed-in user.

use axum::{
    Json,
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use super::{
    auth::{AuthConfig, principal::require_auth},
    vault::types::NotificationResponse,
};
use crate::notifications::NotificationRepo;

#[utoipa::path(
    get,
    path = "/v1/notifications",
    responses(
        (status = 200, description = "All notifications, newest first.", body = [NotificationResponse]),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
    ),
    tag = "notifications"
)]
pub async fn list_notifications(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match NotificationRepo::list(&pool, principal.user_id).await {
        Ok(rows) => {
            let body: Vec<NotificationResponse> = rows.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            error!("Failed to list notifications: {err:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 204, description = "Marked read."),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
        (status = 404, description = "Not found."),
    ),
    tag = "notifications"
)]
pub async fn mark_notification_read(
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match NotificationRepo::mark_read(&pool, principal.user_id, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("Failed to mark notification read: {err:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn notifications_require_a_session() -> anyhow::Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let config = Extension(Arc::new(AuthConfig::default()));

        let response = list_notifications(HeaderMap::new(), Extension(pool.clone()), config.clone())
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response =
            mark_notification_read(Path(Uuid::new_v4()), HeaderMap::new(), Extension(pool), config)
                .await
                .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }
}
