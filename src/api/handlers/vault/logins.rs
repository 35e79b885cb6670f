//! Website logins. The password field is encrypted at rest.

use axum::{
    Json,
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    VaultState, required, required_name,
    storage::{
        LoginFields, RecordTable, VaultError, delete_record, find_login, insert_login,
        list_logins, update_login,
    },
    types::{LoginItemRequest, LoginItemResponse},
    valid_site_url,
};
use crate::{
    api::handlers::auth::{AuthConfig, principal::require_auth},
    vault::{RecordKind, VaultEvent, events, models::LoginItem},
};

#[utoipa::path(
    get,
    path = "/v1/vault/logins",
    responses(
        (status = 200, description = "Logins, passwords decrypted.", body = [LoginItemResponse]),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
    ),
    tag = "vault"
)]
pub async fn list(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    vault: Extension<Arc<VaultState>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match list_logins(&pool, principal.user_id).await {
        Ok(rows) => {
            let body: Vec<LoginItemResponse> =
                rows.into_iter().map(|row| reveal(&vault, row)).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => VaultError::Database(err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/vault/logins",
    request_body = LoginItemRequest,
    responses(
        (status = 201, description = "Login stored.", body = LoginItemResponse),
        (status = 400, description = "Invalid input.", body = String),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
    ),
    tag = "vault"
)]
pub async fn create(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    vault: Extension<Arc<VaultState>>,
    Json(payload): Json<LoginItemRequest>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match save(&pool, &vault, principal.user_id, None, &payload).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/vault/logins/{id}",
    params(("id" = Uuid, Path, description = "Login id")),
    responses(
        (status = 200, description = "Login detail.", body = LoginItemResponse),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
        (status = 404, description = "Not found."),
    ),
    tag = "vault"
)]
pub async fn detail(
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    vault: Extension<Arc<VaultState>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match find_login(&pool, principal.user_id, id).await {
        Ok(Some(row)) => (StatusCode::OK, Json(reveal(&vault, row))).into_response(),
        Ok(None) => VaultError::NotFound.into_response(),
        Err(err) => VaultError::Database(err).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/v1/vault/logins/{id}",
    request_body = LoginItemRequest,
    params(("id" = Uuid, Path, description = "Login id")),
    responses(
        (status = 200, description = "Login updated.", body = LoginItemResponse),
        (status = 400, description = "Invalid input.", body = String),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
        (status = 404, description = "Not found."),
    ),
    tag = "vault"
)]
pub async fn update(
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    vault: Extension<Arc<VaultState>>,
    Json(payload): Json<LoginItemRequest>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match save(&pool, &vault, principal.user_id, Some(id), &payload).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/vault/logins/{id}",
    params(("id" = Uuid, Path, description = "Login id")),
    responses(
        (status = 204, description = "Login deleted."),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
        (status = 404, description = "Not found."),
    ),
    tag = "vault"
)]
pub async fn delete(
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match delete_record(&pool, RecordTable::Logins, principal.user_id, id).await {
        Ok(true) => {
            events::record(
                principal.user_id,
                &[VaultEvent::RecordDeleted {
                    kind: RecordKind::Login,
                    id,
                }],
            );
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => VaultError::NotFound.into_response(),
        Err(err) => VaultError::Database(err).into_response(),
    }
}

/// Insert when `id` is `None`, otherwise update the caller's record.
async fn save(
    pool: &PgPool,
    vault: &VaultState,
    user_id: Uuid,
    id: Option<Uuid>,
    payload: &LoginItemRequest,
) -> Result<LoginItemResponse, VaultError> {
    let name = required_name(&payload.name, "Name is required.")?;
    let site_url = valid_site_url(&payload.site_url)?;
    required(&payload.username, "Username is required.")?;
    required(&payload.password, "Password is required.")?;

    let ciphertext = vault.cipher().encrypt(user_id, &payload.password)?;
    let fields = LoginFields {
        name,
        site_url,
        username: payload.username.trim(),
        password_ciphertext: &ciphertext,
        notes: &payload.notes,
    };

    let (row, event) = match id {
        None => {
            let row = insert_login(pool, user_id, &fields).await?;
            let event = VaultEvent::RecordCreated {
                kind: RecordKind::Login,
                id: row.id,
            };
            (row, event)
        }
        Some(id) => {
            let row = update_login(pool, user_id, id, &fields)
                .await?
                .ok_or(VaultError::NotFound)?;
            let event = VaultEvent::RecordUpdated {
                kind: RecordKind::Login,
                id: row.id,
            };
            (row, event)
        }
    };

    events::record(user_id, &[event]);
    Ok(reveal(vault, row))
}

fn reveal(vault: &VaultState, row: LoginItem) -> LoginItemResponse {
    let password = vault
        .cipher()
        .reveal(row.user_id, row.id, &row.password_ciphertext);
    LoginItemResponse {
        id: row.id.to_string(),
        name: row.name,
        site_url: row.site_url,
        username: row.username,
        password,
        notes: row.notes,
        created_at: row.created_at.to_rfc3339(),
        updated_at: row.updated_at.to_rfc3339(),
    }
}
