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
    required, required_name,
    storage::{
        RecordTable, VaultError, delete_record, find_note, insert_note, list_notes, update_note,
    },
    types::{SecureNoteRequest, SecureNoteResponse},
};
use crate::{
    api::handlers::auth::{AuthConfig, principal::require_auth},
    vault::{RecordKind, VaultEvent, events},
};

#[utoipa::path(
    get,
    path = "/v1/vault/notes",
    responses(
        (status = 200, description = "Secure notes.", body = [SecureNoteResponse]),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
    ),
    tag = "vault"
)]
pub async fn list(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match list_notes(&pool, principal.user_id).await {
        Ok(rows) => {
            let body: Vec<SecureNoteResponse> = rows.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => VaultError::Database(err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/vault/notes",
    request_body = SecureNoteRequest,
    responses(
        (status = 201, description = "Note stored.", body = SecureNoteResponse),
        (status = 400, description = "Invalid input.", body = String),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
    ),
    tag = "vault"
)]
pub async fn create(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    Json(payload): Json<SecureNoteRequest>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match save(&pool, principal.user_id, None, &payload).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/vault/notes/{id}",
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 200, description = "Note detail.", body = SecureNoteResponse),
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
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match find_note(&pool, principal.user_id, id).await {
        Ok(Some(note)) => (StatusCode::OK, Json(SecureNoteResponse::from(note))).into_response(),
        Ok(None) => VaultError::NotFound.into_response(),
        Err(err) => VaultError::Database(err).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/v1/vault/notes/{id}",
    request_body = SecureNoteRequest,
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 200, description = "Note updated.", body = SecureNoteResponse),
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
    Json(payload): Json<SecureNoteRequest>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match save(&pool, principal.user_id, Some(id), &payload).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/vault/notes/{id}",
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 204, description = "Note deleted."),
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

    match delete_record(&pool, RecordTable::SecureNotes, principal.user_id, id).await {
        Ok(true) => {
            events::record(
                principal.user_id,
                &[VaultEvent::RecordDeleted {
                    kind: RecordKind::SecureNote,
                    id,
                }],
            );
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => VaultError::NotFound.into_response(),
        Err(err) => VaultError::Database(err).into_response(),
    }
}

async fn save(
    pool: &PgPool,
    user_id: Uuid,
    id: Option<Uuid>,
    payload: &SecureNoteRequest,
) -> Result<SecureNoteResponse, VaultError> {
    let title = required_name(&payload.title, "Title is required.")?;
    required(&payload.content, "Content is required.")?;

    let (note, event) = match id {
        None => {
            let note = insert_note(pool, user_id, title, &payload.content).await?;
            let event = VaultEvent::RecordCreated {
                kind: RecordKind::SecureNote,
                id: note.id,
            };
            (note, event)
        }
        Some(id) => {
            let note = update_note(pool, user_id, id, title, &payload.content)
                .await?
                .ok_or(VaultError::NotFound)?;
            let event = VaultEvent::RecordUpdated {
                kind: RecordKind::SecureNote,
                id: note.id,
            };
            (note, event)
        }
    };

    events::record(user_id, &[event]);
    Ok(note.into())
}
