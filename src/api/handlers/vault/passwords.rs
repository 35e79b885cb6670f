//! Saved passwords: generated or custom values kept by account name.

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
    VaultState, required_name,
    storage::{
        VaultError, delete_saved_password, insert_saved_password, list_saved_passwords,
        update_saved_password,
    },
    types::{
        CreatePasswordRequest, CreatePasswordResponse, SavedPasswordResponse,
        UpdatePasswordRequest,
    },
};
use crate::{
    api::handlers::auth::{AuthConfig, principal::require_auth},
    vault::{Complexity, VaultEvent, events, models::SavedPassword},
};

const DUPLICATE_PASSWORD: &str = "This password already exists in your vault!";

#[utoipa::path(
    get,
    path = "/v1/vault/passwords",
    responses(
        (status = 200, description = "Saved passwords, decrypted.", body = [SavedPasswordResponse]),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
    ),
    tag = "vault"
)]
/// Lists saved passwords newest first. Values that fail to decrypt are shown as
/// `Error decrypting password`.
pub async fn list_passwords(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    vault: Extension<Arc<VaultState>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match list_saved_passwords(&pool, principal.user_id).await {
        Ok(rows) => {
            let body: Vec<SavedPasswordResponse> = rows
                .into_iter()
                .map(|row| reveal(&vault, row))
                .collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => VaultError::Database(err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/vault/passwords",
    request_body = CreatePasswordRequest,
    responses(
        (status = 201, description = "Password stored.", body = CreatePasswordResponse),
        (status = 200, description = "Password generated but not stored.", body = CreatePasswordResponse),
        (status = 400, description = "Invalid input.", body = String),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
        (status = 409, description = "The value is already in the vault.", body = String),
    ),
    tag = "vault"
)]
/// Stores a custom password, or generates one from the `complexity` preset.
/// A value equal to one already saved by the user is rejected.
pub async fn create_password(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    vault: Extension<Arc<VaultState>>,
    Json(payload): Json<CreatePasswordRequest>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match create(&pool, &vault, principal.user_id, &payload).await {
        Ok((status, response)) => (status, Json(response)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn create(
    pool: &PgPool,
    vault: &VaultState,
    user_id: Uuid,
    payload: &CreatePasswordRequest,
) -> Result<(StatusCode, CreatePasswordResponse), VaultError> {
    let name = required_name(&payload.name, "Name is required.")?;
    let (password, suggested) = choose_password(payload)?;

    let mut recorded = Vec::new();
    if suggested {
        recorded.push(VaultEvent::PasswordGenerated {
            name: name.to_string(),
        });
    }

    if !payload.save_to_vault {
        events::record(user_id, &recorded);
        let response = CreatePasswordResponse {
            id: None,
            name: name.to_string(),
            password,
            suggested,
            message: "Password generated.".to_string(),
        };
        return Ok((StatusCode::OK, response));
    }

    let existing = list_saved_passwords(pool, user_id).await?;
    let duplicate = existing.iter().any(|row| {
        vault
            .cipher()
            .decrypt(user_id, &row.password_ciphertext)
            .is_ok_and(|value| value == password)
    });
    if duplicate {
        return Err(VaultError::Conflict(DUPLICATE_PASSWORD));
    }

    let ciphertext = vault.cipher().encrypt(user_id, &password)?;
    let row = insert_saved_password(pool, user_id, name, &ciphertext, suggested).await?;

    recorded.push(VaultEvent::PasswordCreated {
        id: row.id,
        name: row.name.clone(),
    });
    events::record(user_id, &recorded);

    let response = CreatePasswordResponse {
        id: Some(row.id.to_string()),
        name: row.name,
        password,
        suggested,
        message: "Password saved to your vault.".to_string(),
    };
    Ok((StatusCode::CREATED, response))
}

/// A non-blank custom password wins; otherwise generate from the preset.
/// The flag is true for generated values.
fn choose_password(payload: &CreatePasswordRequest) -> Result<(String, bool), VaultError> {
    if let Some(custom) = payload
        .custom_password
        .as_deref()
        .filter(|value| !value.trim().is_empty())
    {
        return Ok((custom.to_string(), false));
    }

    let complexity: Complexity = payload
        .complexity
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(VaultError::BadRequest)?;
    let password = complexity
        .generate()
        .map_err(|_| VaultError::BadRequest(crate::vault::generator::INVALID_COMPLEXITY))?;
    Ok((password, true))
}

#[utoipa::path(
    patch,
    path = "/v1/vault/passwords/{id}",
    request_body = UpdatePasswordRequest,
    params(("id" = Uuid, Path, description = "Saved password id")),
    responses(
        (status = 200, description = "Password updated.", body = SavedPasswordResponse),
        (status = 400, description = "Invalid input.", body = String),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
        (status = 404, description = "Not found."),
    ),
    tag = "vault"
)]
/// Renames the entry and/or replaces its value. Omitted fields are kept.
pub async fn update_password(
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    vault: Extension<Arc<VaultState>>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match update(&pool, &vault, principal.user_id, id, &payload).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn update(
    pool: &PgPool,
    vault: &VaultState,
    user_id: Uuid,
    id: Uuid,
    payload: &UpdatePasswordRequest,
) -> Result<SavedPasswordResponse, VaultError> {
    let name = payload
        .name
        .as_deref()
        .map(|name| required_name(name, "Name is required."))
        .transpose()?;
    let ciphertext = match payload.password.as_deref() {
        Some(password) if password.trim().is_empty() => {
            return Err(VaultError::BadRequest("Password is required."));
        }
        Some(password) => Some(vault.cipher().encrypt(user_id, password)?),
        None => None,
    };

    let row = update_saved_password(pool, user_id, id, name, ciphertext.as_deref())
        .await?
        .ok_or(VaultError::NotFound)?;

    events::record(
        user_id,
        &[VaultEvent::PasswordUpdated {
            id: row.id,
            name: row.name.clone(),
        }],
    );
    Ok(reveal(vault, row))
}

#[utoipa::path(
    delete,
    path = "/v1/vault/passwords/{id}",
    params(("id" = Uuid, Path, description = "Saved password id")),
    responses(
        (status = 204, description = "Password deleted."),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
        (status = 404, description = "Not found."),
    ),
    tag = "vault"
)]
pub async fn delete_password(
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match delete_saved_password(&pool, principal.user_id, id).await {
        Ok(Some(name)) => {
            events::record(principal.user_id, &[VaultEvent::PasswordDeleted { name }]);
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(None) => VaultError::NotFound.into_response(),
        Err(err) => VaultError::Database(err).into_response(),
    }
}

fn reveal(vault: &VaultState, row: SavedPassword) -> SavedPasswordResponse {
    let password = vault
        .cipher()
        .reveal(row.user_id, row.id, &row.password_ciphertext);
    SavedPasswordResponse {
        id: row.id.to_string(),
        name: row.name,
        password,
        suggested: row.suggested,
        created_at: row.created_at.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(complexity: Option<&str>, custom: Option<&str>) -> CreatePasswordRequest {
        CreatePasswordRequest {
            name: "Bank".to_string(),
            complexity: complexity.map(str::to_string),
            custom_password: custom.map(str::to_string),
            save_to_vault: true,
        }
    }

    #[test]
    fn custom_password_is_not_suggested() {
        let chosen = choose_password(&request(Some("complex"), Some("my-own-1")));
        assert!(matches!(chosen, Ok((ref value, false)) if value == "my-own-1"));
    }

    #[test]
    fn blank_custom_falls_back_to_preset() {
        let chosen = choose_password(&request(Some("simple"), Some("   ")));
        assert!(matches!(chosen, Ok((ref value, true)) if value.len() == 8));
    }

    #[test]
    fn unknown_or_missing_complexity_is_rejected() {
        for complexity in [Some("medium"), Some("Simple"), None] {
            assert!(matches!(
                choose_password(&request(complexity, None)),
                Err(VaultError::BadRequest("Invalid password complexity selection."))
            ));
        }
    }
}
