//! Identity records with passport and driver's license expiration tracking.
//!
//! Each document date is checked on its own: saving may create zero, one or two
//! notifications. Listing attaches expired and expiring-soon warnings.

use axum::{
    Json,
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::NaiveDate;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    VaultState, optional, required_name,
    storage::{
        IdentityFields, RecordTable, VaultError, delete_record, find_identity, insert_identity,
        list_identities, update_identity,
    },
    types::{IdentityRequest, IdentityResponse},
};
use crate::{
    api::handlers::auth::{AuthConfig, principal::require_auth},
    vault::{RecordKind, VaultEvent, events, expiration::ExpiryStatus, models::Identity},
};

#[utoipa::path(
    get,
    path = "/v1/vault/identities",
    responses(
        (status = 200, description = "Identities with expiration warnings.", body = [IdentityResponse]),
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

    let rows = match list_identities(&pool, principal.user_id).await {
        Ok(rows) => rows,
        Err(err) => return VaultError::Database(err).into_response(),
    };

    let clock = vault.clock();
    let recorded: Vec<VaultEvent> = rows
        .iter()
        .filter_map(|identity| status_event(identity, clock.today, clock.window_days))
        .collect();
    events::record(principal.user_id, &recorded);

    let body: Vec<IdentityResponse> = rows
        .into_iter()
        .map(|identity| IdentityResponse::new(identity, clock.today, clock.window_days))
        .collect();
    (StatusCode::OK, Json(body)).into_response()
}

/// Expired outranks expiring soon when the two documents differ.
fn status_event(identity: &Identity, today: NaiveDate, window_days: u32) -> Option<VaultEvent> {
    let statuses = [
        identity.passport.status(today, window_days),
        identity.license.status(today, window_days),
    ];
    if statuses
        .iter()
        .any(|status| matches!(status, Some(ExpiryStatus::Expired(_))))
    {
        Some(VaultEvent::IdentityExpired { id: identity.id })
    } else if statuses.iter().any(Option::is_some) {
        Some(VaultEvent::IdentityExpiringSoon { id: identity.id })
    } else {
        None
    }
}

#[utoipa::path(
    post,
    path = "/v1/vault/identities",
    request_body = IdentityRequest,
    responses(
        (status = 201, description = "Identity stored.", body = IdentityResponse),
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
    Json(payload): Json<IdentityRequest>,
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
    path = "/v1/vault/identities/{id}",
    params(("id" = Uuid, Path, description = "Identity id")),
    responses(
        (status = 200, description = "Identity detail.", body = IdentityResponse),
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

    let clock = vault.clock();
    match find_identity(&pool, principal.user_id, id).await {
        Ok(Some(identity)) => (
            StatusCode::OK,
            Json(IdentityResponse::new(identity, clock.today, clock.window_days)),
        )
            .into_response(),
        Ok(None) => VaultError::NotFound.into_response(),
        Err(err) => VaultError::Database(err).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/v1/vault/identities/{id}",
    request_body = IdentityRequest,
    params(("id" = Uuid, Path, description = "Identity id")),
    responses(
        (status = 200, description = "Identity updated.", body = IdentityResponse),
        (status = 400, description = "Invalid input.", body = String),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
        (status = 404, description = "Not found."),
    ),
    tag = "vault"
)]
/// Replaces the identity. Each changed document date re-arms its own notice.
pub async fn update(
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    vault: Extension<Arc<VaultState>>,
    Json(payload): Json<IdentityRequest>,
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
    path = "/v1/vault/identities/{id}",
    params(("id" = Uuid, Path, description = "Identity id")),
    responses(
        (status = 204, description = "Identity deleted."),
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

    match delete_record(&pool, RecordTable::Identities, principal.user_id, id).await {
        Ok(true) => {
            events::record(
                principal.user_id,
                &[VaultEvent::RecordDeleted {
                    kind: RecordKind::Identity,
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
    vault: &VaultState,
    user_id: Uuid,
    id: Option<Uuid>,
    payload: &IdentityRequest,
) -> Result<IdentityResponse, VaultError> {
    let full_name = required_name(&payload.full_name, "Full name is required.")?;
    let fields = IdentityFields {
        full_name,
        passport_number: optional(payload.passport_number.as_deref()),
        passport_expiration_date: payload.passport_expiration_date,
        license_number: optional(payload.license_number.as_deref()),
        license_expiration_date: payload.license_expiration_date,
    };

    let clock = vault.clock();
    let mut recorded = Vec::new();
    let (identity, notices) = match id {
        None => {
            let (identity, notices) = insert_identity(pool, user_id, &fields, clock).await?;
            recorded.push(VaultEvent::RecordCreated {
                kind: RecordKind::Identity,
                id: identity.id,
            });
            (identity, notices)
        }
        Some(id) => {
            let (identity, notices) = update_identity(pool, user_id, id, &fields, clock)
                .await?
                .ok_or(VaultError::NotFound)?;
            recorded.push(VaultEvent::RecordUpdated {
                kind: RecordKind::Identity,
                id: identity.id,
            });
            (identity, notices)
        }
    };

    recorded.extend(notices.iter().map(|notice| VaultEvent::ExpirationNotified {
        kind: notice.kind,
        record_id: identity.id,
    }));
    events::record(user_id, &recorded);

    Ok(IdentityResponse::new(identity, clock.today, clock.window_days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::Expiry;
    use chrono::Utc;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    fn identity(passport: Option<NaiveDate>, license: Option<NaiveDate>) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            full_name: "Ada Lovelace".to_string(),
            passport_number: None,
            passport: Expiry::new(passport, true),
            license_number: None,
            license: Expiry::new(license, true),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn expired_outranks_expiring_soon() {
        let today = day(2026, 5, 10);
        let record = identity(Some(day(2026, 6, 1)), Some(day(2026, 5, 1)));
        assert_eq!(
            status_event(&record, today, 30),
            Some(VaultEvent::IdentityExpired { id: record.id })
        );
    }

    #[test]
    fn expiring_soon_and_quiet() {
        let today = day(2026, 5, 10);
        let soon = identity(Some(day(2026, 6, 1)), None);
        assert_eq!(
            status_event(&soon, today, 30),
            Some(VaultEvent::IdentityExpiringSoon { id: soon.id })
        );
        let quiet = identity(Some(day(2027, 1, 1)), None);
        assert_eq!(status_event(&quiet, today, 30), None);
    }
}
