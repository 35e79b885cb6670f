//! Credit cards. Saving a card whose expiration date falls inside the notice
//! window creates one notification for that date.

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
        CardFields, RecordTable, VaultError, delete_record, find_credit_card, insert_credit_card,
        list_credit_cards, update_credit_card,
    },
    types::{CreditCardRequest, CreditCardResponse},
    valid_card_number, valid_cvv,
};
use crate::{
    api::handlers::auth::{AuthConfig, principal::require_auth},
    vault::{RecordKind, VaultEvent, events},
};

#[utoipa::path(
    get,
    path = "/v1/vault/credit-cards",
    responses(
        (status = 200, description = "Credit cards.", body = [CreditCardResponse]),
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

    match list_credit_cards(&pool, principal.user_id).await {
        Ok(rows) => {
            let body: Vec<CreditCardResponse> = rows.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => VaultError::Database(err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/vault/credit-cards",
    request_body = CreditCardRequest,
    responses(
        (status = 201, description = "Card stored.", body = CreditCardResponse),
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
    Json(payload): Json<CreditCardRequest>,
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
    path = "/v1/vault/credit-cards/{id}",
    params(("id" = Uuid, Path, description = "Credit card id")),
    responses(
        (status = 200, description = "Card detail.", body = CreditCardResponse),
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

    match find_credit_card(&pool, principal.user_id, id).await {
        Ok(Some(card)) => (StatusCode::OK, Json(CreditCardResponse::from(card))).into_response(),
        Ok(None) => VaultError::NotFound.into_response(),
        Err(err) => VaultError::Database(err).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/v1/vault/credit-cards/{id}",
    request_body = CreditCardRequest,
    params(("id" = Uuid, Path, description = "Credit card id")),
    responses(
        (status = 200, description = "Card updated.", body = CreditCardResponse),
        (status = 400, description = "Invalid input.", body = String),
        (status = 401, description = "Missing, anonymous or idle session.", body = String),
        (status = 404, description = "Not found."),
    ),
    tag = "vault"
)]
/// Replaces the card. A changed expiration date re-arms its notice.
pub async fn update(
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    vault: Extension<Arc<VaultState>>,
    Json(payload): Json<CreditCardRequest>,
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
    path = "/v1/vault/credit-cards/{id}",
    params(("id" = Uuid, Path, description = "Credit card id")),
    responses(
        (status = 204, description = "Card deleted."),
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

    match delete_record(&pool, RecordTable::CreditCards, principal.user_id, id).await {
        Ok(true) => {
            events::record(
                principal.user_id,
                &[VaultEvent::RecordDeleted {
                    kind: RecordKind::CreditCard,
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
    payload: &CreditCardRequest,
) -> Result<CreditCardResponse, VaultError> {
    let cardholder_name = required_name(&payload.cardholder_name, "Cardholder name is required.")?;
    let card_number = valid_card_number(&payload.card_number)?;
    let cvv = valid_cvv(&payload.cvv)?;
    let fields = CardFields {
        cardholder_name,
        card_number: &card_number,
        cvv,
        expiration_date: payload.expiration_date,
    };

    let mut recorded = Vec::new();
    let (card, notice) = match id {
        None => {
            let (card, notice) = insert_credit_card(pool, user_id, &fields, vault.clock()).await?;
            recorded.push(VaultEvent::RecordCreated {
                kind: RecordKind::CreditCard,
                id: card.id,
            });
            (card, notice)
        }
        Some(id) => {
            let (card, notice) = update_credit_card(pool, user_id, id, &fields, vault.clock())
                .await?
                .ok_or(VaultError::NotFound)?;
            recorded.push(VaultEvent::RecordUpdated {
                kind: RecordKind::CreditCard,
                id: card.id,
            });
            (card, notice)
        }
    };

    if let Some(notice) = notice {
        recorded.push(VaultEvent::ExpirationNotified {
            kind: notice.kind,
            record_id: card.id,
        });
    }
    events::record(user_id, &recorded);

    Ok(card.into())
}
