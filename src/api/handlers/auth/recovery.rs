//! Password recovery through the three security questions.
//!
//! Flow Overview:
//! 1) `start` looks up the username and stores step 0 in the caller's session,
//!    creating an anonymous session when the caller has none.
//! 2) `answer` checks the answer to the current question; a match advances and
//!    the third match authorizes one reset.
//! 3) `reset` consumes the authorization and stores the new password hash.

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
    storage::{
        ResetOutcome, insert_session, load_security_answers, lookup_session, reset_password,
        save_session,
    },
    types::{
        MessageResponse, RecoveryAnswerRequest, RecoveryAnswerResponse, RecoveryQuestionResponse,
        RecoveryResetRequest, RecoveryStartRequest,
    },
    utils::{hash_password, hash_session_token, validate_new_password},
};
use crate::{
    recovery::{AnswerOutcome, QUESTIONS, RecoveryProgress},
    session::SessionState,
};

const NOT_STARTED: &str = "Start password recovery first.";

#[utoipa::path(
    post,
    path = "/v1/auth/recovery/start",
    request_body = RecoveryStartRequest,
    responses(
        (status = 200, description = "First security question.", body = RecoveryQuestionResponse),
        (status = 404, description = "Username not found.", body = String),
    ),
    tag = "recovery"
)]
pub async fn start(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    Json(payload): Json<RecoveryStartRequest>,
) -> impl IntoResponse {
    let username = payload.username.trim();
    match load_security_answers(&pool, username).await {
        Ok(Some(_)) => {}
        Ok(None) => return (StatusCode::NOT_FOUND, "Username not found.").into_response(),
        Err(err) => {
            error!("Failed to load security answers: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    let progress = RecoveryProgress::start(username.to_string());
    let question = RecoveryQuestionResponse {
        step: progress.step() + 1,
        question: QUESTIONS[0].to_string(),
    };

    // Reuse the caller's session row when there is one.
    if let Some(token) = extract_session_token(&headers) {
        let token_hash = hash_session_token(&token);
        match lookup_session(&pool, &token_hash).await {
            Ok(Some(mut state)) => {
                if !state.is_authenticated() {
                    state.touch(Utc::now());
                }
                state.set_recovery(Some(progress));
                if let Err(err) = save_session(&pool, &token_hash, &state).await {
                    error!("Failed to store recovery progress: {err}");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
                return (StatusCode::OK, Json(question)).into_response();
            }
            Ok(None) => {}
            Err(err) => {
                error!("Failed to lookup session: {err}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    }

    let mut state = SessionState::anonymous(Utc::now());
    state.set_recovery(Some(progress));
    let token = match insert_session(&pool, &state).await {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to create recovery session: {err}");
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
    (StatusCode::OK, response_headers, Json(question)).into_response()
}

#[utoipa::path(
    post,
    path = "/v1/auth/recovery/answer",
    request_body = RecoveryAnswerRequest,
    responses(
        (status = 200, description = "Answer accepted.", body = RecoveryAnswerResponse),
        (status = 400, description = "Incorrect answer or recovery not started.", body = String),
    ),
    tag = "recovery"
)]
/// Checks the answer to the current question. A wrong answer leaves the step unchanged.
pub async fn answer(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    Json(payload): Json<RecoveryAnswerRequest>,
) -> impl IntoResponse {
    let Some(token) = extract_session_token(&headers) else {
        return (StatusCode::BAD_REQUEST, NOT_STARTED).into_response();
    };
    let token_hash = hash_session_token(&token);

    let mut state = match lookup_session(&pool, &token_hash).await {
        Ok(Some(state)) => state,
        Ok(None) => return (StatusCode::BAD_REQUEST, NOT_STARTED).into_response(),
        Err(err) => {
            error!("Failed to lookup session: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let Some(mut progress) = state.recovery().cloned() else {
        return (StatusCode::BAD_REQUEST, NOT_STARTED).into_response();
    };

    let stored = match load_security_answers(&pool, progress.username()).await {
        Ok(Some(stored)) => stored,
        Ok(None) => return (StatusCode::BAD_REQUEST, NOT_STARTED).into_response(),
        Err(err) => {
            error!("Failed to load security answers: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let response = match progress.submit(&stored, &payload.answer) {
        AnswerOutcome::Incorrect => {
            return (StatusCode::BAD_REQUEST, "Incorrect answer.").into_response();
        }
        AnswerOutcome::Next { question } => RecoveryAnswerResponse {
            message: "Correct! Next question.".to_string(),
            question: Some(question.to_string()),
            reset_authorized: false,
        },
        AnswerOutcome::Authorized => RecoveryAnswerResponse {
            message: "All answers correct! You can now reset your password.".to_string(),
            question: None,
            reset_authorized: true,
        },
    };

    // Anonymous recovery sessions stay alive while answers keep coming.
    if !state.is_authenticated() {
        state.touch(Utc::now());
    }
    state.set_recovery(Some(progress));
    if let Err(err) = save_session(&pool, &token_hash, &state).await {
        error!("Failed to store recovery progress: {err}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (StatusCode::OK, Json(response)).into_response()
}

#[utoipa::path(
    post,
    path = "/v1/auth/recovery/reset",
    request_body = RecoveryResetRequest,
    responses(
        (status = 200, description = "Password reset.", body = MessageResponse),
        (status = 400, description = "Invalid new password.", body = String),
        (status = 403, description = "Security questions not answered.", body = String),
    ),
    tag = "recovery"
)]
/// Spends the reset authorization granted by the third correct answer.
pub async fn reset(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    Json(payload): Json<RecoveryResetRequest>,
) -> impl IntoResponse {
    const NOT_AUTHORIZED: &str = "Answer the security questions first.";

    let Some(token) = extract_session_token(&headers) else {
        return (StatusCode::FORBIDDEN, NOT_AUTHORIZED).into_response();
    };
    let token_hash = hash_session_token(&token);

    let state = match lookup_session(&pool, &token_hash).await {
        Ok(Some(state)) => state,
        Ok(None) => return (StatusCode::FORBIDDEN, NOT_AUTHORIZED).into_response(),
        Err(err) => {
            error!("Failed to lookup session: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let Some(progress) = state.recovery().filter(|progress| progress.is_authorized()) else {
        return (StatusCode::FORBIDDEN, NOT_AUTHORIZED).into_response();
    };

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

    match reset_password(&pool, progress.username(), &password_hash, &token_hash).await {
        Ok(ResetOutcome::Reset) => {
            info!("Password reset through security questions");
            (
                StatusCode::OK,
                Json(MessageResponse::new(
                    "Your password has been reset successfully.",
                )),
            )
                .into_response()
        }
        Ok(ResetOutcome::NotAuthorized) => (StatusCode::FORBIDDEN, NOT_AUTHORIZED).into_response(),
        Ok(ResetOutcome::UnknownUser) => {
            (StatusCode::NOT_FOUND, "Username not found.").into_response()
        }
        Err(err) => {
            error!("Failed to reset password: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
