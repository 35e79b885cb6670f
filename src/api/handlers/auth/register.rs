use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use tracing::{error, info};

use super::{
    storage::{NewUser, RegisterOutcome, insert_user},
    types::{RegisterRequest, RegisterResponse},
    utils::{
        hash_password, normalize_email, valid_email, valid_username, validate_answer,
        validate_new_password,
    },
};
use crate::recovery::SecurityAnswers;

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created.", body = RegisterResponse),
        (status = 400, description = "Invalid input.", body = String),
        (status = 409, description = "Username or email already registered.", body = String),
    ),
    tag = "auth"
)]
/// Creates a user together with the three security answers used for recovery.
/// Registration does not log the caller in.
pub async fn register(
    pool: Extension<PgPool>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    let username = payload.username.trim();
    if !valid_username(username) {
        return (
            StatusCode::BAD_REQUEST,
            "Enter a valid username. This value may contain only letters and numbers.",
        )
            .into_response();
    }

    let email = normalize_email(&payload.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Enter a valid email address.").into_response();
    }

    if let Err(message) = validate_new_password(&payload.password, &payload.password_confirmation)
    {
        return (StatusCode::BAD_REQUEST, message).into_response();
    }

    for answer in [
        &payload.favorite_color,
        &payload.birth_city,
        &payload.first_employer,
    ] {
        if let Err(message) = validate_answer(answer) {
            return (StatusCode::BAD_REQUEST, message).into_response();
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Failed to hash password: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let answers = SecurityAnswers::new(
        payload.favorite_color,
        payload.birth_city,
        payload.first_employer,
    );
    let user = NewUser {
        username,
        email: &email,
        password_hash: &password_hash,
        answers: &answers,
    };

    match insert_user(&pool, &user).await {
        Ok(RegisterOutcome::Created(id)) => {
            info!(user_id = %id, "User registered");
            let response = RegisterResponse {
                id: id.to_string(),
                username: username.to_string(),
                message: "Account created successfully!".to_string(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Ok(RegisterOutcome::UsernameTaken) => {
            (StatusCode::CONFLICT, "This username is already taken.").into_response()
        }
        Ok(RegisterOutcome::EmailTaken) => {
            (StatusCode::CONFLICT, "This email is already registered.").into_response()
        }
        Err(err) => {
            error!("Failed to register user: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
