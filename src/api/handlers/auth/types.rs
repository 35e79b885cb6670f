//! Request/response types for auth, account and recovery endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    /// Answer to "What is your favorite color?"
    pub favorite_color: String,
    /// Answer to "What city were you born in?"
    pub birth_city: String,
    /// Answer to "What is the name of your first employer?"
    pub first_employer: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub id: String,
    pub username: String,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub username: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    pub username: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecoveryStartRequest {
    pub username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecoveryQuestionResponse {
    pub step: usize,
    pub question: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecoveryAnswerRequest {
    pub answer: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecoveryAnswerResponse {
    pub message: String,
    /// Next question, absent once all answers are correct.
    pub question: Option<String>,
    pub reset_authorized: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecoveryResetRequest {
    pub new_password: String,
    pub new_password_confirmation: String,
}
