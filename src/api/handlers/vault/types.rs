//! Request/response types for the vault endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    notifications::Notification,
    vault::models::{CreditCard, Identity, SecureNote},
};

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePasswordRequest {
    /// Account name the password belongs to.
    pub name: String,
    /// `simple` or `complex`; used when no custom password is given.
    #[serde(default)]
    pub complexity: Option<String>,
    #[serde(default)]
    pub custom_password: Option<String>,
    /// `false` returns the password without storing it.
    #[serde(default = "default_true")]
    pub save_to_vault: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatePasswordResponse {
    /// Absent when the password was not stored.
    pub id: Option<String>,
    pub name: String,
    pub password: String,
    pub suggested: bool,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SavedPasswordResponse {
    pub id: String,
    pub name: String,
    /// Decrypted value, or `Error decrypting password`.
    pub password: String,
    pub suggested: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SavedPasswordSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationResponse {
    pub id: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            message: notification.message,
            is_read: notification.is_read,
            created_at: notification.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VaultHomeResponse {
    /// Unread notifications; they are marked read by this request.
    pub notifications: Vec<NotificationResponse>,
    pub saved_passwords: Vec<SavedPasswordSummary>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginItemRequest {
    pub name: String,
    pub site_url: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginItemResponse {
    pub id: String,
    pub name: String,
    pub site_url: String,
    pub username: String,
    pub password: String,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreditCardRequest {
    pub cardholder_name: String,
    pub card_number: String,
    pub cvv: String,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreditCardResponse {
    pub id: String,
    pub cardholder_name: String,
    pub card_number: String,
    pub cvv: String,
    pub expiration_date: Option<NaiveDate>,
    pub expiration_notified: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CreditCard> for CreditCardResponse {
    fn from(card: CreditCard) -> Self {
        Self {
            id: card.id.to_string(),
            cardholder_name: card.cardholder_name,
            card_number: card.card_number,
            cvv: card.cvv,
            expiration_date: card.expiration.date,
            expiration_notified: card.expiration.notified,
            created_at: card.created_at.to_rfc3339(),
            updated_at: card.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IdentityRequest {
    pub full_name: String,
    #[serde(default)]
    pub passport_number: Option<String>,
    #[serde(default)]
    pub passport_expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub license_expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IdentityResponse {
    pub id: String,
    pub full_name: String,
    pub passport_number: Option<String>,
    pub passport_expiration_date: Option<NaiveDate>,
    pub license_number: Option<String>,
    pub license_expiration_date: Option<NaiveDate>,
    /// Expired and expiring-soon documents, as of today.
    pub warnings: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl IdentityResponse {
    pub(super) fn new(identity: Identity, today: NaiveDate, window_days: u32) -> Self {
        let warnings = identity.warnings(today, window_days);
        Self {
            id: identity.id.to_string(),
            full_name: identity.full_name,
            passport_number: identity.passport_number,
            passport_expiration_date: identity.passport.date,
            license_number: identity.license_number,
            license_expiration_date: identity.license.date,
            warnings,
            created_at: identity.created_at.to_rfc3339(),
            updated_at: identity.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SecureNoteRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SecureNoteResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<SecureNote> for SecureNoteResponse {
    fn from(note: SecureNote) -> Self {
        Self {
            id: note.id.to_string(),
            title: note.title,
            content: note.content,
            created_at: note.created_at.to_rfc3339(),
            updated_at: note.updated_at.to_rfc3339(),
        }
    }
}
