use crate::vault::expiration::{Expiry, ExpiryKind, ExpiryStatus, Notice};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, Row, postgres::PgRow};
use uuid::Uuid;

/// A password kept in the vault by name (`saved_passwords`).
#[derive(Debug, Clone)]
pub struct SavedPassword {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub password_ciphertext: String,
    pub suggested: bool,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for SavedPassword {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            password_ciphertext: row.try_get("password_ciphertext")?,
            suggested: row.try_get("suggested")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LoginItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub site_url: String,
    pub username: String,
    pub password_ciphertext: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for LoginItem {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            site_url: row.try_get("site_url")?,
            username: row.try_get("username")?,
            password_ciphertext: row.try_get("password_ciphertext")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreditCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cardholder_name: String,
    pub card_number: String,
    pub cvv: String,
    pub expiration: Expiry,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for CreditCard {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            cardholder_name: row.try_get("cardholder_name")?,
            card_number: row.try_get("card_number")?,
            cvv: row.try_get("cvv")?,
            expiration: Expiry::new(
                row.try_get("expiration_date")?,
                row.try_get("expiration_notified")?,
            ),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl CreditCard {
    pub fn check_expiration(&mut self, today: NaiveDate, window_days: u32) -> Option<Notice> {
        self.expiration
            .check(today, window_days)
            .map(|_| Notice::credit_card(&self.card_number))
    }
}

#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub passport_number: Option<String>,
    pub passport: Expiry,
    pub license_number: Option<String>,
    pub license: Expiry,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Identity {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            full_name: row.try_get("full_name")?,
            passport_number: row.try_get("passport_number")?,
            passport: Expiry::new(
                row.try_get("passport_expiration_date")?,
                row.try_get("passport_notified")?,
            ),
            license_number: row.try_get("license_number")?,
            license: Expiry::new(
                row.try_get("license_expiration_date")?,
                row.try_get("license_notified")?,
            ),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Identity {
    /// Passport and license are checked independently.
    pub fn check_expirations(&mut self, today: NaiveDate, window_days: u32) -> Vec<Notice> {
        [
            (ExpiryKind::Passport, &mut self.passport),
            (ExpiryKind::DriversLicense, &mut self.license),
        ]
        .into_iter()
        .filter_map(|(kind, expiry)| {
            expiry
                .check(today, window_days)
                .map(|date| Notice::document(kind, date))
        })
        .collect()
    }

    /// Display warnings for the identity list.
    #[must_use]
    pub fn warnings(&self, today: NaiveDate, window_days: u32) -> Vec<String> {
        [
            (ExpiryKind::Passport, &self.passport),
            (ExpiryKind::DriversLicense, &self.license),
        ]
        .into_iter()
        .filter_map(|(kind, expiry)| {
            expiry
                .status(today, window_days)
                .map(|status| self.warning(kind, status))
        })
        .collect()
    }

    fn warning(&self, kind: ExpiryKind, status: ExpiryStatus) -> String {
        let document = kind.document();
        match status {
            ExpiryStatus::Expired(date) => format!(
                "The {document} for {} has expired on {}. Please update it.",
                self.full_name,
                date.format("%Y-%m-%d")
            ),
            ExpiryStatus::ExpiringSoon(date) => format!(
                "The {document} for {} will expire on {}. Please renew it soon.",
                self.full_name,
                date.format("%Y-%m-%d")
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecureNote {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for SecureNote {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
