//! In-app notifications and the expiration sweep that produces them.

pub mod email;
pub mod repo;
pub mod worker;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Row, postgres::PgRow};
use uuid::Uuid;

pub use email::{EmailMessage, EmailSender, LogEmailSender};
pub use repo::NotificationRepo;
pub use worker::{ExpirationWorkerConfig, SweepReport, spawn_expiration_worker, sweep};

/// Immutable apart from `is_read`.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Notification {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            message: row.try_get("message")?,
            is_read: row.try_get("is_read")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
