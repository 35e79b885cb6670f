use crate::notifications::Notification;
use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{Instrument, info_span};
use uuid::Uuid;

pub struct NotificationRepo;

impl NotificationRepo {
    /// Inserts a notification inside the caller's transaction.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn create(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        message: &str,
    ) -> Result<Uuid, sqlx::Error> {
        let query = "INSERT INTO notifications (user_id, message) VALUES ($1, $2) RETURNING id";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query_scalar::<_, Uuid>(query)
            .bind(user_id)
            .bind(message)
            .fetch_one(&mut **tx)
            .instrument(span)
            .await
    }

    /// All notifications for a user, newest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<Notification>> {
        let query = r"
            SELECT id, user_id, message, is_read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        sqlx::query_as::<_, Notification>(query)
            .bind(user_id)
            .fetch_all(pool)
            .instrument(span)
            .await
            .context("Failed to list notifications")
    }

    /// Returns the user's unread notifications and marks them read in one statement.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn take_unread(pool: &PgPool, user_id: Uuid) -> Result<Vec<Notification>> {
        let query = r"
            UPDATE notifications
            SET is_read = TRUE
            WHERE user_id = $1 AND is_read = FALSE
            RETURNING id, user_id, message, FALSE AS is_read, created_at
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let mut unread = sqlx::query_as::<_, Notification>(query)
            .bind(user_id)
            .fetch_all(pool)
            .instrument(span)
            .await
            .context("Failed to mark notifications read")?;
        unread.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(unread)
    }

    /// Returns `false` when no notification with that id belongs to the user.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn mark_read(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool> {
        let query = "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .instrument(span)
            .await
            .context("Failed to mark notification read")?;
        Ok(result.rows_affected() > 0)
    }
}
