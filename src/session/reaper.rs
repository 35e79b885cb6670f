//! Removes session rows idle past the timeout.
//!
//! The guard deletes an idle session only when its token comes back. Rows
//! whose browser never returns, including anonymous recovery sessions, are
//! deleted here.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use sqlx::PgPool;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{Instrument, debug, error, info_span};

/// Delete sessions whose last activity is older than `now - timeout`.
///
/// # Errors
/// Returns an error if the timeout does not fit a date offset or the delete fails.
pub async fn prune_idle_sessions(
    pool: &PgPool,
    now: DateTime<Utc>,
    timeout: Duration,
) -> Result<u64> {
    let cutoff = now - TimeDelta::from_std(timeout).context("session timeout out of range")?;

    let query = "DELETE FROM user_sessions WHERE last_activity_at < $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let deleted = sqlx::query(query)
        .bind(cutoff)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to prune idle sessions")?;

    Ok(deleted.rows_affected())
}

/// Spawn a task that prunes idle sessions once per `timeout`.
/// Returns `None` for a zero timeout.
pub fn spawn_session_reaper(
    pool: PgPool,
    timeout: Duration,
) -> Option<tokio::task::JoinHandle<()>> {
    if timeout.is_zero() {
        return None;
    }

    Some(tokio::spawn(async move {
        loop {
            sleep(timeout).await;
            match prune_idle_sessions(&pool, Utc::now(), timeout).await {
                Ok(0) => {}
                Ok(deleted) => debug!(deleted, "pruned idle sessions"),
                Err(err) => error!("session pruning failed: {err:#}"),
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestDb;

    async fn insert_session(pool: &PgPool, tag: u8, idle_seconds: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_sessions (session_hash, authenticated, last_activity_at) \
             VALUES ($1, FALSE, $2)",
        )
        .bind(vec![tag; 32])
        .bind(Utc::now() - TimeDelta::seconds(idle_seconds))
        .execute(pool)
        .await?;
        Ok(())
    }

    #[tokio::test]
    async fn zero_timeout_spawns_nothing() -> Result<()> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/postgres")?;
        assert!(spawn_session_reaper(pool, Duration::ZERO).is_none());
        Ok(())
    }

    #[tokio::test]
    async fn prunes_only_idle_sessions() -> Result<()> {
        let Ok(db) = TestDb::new().await else {
            return Ok(());
        };
        insert_session(&db.pool, 1, 3600).await?;
        insert_session(&db.pool, 2, 61).await?;
        insert_session(&db.pool, 3, 5).await?;

        let deleted =
            prune_idle_sessions(&db.pool, Utc::now(), Duration::from_secs(60)).await?;
        assert_eq!(deleted, 2);

        let remaining: Vec<Vec<u8>> = sqlx::query_scalar("SELECT session_hash FROM user_sessions")
            .fetch_all(&db.pool)
            .await?;
        assert_eq!(remaining, vec![vec![3u8; 32]]);

        let deleted =
            prune_idle_sessions(&db.pool, Utc::now(), Duration::from_secs(60)).await?;
        assert_eq!(deleted, 0);
        Ok(())
    }
}
