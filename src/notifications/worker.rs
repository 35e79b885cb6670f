//! Expiration sweep.
//!
//! Applies the save-time expiration rule to every stored credit card and
//! identity. Rows are locked with `FOR UPDATE SKIP LOCKED`, so a sweep running
//! next to an API write (or another sweep) never double-notifies. Emails go out
//! only after the transaction commits.

use crate::notifications::{EmailMessage, EmailSender, NotificationRepo};
use crate::vault::{
    events::{self, VaultEvent},
    expiration::{self, DEFAULT_WINDOW_DAYS},
    models::{CreditCard, Identity},
};
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{Instrument, error, info, info_span};

#[derive(Clone, Copy, Debug)]
pub struct ExpirationWorkerConfig {
    interval: Duration,
    window_days: u32,
    batch_size: usize,
}

impl ExpirationWorkerConfig {
    /// Hourly sweep over a 30-day window, 100 records per table per pass.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            window_days: DEFAULT_WINDOW_DAYS,
            batch_size: 100,
        }
    }

    #[must_use]
    pub const fn with_interval_seconds(mut self, seconds: u64) -> Self {
        self.interval = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub const fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn normalize(self) -> Self {
        Self {
            batch_size: self.batch_size.max(1),
            ..self
        }
    }

    /// A zero interval disables the background worker.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub const fn window_days(&self) -> u32 {
        self.window_days
    }

    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl Default for ExpirationWorkerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub credit_cards: usize,
    pub identities: usize,
    pub notifications: usize,
    pub emails_failed: usize,
}

/// Spawn a background task that runs the sweep on a fixed interval.
/// Returns `None` when the interval is zero.
pub fn spawn_expiration_worker(
    pool: PgPool,
    sender: Arc<dyn EmailSender>,
    config: ExpirationWorkerConfig,
) -> Option<tokio::task::JoinHandle<()>> {
    let config = config.normalize();
    if !config.is_enabled() {
        info!("expiration sweep disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        loop {
            let today = Utc::now().date_naive();
            match sweep(&pool, sender.as_ref(), today, &config).await {
                Ok(report) => info!(
                    credit_cards = report.credit_cards,
                    identities = report.identities,
                    notifications = report.notifications,
                    emails_failed = report.emails_failed,
                    "expiration sweep finished"
                ),
                Err(err) => error!("expiration sweep failed: {err:#}"),
            }

            sleep(config.interval()).await;
        }
    }))
}

/// Notify every credit card and identity due on or before `today + window`.
///
/// Each table is drained in batches of `batch_size`; a batch commits before
/// its emails go out. Every selected row gets flagged, so a batch shorter than
/// `batch_size` means the table is done.
///
/// # Errors
/// Returns an error if a query or a commit fails. Batches committed before the
/// failure stay committed and their emails are sent.
pub async fn sweep(
    pool: &PgPool,
    sender: &dyn EmailSender,
    today: NaiveDate,
    config: &ExpirationWorkerConfig,
) -> Result<SweepReport> {
    let config = &config.normalize();
    let mut report = SweepReport::default();

    loop {
        let (cards, mail) = sweep_credit_cards(pool, today, config).await?;
        report.credit_cards += cards;
        deliver(sender, mail, &mut report);
        if cards < config.batch_size() {
            break;
        }
    }

    loop {
        let (identities, mail) = sweep_identities(pool, today, config).await?;
        report.identities += identities;
        deliver(sender, mail, &mut report);
        if identities < config.batch_size() {
            break;
        }
    }

    Ok(report)
}

fn deliver(sender: &dyn EmailSender, mail: Vec<EmailMessage>, report: &mut SweepReport) {
    report.notifications += mail.len();
    for message in &mail {
        if let Err(err) = sender.send(message) {
            report.emails_failed += 1;
            error!(to_email = %message.to_email, "expiration email failed: {err}");
        }
    }
}

async fn sweep_credit_cards(
    pool: &PgPool,
    today: NaiveDate,
    config: &ExpirationWorkerConfig,
) -> Result<(usize, Vec<EmailMessage>)> {
    let mut tx = pool
        .begin()
        .await
        .context("failed to start credit card sweep transaction")?;

    let query = r"
        SELECT c.id, c.user_id, c.cardholder_name, c.card_number, c.cvv,
               c.expiration_date, c.expiration_notified, c.created_at, c.updated_at,
               u.email
        FROM credit_cards c
        JOIN users u ON u.id = c.user_id
        WHERE c.expiration_notified = FALSE
          AND c.expiration_date IS NOT NULL
          AND c.expiration_date <= $1
        ORDER BY c.expiration_date ASC
        LIMIT $2
        FOR UPDATE OF c SKIP LOCKED
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .bind(expiration::threshold(today, config.window_days()))
        .bind(i64::try_from(config.batch_size()).unwrap_or(i64::MAX))
        .fetch_all(&mut *tx)
        .instrument(span)
        .await
        .context("failed to load due credit cards")?;

    let mut mail = Vec::new();
    let row_count = rows.len();
    for row in rows {
        let email: String = row.try_get("email")?;
        let mut card: CreditCard = sqlx::FromRow::from_row(&row)?;
        let Some(notice) = card.check_expiration(today, config.window_days()) else {
            continue;
        };

        NotificationRepo::create(&mut tx, card.user_id, &notice.message)
            .await
            .context("failed to create credit card notification")?;
        let query = "UPDATE credit_cards SET expiration_notified = $2 WHERE id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(card.id)
            .bind(card.expiration.notified)
            .execute(&mut *tx)
            .instrument(span)
            .await
            .context("failed to flag credit card")?;

        events::record(
            card.user_id,
            &[VaultEvent::ExpirationNotified {
                kind: notice.kind,
                record_id: card.id,
            }],
        );
        mail.push(EmailMessage::expiration(email, notice.message));
    }

    tx.commit()
        .await
        .context("failed to commit credit card sweep")?;

    Ok((row_count, mail))
}

async fn sweep_identities(
    pool: &PgPool,
    today: NaiveDate,
    config: &ExpirationWorkerConfig,
) -> Result<(usize, Vec<EmailMessage>)> {
    let mut tx = pool
        .begin()
        .await
        .context("failed to start identity sweep transaction")?;

    let query = r"
        SELECT i.id, i.user_id, i.full_name,
               i.passport_number, i.passport_expiration_date, i.passport_notified,
               i.license_number, i.license_expiration_date, i.license_notified,
               i.created_at, i.updated_at,
               u.email
        FROM identities i
        JOIN users u ON u.id = i.user_id
        WHERE (i.passport_notified = FALSE AND i.passport_expiration_date <= $1)
           OR (i.license_notified = FALSE AND i.license_expiration_date <= $1)
        ORDER BY i.created_at ASC
        LIMIT $2
        FOR UPDATE OF i SKIP LOCKED
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .bind(expiration::threshold(today, config.window_days()))
        .bind(i64::try_from(config.batch_size()).unwrap_or(i64::MAX))
        .fetch_all(&mut *tx)
        .instrument(span)
        .await
        .context("failed to load due identities")?;

    let mut mail = Vec::new();
    let row_count = rows.len();
    for row in rows {
        let email: String = row.try_get("email")?;
        let mut identity: Identity = sqlx::FromRow::from_row(&row)?;
        let notices = identity.check_expirations(today, config.window_days());
        if notices.is_empty() {
            continue;
        }

        for notice in &notices {
            NotificationRepo::create(&mut tx, identity.user_id, &notice.message)
                .await
                .context("failed to create identity notification")?;
        }
        let query =
            "UPDATE identities SET passport_notified = $2, license_notified = $3 WHERE id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(identity.id)
            .bind(identity.passport.notified)
            .bind(identity.license.notified)
            .execute(&mut *tx)
            .instrument(span)
            .await
            .context("failed to flag identity")?;

        let recorded: Vec<VaultEvent> = notices
            .iter()
            .map(|notice| VaultEvent::ExpirationNotified {
                kind: notice.kind,
                record_id: identity.id,
            })
            .collect();
        events::record(identity.user_id, &recorded);

        mail.extend(
            notices
                .into_iter()
                .map(|notice| EmailMessage::expiration(email.clone(), notice.message)),
        );
    }

    tx.commit()
        .await
        .context("failed to commit identity sweep")?;

    Ok((row_count, mail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ExpirationWorkerConfig::default();
        assert_eq!(config.interval(), Duration::from_secs(3600));
        assert_eq!(config.window_days(), 30);
        assert!(config.is_enabled());
    }

    #[test]
    fn zero_interval_disables() {
        let config = ExpirationWorkerConfig::new().with_interval_seconds(0);
        assert!(!config.is_enabled());
    }

    #[test]
    fn normalize_clamps_batch_size() {
        let config = ExpirationWorkerConfig::new().with_batch_size(0).normalize();
        assert_eq!(config.batch_size(), 1);
    }

    #[tokio::test]
    async fn disabled_worker_is_not_spawned() -> Result<()> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/postgres")?;
        let handle = spawn_expiration_worker(
            pool,
            Arc::new(crate::notifications::LogEmailSender),
            ExpirationWorkerConfig::new().with_interval_seconds(0),
        );
        assert!(handle.is_none());
        Ok(())
    }
}
