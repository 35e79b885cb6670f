use crate::notifications::{ExpirationWorkerConfig, LogEmailSender, sweep};
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub dsn: String,
    pub window_days: u32,
    pub batch_size: usize,
}

/// Run one sweep and print what it did.
/// # Errors
/// Returns an error if the database is unreachable or the sweep fails.
pub async fn execute(args: Args) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&args.dsn)
        .await
        .context("Failed to connect to database")?;

    let config = ExpirationWorkerConfig::new()
        .with_window_days(args.window_days)
        .with_batch_size(args.batch_size)
        .normalize();
    let today = Utc::now().date_naive();
    let report = sweep(&pool, &LogEmailSender, today, &config).await?;

    info!(
        credit_cards = report.credit_cards,
        identities = report.identities,
        notifications = report.notifications,
        "expiration sweep finished"
    );
    println!(
        "credit cards: {}, identities: {}, notifications: {}, emails failed: {}",
        report.credit_cards, report.identities, report.notifications, report.emails_failed
    );

    pool.close().await;
    Ok(())
}
