use crate::{
    api::{
        self,
        handlers::{auth::AuthConfig, vault::VaultState},
    },
    notifications::ExpirationWorkerConfig,
    vault::SecretCipher,
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub encryption_key: SecretString,
    pub frontend_base_url: String,
    pub session_timeout_seconds: u64,
    pub expiration_window_days: u32,
    pub expiration_sweep_seconds: u64,
    pub expiration_batch_size: usize,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the encryption key is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let cipher = SecretCipher::from_base64(args.encryption_key.expose_secret())
        .context("Invalid --encryption-key")?;

    let auth_config = AuthConfig::new(args.frontend_base_url)
        .with_session_timeout_seconds(args.session_timeout_seconds);

    let vault_state =
        VaultState::new(cipher).with_expiration_window_days(args.expiration_window_days);

    let worker_config = ExpirationWorkerConfig::new()
        .with_interval_seconds(args.expiration_sweep_seconds)
        .with_window_days(args.expiration_window_days)
        .with_batch_size(args.expiration_batch_size);

    debug!(
        port = args.port,
        session_timeout_seconds = auth_config.session_timeout_seconds(),
        expiration_window_days = vault_state.expiration_window_days(),
        "starting server"
    );

    api::new(args.port, args.dsn, auth_config, vault_state, worker_config).await
}
