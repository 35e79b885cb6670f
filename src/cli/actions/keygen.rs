use crate::vault::SecretCipher;
use anyhow::{Context, Result};

/// Print a fresh key suitable for `--encryption-key`.
/// # Errors
/// Returns an error if the system RNG fails.
pub fn execute() -> Result<()> {
    let key = SecretCipher::generate_key().context("Failed to generate encryption key")?;
    println!("{key}");
    Ok(())
}
