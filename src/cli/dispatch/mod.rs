//! Map parsed CLI matches to an [`Action`].

use crate::cli::actions::{Action, expirations, server};
use crate::cli::commands::{
    ARG_PORT, CMD_EXPIRATIONS, CMD_KEYGEN, CMD_SERVER, crypto, database, expiration, session,
};
use anyhow::{Result, anyhow};

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some((CMD_SERVER, sub)) => {
            let session_opts = session::Options::parse(sub)?;
            let expiration_opts = expiration::Options::parse(sub)?;

            Ok(Action::Server(server::Args {
                port: sub.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080),
                dsn: database::dsn(sub)?,
                encryption_key: crypto::encryption_key(sub)?,
                frontend_base_url: session_opts.frontend_base_url,
                session_timeout_seconds: session_opts.session_timeout_seconds,
                expiration_window_days: expiration_opts.window_days,
                expiration_sweep_seconds: expiration_opts.sweep_seconds,
                expiration_batch_size: expiration_opts.batch_size,
            }))
        }
        Some((CMD_KEYGEN, _)) => Ok(Action::Keygen),
        Some((CMD_EXPIRATIONS, sub)) => {
            let expiration_opts = expiration::Options::parse(sub)?;
            Ok(Action::Expirations(expirations::Args {
                dsn: database::dsn(sub)?,
                window_days: expiration_opts.window_days,
                batch_size: expiration_opts.batch_size,
            }))
        }
        Some((name, _)) => Err(anyhow!("unknown subcommand: {name}")),
        None => Err(anyhow!("missing subcommand")),
    }
}
