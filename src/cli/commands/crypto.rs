use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_ENCRYPTION_KEY: &str = "encryption-key";

/// Read the vault encryption key from matches.
///
/// # Errors
/// Returns an error if the key is missing or blank.
pub fn encryption_key(matches: &ArgMatches) -> anyhow::Result<SecretString> {
    matches
        .get_one::<String>(ARG_ENCRYPTION_KEY)
        .filter(|value| !value.trim().is_empty())
        .map(|value| SecretString::from(value.trim().to_string()))
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --{ARG_ENCRYPTION_KEY}"))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_ENCRYPTION_KEY)
            .long(ARG_ENCRYPTION_KEY)
            .help("Key for stored password values: 32 bytes, URL-safe base64 (see `mypass keygen`)")
            .env("MYPASS_ENCRYPTION_KEY")
            .hide_env_values(true)
            .required(true),
    )
}
