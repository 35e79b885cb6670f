use crate::cli::telemetry::LogFormat;
use clap::{Arg, Command, builder::ValueParser};

pub const ARG_VERBOSITY: &str = "verbosity";
pub const ARG_LOG_FORMAT: &str = "log-format";

/// Accepts `0..=5` or a level name.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>()
            && parsed <= 5
        {
            return Ok(parsed);
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("MYPASS_LOG_LEVEL")
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
    .arg(
        Arg::new(ARG_LOG_FORMAT)
            .long(ARG_LOG_FORMAT)
            .help("Log output format")
            .env("MYPASS_LOG_FORMAT")
            .global(true)
            .default_value("text")
            .value_parser(LogFormat::NAMES),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> Command {
        with_args(Command::new("mypass").subcommand(Command::new("server")))
    }

    #[test]
    fn log_format_defaults_to_text() -> anyhow::Result<()> {
        temp_env::with_var_unset("MYPASS_LOG_FORMAT", || {
            let matches = command().try_get_matches_from(["mypass", "server"])?;
            assert_eq!(
                matches.get_one::<String>(ARG_LOG_FORMAT).map(String::as_str),
                Some("text")
            );
            Ok::<_, anyhow::Error>(())
        })
    }

    #[test]
    fn log_format_after_subcommand_and_from_env() -> anyhow::Result<()> {
        let matches =
            command().try_get_matches_from(["mypass", "server", "--log-format", "json"])?;
        let format = matches
            .subcommand_matches("server")
            .and_then(|server| server.get_one::<String>(ARG_LOG_FORMAT))
            .and_then(|name| LogFormat::from_name(name));
        assert_eq!(format, Some(LogFormat::Json));

        temp_env::with_var("MYPASS_LOG_FORMAT", Some("json"), || {
            let matches = command().try_get_matches_from(["mypass", "server"])?;
            assert_eq!(
                matches.get_one::<String>(ARG_LOG_FORMAT).map(String::as_str),
                Some("json")
            );
            Ok::<_, anyhow::Error>(())
        })?;

        assert!(
            command()
                .try_get_matches_from(["mypass", "--log-format", "yaml", "server"])
                .is_err()
        );
        Ok(())
    }
}
