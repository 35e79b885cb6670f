use clap::{Arg, ArgMatches, Command};

pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_SESSION_TIMEOUT_SECONDS: &str = "session-timeout-seconds";

#[derive(Debug, Clone)]
pub struct Options {
    pub frontend_base_url: String,
    pub session_timeout_seconds: u64,
}

impl Options {
    /// Parse session arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a value is missing or the timeout is zero.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let frontend_base_url = matches
            .get_one::<String>(ARG_FRONTEND_BASE_URL)
            .cloned()
            .ok_or_else(|| {
                anyhow::anyhow!("missing required argument: --{ARG_FRONTEND_BASE_URL}")
            })?;
        let session_timeout_seconds = matches
            .get_one::<u64>(ARG_SESSION_TIMEOUT_SECONDS)
            .copied()
            .filter(|seconds| *seconds > 0)
            .ok_or_else(|| {
                anyhow::anyhow!("--{ARG_SESSION_TIMEOUT_SECONDS} must be greater than zero")
            })?;

        Ok(Self {
            frontend_base_url,
            session_timeout_seconds,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend origin allowed by CORS; https enables Secure cookies")
                .env("MYPASS_FRONTEND_BASE_URL")
                .default_value("http://localhost:3000"),
        )
        .arg(
            Arg::new(ARG_SESSION_TIMEOUT_SECONDS)
                .long(ARG_SESSION_TIMEOUT_SECONDS)
                .help("Idle time after which a session is locked")
                .env("MYPASS_SESSION_TIMEOUT_SECONDS")
                .default_value("60")
                .value_parser(clap::value_parser!(u64)),
        )
}
