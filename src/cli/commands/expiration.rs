use clap::{Arg, ArgMatches, Command};

pub const ARG_EXPIRATION_WINDOW_DAYS: &str = "expiration-window-days";
pub const ARG_EXPIRATION_SWEEP_SECONDS: &str = "expiration-sweep-seconds";
pub const ARG_EXPIRATION_BATCH_SIZE: &str = "expiration-batch-size";

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub window_days: u32,
    pub sweep_seconds: u64,
    pub batch_size: usize,
}

impl Options {
    /// Parse expiration arguments; the sweep interval is optional and
    /// defaults to zero where the subcommand does not define it.
    ///
    /// # Errors
    /// Returns an error if the window is missing.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let window_days = matches
            .get_one::<u32>(ARG_EXPIRATION_WINDOW_DAYS)
            .copied()
            .ok_or_else(|| {
                anyhow::anyhow!("missing required argument: --{ARG_EXPIRATION_WINDOW_DAYS}")
            })?;
        let sweep_seconds = matches
            .try_get_one::<u64>(ARG_EXPIRATION_SWEEP_SECONDS)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(0);
        let batch_size = matches
            .get_one::<usize>(ARG_EXPIRATION_BATCH_SIZE)
            .copied()
            .unwrap_or(100);

        Ok(Self {
            window_days,
            sweep_seconds,
            batch_size,
        })
    }
}

/// Window and batch size, shared by `server` and `expirations`.
#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_EXPIRATION_WINDOW_DAYS)
                .long(ARG_EXPIRATION_WINDOW_DAYS)
                .help("Days before an expiration date that a notice is created")
                .env("MYPASS_EXPIRATION_WINDOW_DAYS")
                .default_value("30")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_EXPIRATION_BATCH_SIZE)
                .long(ARG_EXPIRATION_BATCH_SIZE)
                .help("Records per table checked by one sweep")
                .env("MYPASS_EXPIRATION_BATCH_SIZE")
                .default_value("100")
                .value_parser(clap::value_parser!(usize)),
        )
}

/// Background sweep interval, `server` only.
#[must_use]
pub fn with_sweep_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_EXPIRATION_SWEEP_SECONDS)
            .long(ARG_EXPIRATION_SWEEP_SECONDS)
            .help("Seconds between background expiration sweeps (0 disables)")
            .env("MYPASS_EXPIRATION_SWEEP_SECONDS")
            .default_value("3600")
            .value_parser(clap::value_parser!(u64)),
    )
}
