//! Tracing setup for the CLI.
//!
//! Logs go to stderr so stdout stays reserved for command output. The level
//! is controlled with `PHOTO_ARCHIVE_LOG` (`debug`, `info`, `warn`, `error`,
//! or any `EnvFilter` directive); the default is `info`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "PHOTO_ARCHIVE_LOG";

pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(false),
        )
        .try_init();
}
