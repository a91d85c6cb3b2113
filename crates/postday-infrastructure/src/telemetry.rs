use postday_core::config::LoggingConfig;
use postday_core::error::{PostdayError, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global `fmt` subscriber.
///
/// `RUST_LOG` wins over `logging.level` when set. Logs go to stderr so that
/// command output on stdout stays clean.
pub fn init(logging: &LoggingConfig) -> Result<()> {
    let env_filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(&logging.level),
    }
    .map_err(|err| PostdayError::config(format!("invalid log filter: {err}")))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()
        .map_err(|err| PostdayError::config(format!("failed to install tracing subscriber: {err}")))
}
