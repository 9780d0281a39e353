//! Logging setup
//!
//! Logs go to stderr so notifications on stdout stay clean (and parseable
//! in `--json` mode).
//!
//! Filter precedence: `--log-level`, then `GUILDPLAY_LOG`, then the config
//! file, then `warn`.

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const LOG_ENV: &str = "GUILDPLAY_LOG";
pub const DEFAULT_FILTER: &str = "warn";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{0}': {1}")]
    InvalidFilter(String, String),

    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Pick the filter string from the sources in precedence order
pub fn select_filter(cli: Option<&str>, env: Option<&str>, config: Option<&str>) -> String {
    cli.or(env)
        .or(config)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// Install the global subscriber
pub fn init_logging(cli: Option<&str>, config: Option<&str>) -> Result<(), LoggingError> {
    let env = std::env::var(LOG_ENV).ok();
    let directives = select_filter(cli, env.as_deref(), config);
    let filter = EnvFilter::try_new(&directives)
        .map_err(|e| LoggingError::InvalidFilter(directives.clone(), e.to_string()))?;

    Registry::default()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| LoggingError::TracingInit(e.to_string()))
}
