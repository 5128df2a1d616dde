use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("log filter '{directive}' is not valid")]
    Filter {
        directive: String,
        #[source]
        source: ParseError,
    },
    #[error("a global subscriber is already installed: {0}")]
    AlreadyInstalled(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// `RUST_LOG` wins when it parses; otherwise the configured level applies.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::Filter {
        directive: config.log_level.clone(),
        source,
    })
}

/// Installs the process-wide compact formatter. Call once at startup.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(env_filter(config)?)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}
