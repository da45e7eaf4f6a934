use tracing_subscriber::fmt::time::uptime;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use super::SystemError;

/// Installs the global subscriber. `RUST_LOG` wins over the configured filter.
pub fn setup_tracing(config: &LoggingConfig) -> Result<(), SystemError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(uptime());

    let installed = match config.log_format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
    installed.map_err(|e| SystemError::Tracing(e.to_string()))
}
