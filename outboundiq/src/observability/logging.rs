//! Installation of the global tracing subscriber.

use crate::config::ContextConfig;
use crate::errors::{ConfigError, OutboundIqError};
use tracing_subscriber::EnvFilter;

/// Builds the log filter described by `config`.
pub fn build_filter(config: &ContextConfig) -> Result<EnvFilter, ConfigError> {
    let directive = config.effective_log_filter();
    EnvFilter::try_new(&directive).map_err(|e| ConfigError::LogFilter {
        filter: directive,
        message: e.to_string(),
    })
}

/// Installs a global fmt subscriber configured from `config`.
///
/// Fails if the filter is invalid or another global subscriber is already
/// installed.
pub fn init_logging(config: &ContextConfig) -> Result<(), OutboundIqError> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| OutboundIqError::Logging(e.to_string()))
}
