//! Tracing subscriber setup for the binary.

use crate::config::RuntimeConfig;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Build the filter from the configured level.
pub fn env_filter(config: &RuntimeConfig) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(&config.log_level).map_err(|e| LoggingError::InvalidFilter {
        filter: config.log_level.clone(),
        message: e.to_string(),
    })
}

/// Install the global subscriber. Call once, from `main`.
pub fn init_logging(config: &RuntimeConfig) -> Result<(), LoggingError> {
    let filter = env_filter(config)?;

    let result = if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr);
        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
    };

    result.map_err(|e| LoggingError::Install(e.to_string()))
}
