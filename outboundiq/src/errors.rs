//! Error types for the outboundiq crate.
//!
//! Context propagation itself never fails: a missing scope, a missing
//! principal or a missing resolver all resolve to "no user context". The
//! errors below cover the ambient surface around it (configuration, logging
//! setup and scoped task groups).

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for outboundiq operations.
#[derive(Debug, Error)]
pub enum OutboundIqError {
    /// The configuration could not be parsed.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// A global tracing subscriber could not be installed.
    #[error("Logging initialization failed: {0}")]
    Logging(String),

    /// A task spawned in a scoped task group failed.
    #[error("{0}")]
    Task(#[from] TaskError),
}

/// Error raised when a [`ContextConfig`](crate::config::ContextConfig) cannot be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration document is not valid JSON for the config schema.
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The log filter directive was rejected by the subscriber.
    #[error("Invalid log filter '{filter}': {message}")]
    LogFilter {
        /// The offending directive.
        filter: String,
        /// The parser message.
        message: String,
    },
}

/// Errors produced by tasks in a [`ScopedTaskGroup`](crate::context::ScopedTaskGroup).
#[derive(Debug, Clone, Error)]
pub enum TaskError {
    /// The task returned an error.
    #[error("Task '{name}' failed: {message}")]
    Failed {
        /// The task name.
        name: String,
        /// The error message returned by the task.
        message: String,
    },

    /// The task panicked or was aborted before completing.
    #[error("Task '{name}' did not complete: {message}")]
    Join {
        /// The task name.
        name: String,
        /// The join error description.
        message: String,
    },
}

impl TaskError {
    /// Returns the name of the task that produced this error.
    #[must_use]
    pub fn task_name(&self) -> &str {
        match self {
            Self::Failed { name, .. } | Self::Join { name, .. } => name,
        }
    }
}
