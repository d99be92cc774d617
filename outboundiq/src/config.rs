//! Configuration for user context extraction and logging.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Subject type used when a principal carries no type information.
pub const DEFAULT_SUBJECT_TYPE: &str = "User";

/// Origin kind stamped on identities derived from an authenticated principal.
pub const ORIGIN_AUTHENTICATED: &str = "authenticated";

/// Configuration for the request context subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Subject type used when the principal has no type, role or type name.
    #[serde(default = "default_subject_type")]
    pub default_subject_type: String,
    /// Origin kind attached to extracted identities.
    #[serde(default = "default_origin_kind")]
    pub origin_kind: String,
    /// Whether the principal's Rust type name may be used as its subject type.
    #[serde(default = "default_infer_type_from_type_name")]
    pub infer_type_from_type_name: bool,
    /// Enables debug-level logging when no explicit filter is given.
    #[serde(default)]
    pub debug: bool,
    /// `EnvFilter` directive for the logging subscriber.
    #[serde(default)]
    pub log_filter: Option<String>,
    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json_logs: bool,
}

fn default_subject_type() -> String {
    DEFAULT_SUBJECT_TYPE.to_string()
}

fn default_origin_kind() -> String {
    ORIGIN_AUTHENTICATED.to_string()
}

fn default_infer_type_from_type_name() -> bool {
    true
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            default_subject_type: default_subject_type(),
            origin_kind: default_origin_kind(),
            infer_type_from_type_name: default_infer_type_from_type_name(),
            debug: false,
            log_filter: None,
            json_logs: false,
        }
    }
}

impl ContextConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from a JSON document.
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Sets the default subject type.
    #[must_use]
    pub fn with_default_subject_type(mut self, subject_type: impl Into<String>) -> Self {
        self.default_subject_type = subject_type.into();
        self
    }

    /// Sets the origin kind.
    #[must_use]
    pub fn with_origin_kind(mut self, origin_kind: impl Into<String>) -> Self {
        self.origin_kind = origin_kind.into();
        self
    }

    /// Enables or disables the type-name fallback for subject types.
    #[must_use]
    pub fn with_type_name_inference(mut self, enabled: bool) -> Self {
        self.infer_type_from_type_name = enabled;
        self
    }

    /// Enables debug logging.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the log filter directive.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    /// Switches log output to JSON.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Returns the filter directive the logging subscriber should use.
    #[must_use]
    pub fn effective_log_filter(&self) -> String {
        match &self.log_filter {
            Some(filter) => filter.clone(),
            None if self.debug => "outboundiq=debug".to_string(),
            None => "outboundiq=info".to_string(),
        }
    }
}
