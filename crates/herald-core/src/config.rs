//! Configuration for dispatchers and logging.
//!
//! All sections deserialize with defaults, so an empty TOML document is a
//! valid configuration:
//!
//! ```toml
//! [dispatcher]
//! fault_policy = "isolate"
//! trace_dispatch = true
//!
//! [logging]
//! default_level = "debug"
//! directives = ["herald_core::events=trace"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config document is not valid TOML for this schema
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is not acceptable
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

/// Specialized Result type for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

/// What a dispatch does when a listener panics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Let the panic unwind out of `dispatch`; remaining listeners do not run.
    #[default]
    Propagate,

    /// Catch the panic, log it, treat the listener as not handled and
    /// continue with the next listener.
    Isolate,
}

/// Dispatcher behaviour
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Listener panic handling
    pub fault_policy: FaultPolicy,

    /// Wrap each dispatch in a `herald.dispatch` debug span
    pub trace_dispatch: bool,
}

impl DispatcherConfig {
    pub fn with_fault_policy(mut self, fault_policy: FaultPolicy) -> Self {
        self.fault_policy = fault_policy;
        self
    }

    pub fn with_trace_dispatch(mut self, trace_dispatch: bool) -> Self {
        self.trace_dispatch = trace_dispatch;
        self
    }
}

/// Logging setup used by [`crate::logging::init_logging`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for this crate when no directive overrides it
    pub default_level: String,

    /// Extra `EnvFilter` directives, e.g. `"herald_core::events=trace"`
    pub directives: Vec<String>,

    /// Whether to include target/module
    pub include_target: bool,

    /// Whether to use ANSI colors
    pub use_ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            directives: Vec::new(),
            include_target: true,
            use_ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Parse `default_level` into a tracing level
    pub fn level(&self) -> ConfigResult<tracing::Level> {
        self.default_level
            .parse()
            .map_err(|_| ConfigError::invalid_value("logging.default_level", &self.default_level))
    }
}

/// Top-level configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeraldConfig {
    pub dispatcher: DispatcherConfig,
    pub logging: LoggingConfig,
}

impl HeraldConfig {
    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), "Loaded herald config");
        Ok(config)
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> ConfigResult<()> {
        self.logging.level()?;
        Ok(())
    }
}
