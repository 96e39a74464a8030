//! Logging setup for binaries and tests embedding herald.
//!
//! The library itself only emits `tracing` events. [`init_logging`] installs
//! a `tracing-subscriber` fmt subscriber filtered by a [`LoggingConfig`].

use crate::config::{ConfigError, LoggingConfig};
use parking_lot::Mutex;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Held for the whole of [`init_logging`]; `true` once a subscriber is installed.
static INIT: Mutex<bool> = Mutex::new(false);

/// Logging initialization errors
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Config values are invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Filter directives could not be parsed
    #[error("Invalid filter directives {filter:?}: {message}")]
    Filter { filter: String, message: String },

    /// Another global subscriber is already installed
    #[error("Global subscriber already set: {0}")]
    AlreadySet(String),
}

/// Specialized Result type for logging setup
pub type LoggingResult<T> = Result<T, LoggingError>;

/// Build the `EnvFilter` directive string for `config`.
///
/// The crate's own level comes first so later directives can override it.
pub fn build_filter_string(config: &LoggingConfig) -> LoggingResult<String> {
    let level = config.level()?;
    let mut filter = format!("herald_core={}", level.as_str().to_lowercase());

    for directive in &config.directives {
        filter.push(',');
        filter.push_str(directive);
    }

    Ok(filter)
}

/// Install the global fmt subscriber.
///
/// Only the first successful call installs anything; later calls return
/// `Ok(())` without touching the installed subscriber, including calls that
/// race with the first one.
pub fn init_logging(config: &LoggingConfig) -> LoggingResult<()> {
    let mut initialized = INIT.lock();
    if *initialized {
        return Ok(());
    }

    let filter_str = build_filter_string(config)?;
    let filter = EnvFilter::try_new(&filter_str).map_err(|e| LoggingError::Filter {
        filter: filter_str.clone(),
        message: e.to_string(),
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.include_target)
        .with_ansi(config.use_ansi)
        .try_init()
        .map_err(|e| LoggingError::AlreadySet(e.to_string()))?;

    *initialized = true;
    tracing::info!(filter = %filter_str, "Logging initialized");
    Ok(())
}
