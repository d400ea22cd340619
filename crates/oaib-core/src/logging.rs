//! Tracing subscriber setup.

use crate::error::{CoreError, Result};
use serde::Deserialize;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Include the event target (module path) in text output.
    #[serde(default = "default_true")]
    pub with_target: bool,
}

fn default_filter() -> String {
    "oaib_core=info,warn".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_filter(), format: LogFormat::default(), with_target: true }
    }
}

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over [`LoggingConfig::filter`].
///
/// # Errors
/// Returns [`CoreError::Logging`] if the filter does not parse or a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| CoreError::Logging(format!("invalid filter '{}': {}", config.filter, e)))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(config.with_target).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init(),
    };

    installed.map_err(|e| CoreError::Logging(e.to_string()))
}
