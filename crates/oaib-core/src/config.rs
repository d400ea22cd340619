//! Configuration module for oaib core.
//!
//! The core never looks for configuration files or environment variables on its
//! own. Callers hand it a [`BatchConfig`], built in code or parsed from text they
//! loaded themselves.

use crate::batch::{BatchError, BatchOptions, DEFAULT_CONCURRENCY};
use crate::error::Result;
use crate::logging::LoggingConfig;
use oaib_abstraction::ModelParameters;
use serde::Deserialize;
use std::time::Duration;

/// Serializable batch settings; everything in [`BatchOptions`] except the post-processor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of in-flight items.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-item deadline in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Whether to draw the progress spinner.
    #[serde(default = "default_true")]
    pub spinner: bool,
    /// Parameters forwarded to the generation client.
    #[serde(default)]
    pub parameters: ModelParameters,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_true() -> bool {
    true
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_ms: None,
            spinner: true,
            parameters: ModelParameters::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Parse settings from TOML text.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`](crate::error::CoreError::Config) on malformed input.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Combine these settings with a post-processor into validated [`BatchOptions`].
    ///
    /// # Errors
    /// Returns [`BatchError::InvalidConfig`] if the settings fail validation.
    pub fn into_options<F>(self, process: F) -> std::result::Result<BatchOptions<F>, BatchError> {
        let options = BatchOptions {
            timeout: self.timeout(),
            parameters: self.parameters,
            process,
            concurrency: self.concurrency,
            spinner: self.spinner,
        };
        options.validate()?;
        Ok(options)
    }
}
