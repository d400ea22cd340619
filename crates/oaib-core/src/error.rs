//! Error types for oaib core.

use crate::batch::BatchError;
use thiserror::Error;

/// Core error type for setup and configuration.
///
/// Failures of individual batch items are not errors at this level; they are
/// reported in the [`BatchReport`](crate::batch::BatchReport).
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Batch setup errors
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    /// Logging initialization errors
    #[error("Logging error: {0}")]
    Logging(String),
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for oaib core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
