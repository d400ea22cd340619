//! Error types for batch processing.

use oaib_abstraction::ModelError;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort a whole batch before any item starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// Invalid batch options.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a single item failed.
///
/// Item failures never abort the batch; they end up in
/// [`BatchReport::failures`](crate::batch::BatchReport::failures).
#[derive(Error, Debug)]
pub enum ItemError {
    /// The generation client returned an error.
    #[error("Provider error: {0}")]
    Provider(#[from] ModelError),

    /// Generation plus post-processing did not finish in time.
    ///
    /// Only the local wait is abandoned; the provider may still be working on the request.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The post-processor rejected the response.
    #[error("Processing error: {0:#}")]
    Processing(anyhow::Error),

    /// The generation client or the post-processor panicked.
    #[error("Panicked: {0}")]
    Panicked(String),
}

impl ItemError {
    /// Short machine-readable tag for the failure cause.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Provider(_) => "provider",
            Self::Timeout(_) => "timeout",
            Self::Processing(_) => "processing",
            Self::Panicked(_) => "panic",
        }
    }

    /// Returns `true` if the item hit the batch deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
