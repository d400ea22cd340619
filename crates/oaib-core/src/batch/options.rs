//! Options for one batch run.

use crate::batch::error::BatchError;
use oaib_abstraction::ModelParameters;
use std::time::Duration;

/// Maximum number of in-flight items when the caller does not choose one.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Configuration of a batch run.
///
/// `F` is the post-processor: it receives each [`ModelResponse`](oaib_abstraction::ModelResponse)
/// and returns a future resolving to the caller's value, or an error that turns the
/// item into a failure.
#[derive(Debug, Clone)]
pub struct BatchOptions<F> {
    /// Parameters forwarded to every generation call.
    pub parameters: ModelParameters,
    /// Post-processor applied to each response.
    pub process: F,
    /// Maximum number of items with a generation call or post-processing step in flight.
    pub concurrency: usize,
    /// Deadline for generation plus post-processing of one item.
    pub timeout: Option<Duration>,
    /// Whether to drive the terminal progress spinner.
    pub spinner: bool,
}

impl<F> BatchOptions<F> {
    /// Create options with default settings around a post-processor.
    pub fn new(process: F) -> Self {
        Self {
            parameters: ModelParameters::default(),
            process,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: None,
            spinner: true,
        }
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_spinner(mut self, spinner: bool) -> Self {
        self.spinner = spinner;
        self
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: ModelParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Check the options before any item is started.
    ///
    /// # Errors
    /// Returns [`BatchError::InvalidConfig`] for a zero concurrency or a zero timeout.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.concurrency == 0 {
            return Err(BatchError::InvalidConfig("concurrency must be at least 1".to_string()));
        }
        if self.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(BatchError::InvalidConfig("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}
