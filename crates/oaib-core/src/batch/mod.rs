//! Batch processing: run many generate-then-process jobs under a concurrency cap.

pub mod aggregator;
pub mod coordinator;
pub mod error;
pub mod options;
pub mod progress;
pub mod types;
pub mod ui;

pub use aggregator::ResultAggregator;
pub use coordinator::{BatchCoordinator, run_batch};
pub use error::{BatchError, ItemError};
pub use options::{BatchOptions, DEFAULT_CONCURRENCY};
pub use progress::{ProgressEvent, ProgressReporter, ProgressState};
pub use types::{BatchItem, BatchReport, Failure, RESERVED_KEYS, Success, TaskOutcome};
