//! oaib core - bounded-concurrency batch execution against a generation provider.
//!
//! This crate provides:
//! - The batch coordinator (admission under a concurrency cap, per-item timeout,
//!   per-item failure isolation)
//! - Live progress reporting on a terminal status line
//! - Configuration and logging setup
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use oaib_abstraction::GenerationClient;
//! use oaib_core::batch::{BatchItem, BatchOptions, run_batch};
//!
//! async fn score(client: Arc<dyn GenerationClient>) -> oaib_core::Result<()> {
//!     let items = vec![BatchItem::from_prompt("Count the characters in abc").with_data("solution", 3)];
//!     let options = BatchOptions::new(|response: oaib_abstraction::ModelResponse| async move {
//!         Ok::<_, anyhow::Error>(response.content.trim().parse::<usize>()?)
//!     });
//!     let report = run_batch(client, items, options).await?;
//!     println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod logging;

pub use batch::{
    BatchCoordinator, BatchError, BatchItem, BatchOptions, BatchReport, Failure, ItemError,
    Success, run_batch,
};
pub use config::BatchConfig;
pub use error::{CoreError, Result};
pub use logging::{LogFormat, LoggingConfig, init_logging};
