//! Bounded-concurrency batch coordinator.
//!
//! All items of a batch run as futures polled from a single task. At most
//! `concurrency` of them are in flight; whenever one reaches a terminal outcome the
//! next item is admitted. Counters and results are owned by the coordinator loop,
//! so nothing here needs a lock: in-flight items report their mid-flight progress
//! through a channel the loop drains.

use crate::batch::aggregator::ResultAggregator;
use crate::batch::error::{BatchError, ItemError};
use crate::batch::options::BatchOptions;
use crate::batch::progress::{ProgressEvent, ProgressReporter};
use crate::batch::types::{BatchItem, BatchReport, Failure, Success, TaskOutcome};
use crate::batch::ui;
use futures::FutureExt;
use futures::stream::{FuturesUnordered, StreamExt};
use oaib_abstraction::{GenerationClient, ModelResponse};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Runs batches of items against one generation client.
#[derive(Clone)]
pub struct BatchCoordinator {
    client: Arc<dyn GenerationClient>,
}

impl BatchCoordinator {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<dyn GenerationClient> {
        &self.client
    }

    /// Run every item and collect the outcomes.
    ///
    /// Item failures (provider errors, timeouts, post-processor errors, panics) are
    /// recorded in the report and never abort the batch. The returned future resolves
    /// once every item is terminal.
    ///
    /// # Errors
    /// Returns [`BatchError::InvalidConfig`] if `options` fail validation. No item is
    /// started in that case.
    pub async fn run<F, Fut, P>(
        &self,
        items: Vec<BatchItem>,
        options: BatchOptions<F>,
    ) -> Result<BatchReport<P>, BatchError>
    where
        F: Fn(ModelResponse) -> Fut,
        Fut: Future<Output = anyhow::Result<P>>,
    {
        options.validate()?;
        let mut reporter = options.spinner.then(|| ProgressReporter::new(items.len()));
        self.drive(items, &options, reporter.as_mut()).await
    }

    /// Like [`run`](Self::run), but reports progress to `reporter` whatever
    /// `options.spinner` says.
    ///
    /// The reporter should have been created for `items.len()` items. Its state
    /// holds the final counters once the future resolves.
    ///
    /// # Errors
    /// See [`BatchCoordinator::run`].
    pub async fn run_with_reporter<F, Fut, P>(
        &self,
        items: Vec<BatchItem>,
        options: BatchOptions<F>,
        reporter: &mut ProgressReporter,
    ) -> Result<BatchReport<P>, BatchError>
    where
        F: Fn(ModelResponse) -> Fut,
        Fut: Future<Output = anyhow::Result<P>>,
    {
        options.validate()?;
        self.drive(items, &options, Some(reporter)).await
    }

    async fn drive<F, Fut, P>(
        &self,
        items: Vec<BatchItem>,
        options: &BatchOptions<F>,
        mut reporter: Option<&mut ProgressReporter>,
    ) -> Result<BatchReport<P>, BatchError>
    where
        F: Fn(ModelResponse) -> Fut,
        Fut: Future<Output = anyhow::Result<P>>,
    {
        let start_time = Instant::now();
        let total = items.len();
        if total == 0 {
            debug!("Empty batch, nothing to run");
            return Ok(BatchReport::empty());
        }

        info!(
            total_items = total,
            concurrency = options.concurrency,
            timeout_ms = options.timeout.map(|t| t.as_millis() as u64),
            model_id = self.client.model_id(),
            "Starting batch"
        );

        let (events_tx, mut events_rx) = mpsc::unbounded_channel::<ProgressEvent>();
        let events = reporter.is_some().then_some(&events_tx);

        let mut aggregator = ResultAggregator::with_capacity(total);
        let mut pending = items.into_iter().enumerate();
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < options.concurrency {
                let Some((index, item)) = pending.next() else {
                    break;
                };
                debug!(index, active = in_flight.len() + 1, "Admitting batch item");
                if let Some(reporter) = reporter.as_deref_mut() {
                    reporter.on_item_started(index, item.last_message_content());
                }
                in_flight.push(self.execute_item(index, item, options, events));
            }

            tokio::select! {
                biased;
                Some(event) = events_rx.recv() => {
                    if let Some(reporter) = reporter.as_deref_mut() {
                        reporter.apply(event);
                    }
                }
                outcome = in_flight.next() => {
                    // Empty only once every item has been admitted and settled.
                    let Some(outcome) = outcome else {
                        break;
                    };
                    while let Ok(event) = events_rx.try_recv() {
                        if let Some(reporter) = reporter.as_deref_mut() {
                            reporter.apply(event);
                        }
                    }
                    settle(outcome, &mut aggregator, reporter.as_deref_mut());
                }
            }
        }

        let failure_count = aggregator.failure_count();
        let summary = match reporter {
            Some(reporter) => reporter.on_batch_complete(failure_count),
            None => ui::render_summary(failure_count, start_time.elapsed()),
        };
        let report = aggregator.finalize(start_time.elapsed());

        info!(
            successful = report.successes.len(),
            failed = failure_count,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "{}",
            summary
        );

        Ok(report)
    }

    /// Generate, then post-process, one item.
    ///
    /// With a timeout, the deadline covers both steps. On expiry the future doing the
    /// work is dropped: the local wait ends, but a request already sent to the
    /// provider is not cancelled remotely. A panic in either step becomes an
    /// [`ItemError::Panicked`] failure for this item only.
    async fn execute_item<F, Fut, P>(
        &self,
        index: usize,
        item: BatchItem,
        options: &BatchOptions<F>,
        events: Option<&UnboundedSender<ProgressEvent>>,
    ) -> TaskOutcome<P>
    where
        F: Fn(ModelResponse) -> Fut,
        Fut: Future<Output = anyhow::Result<P>>,
    {
        let work = async {
            let response = self.client.generate(&item.messages, &options.parameters).await?;
            debug!(index, response_chars = response.content.len(), "Generation finished");
            if let Some(events) = events {
                // The receiver outlives every in-flight item.
                let _ = events.send(ProgressEvent::Finished {
                    index,
                    preview: ui::preview(&response.content),
                });
            }

            let echo = response.messages.clone();
            let result = (options.process)(response).await.map_err(ItemError::Processing)?;
            Ok::<_, ItemError>((echo, result))
        };
        let work = async {
            AssertUnwindSafe(work)
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(ItemError::Panicked(panic_message(payload.as_ref()))))
        };

        let outcome = match options.timeout {
            Some(limit) => timeout(limit, work).await.unwrap_or(Err(ItemError::Timeout(limit))),
            None => work.await,
        };

        match outcome {
            Ok((response, result)) => {
                TaskOutcome::Success(Success { index, input: item, response, result })
            }
            Err(error) => TaskOutcome::Failure(Failure { index, item, error }),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

fn settle<P>(
    outcome: TaskOutcome<P>,
    aggregator: &mut ResultAggregator<P>,
    reporter: Option<&mut ProgressReporter>,
) {
    match &outcome {
        TaskOutcome::Success(_) => {
            debug!(index = outcome.index(), "Batch item succeeded");
        }
        TaskOutcome::Failure(failure) => {
            warn!(
                index = failure.index,
                kind = failure.error.kind(),
                error = %failure.error,
                "Batch item failed"
            );
            if let Some(reporter) = reporter {
                reporter.on_item_errored(failure.index);
            }
        }
    }
    aggregator.record(outcome);
}

/// Run a batch with a one-off [`BatchCoordinator`].
///
/// # Errors
/// See [`BatchCoordinator::run`].
pub async fn run_batch<F, Fut, P>(
    client: Arc<dyn GenerationClient>,
    items: Vec<BatchItem>,
    options: BatchOptions<F>,
) -> Result<BatchReport<P>, BatchError>
where
    F: Fn(ModelResponse) -> Fut,
    Fut: Future<Output = anyhow::Result<P>>,
{
    BatchCoordinator::new(client).run(items, options).await
}
