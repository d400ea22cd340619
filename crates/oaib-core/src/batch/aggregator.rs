//! Collects task outcomes into a [`BatchReport`].

use crate::batch::types::{BatchReport, Failure, Success, TaskOutcome};
use std::time::Duration;

/// Appends each outcome to the matching sequence in the order it arrives.
#[derive(Debug)]
pub struct ResultAggregator<P> {
    successes: Vec<Success<P>>,
    failures: Vec<Failure>,
}

impl<P> Default for ResultAggregator<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ResultAggregator<P> {
    pub fn new() -> Self {
        Self { successes: Vec::new(), failures: Vec::new() }
    }

    /// Pre-size the success sequence for a batch of `total` items.
    pub fn with_capacity(total: usize) -> Self {
        Self { successes: Vec::with_capacity(total), failures: Vec::new() }
    }

    pub fn record(&mut self, outcome: TaskOutcome<P>) {
        match outcome {
            TaskOutcome::Success(success) => self.successes.push(success),
            TaskOutcome::Failure(failure) => self.failures.push(failure),
        }
    }

    /// Number of outcomes recorded so far.
    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Hand over the accumulated outcomes.
    pub fn finalize(self, elapsed: Duration) -> BatchReport<P> {
        BatchReport { successes: self.successes, failures: self.failures, elapsed }
    }
}
