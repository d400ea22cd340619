//! Progress tracking for batch processing.
//!
//! Progress is a side channel: nothing here feeds back into the
//! [`BatchReport`](crate::batch::BatchReport), and a run with the spinner disabled
//! produces the same report.

use crate::batch::ui;
use std::time::{Duration, Instant};
use tracing::trace;

#[cfg(feature = "spinner")]
use indicatif::{ProgressBar, ProgressStyle};

/// A state change reported to the [`ProgressReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// An item was admitted; carries a preview of its outgoing message.
    Started { index: usize, preview: Option<String> },
    /// The generation call of an item returned; carries a preview of the response text.
    Finished { index: usize, preview: String },
    /// An item reached a failure outcome.
    Errored { index: usize },
}

/// Live counters of a running batch.
#[derive(Debug, Clone)]
pub struct ProgressState {
    /// Number of items in the batch.
    pub total: usize,
    /// Items admitted so far.
    pub started: usize,
    /// Items whose generation call returned.
    pub finished: usize,
    /// Items that failed, whatever the cause.
    pub errors: usize,
    /// Start time of the batch.
    pub start_time: Instant,
    /// Preview of the most recent outgoing message.
    pub last_request: Option<String>,
    /// Preview of the most recent response text.
    pub last_response: Option<String>,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            started: 0,
            finished: 0,
            errors: 0,
            start_time: Instant::now(),
            last_request: None,
            last_response: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Estimated time remaining: `elapsed / finished * (total - finished)`.
    ///
    /// Returns `None` until at least one item has finished.
    pub fn estimate_remaining(&self, elapsed: Duration) -> Option<Duration> {
        if self.finished == 0 {
            return None;
        }
        let remaining = self.total.saturating_sub(self.finished);
        Some(elapsed.mul_f64(remaining as f64 / self.finished as f64))
    }

    /// Apply one event to the counters.
    pub fn apply(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { index, preview } => {
                trace!(index, "Item started");
                self.started += 1;
                if preview.is_some() {
                    self.last_request = preview;
                }
            }
            ProgressEvent::Finished { index, preview } => {
                trace!(index, "Item finished");
                self.finished += 1;
                self.last_response = Some(preview);
            }
            ProgressEvent::Errored { index } => {
                trace!(index, "Item errored");
                self.errors += 1;
            }
        }
    }
}

/// Keeps [`ProgressState`] and redraws the status line on every change.
///
/// Redraws happen only when an event arrives; there is no timer ticking the spinner.
pub struct ProgressReporter {
    state: ProgressState,
    #[cfg(feature = "spinner")]
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a reporter drawing a spinner on stderr.
    ///
    /// Nothing is drawn when stderr is not a terminal.
    pub fn new(total: usize) -> Self {
        #[cfg(feature = "spinner")]
        {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            Self::with_bar(total, bar)
        }
        #[cfg(not(feature = "spinner"))]
        {
            Self::hidden(total)
        }
    }

    /// Create a reporter that tracks state without drawing anything.
    pub fn hidden(total: usize) -> Self {
        #[cfg(feature = "spinner")]
        {
            Self::with_bar(total, ProgressBar::hidden())
        }
        #[cfg(not(feature = "spinner"))]
        {
            Self { state: ProgressState::new(total) }
        }
    }

    #[cfg(feature = "spinner")]
    fn with_bar(total: usize, bar: ProgressBar) -> Self {
        bar.set_message(ui::STARTING_MESSAGE);
        Self { state: ProgressState::new(total), bar }
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Current status line.
    pub fn status_line(&self) -> String {
        ui::render_status(&self.state, self.state.elapsed())
    }

    /// Record an event and redraw.
    pub fn apply(&mut self, event: ProgressEvent) {
        self.state.apply(event);
        self.redraw();
    }

    pub fn on_item_started(&mut self, index: usize, outgoing: Option<&str>) {
        self.apply(ProgressEvent::Started { index, preview: outgoing.map(ui::preview) });
    }

    pub fn on_item_finished(&mut self, index: usize, response_text: &str) {
        self.apply(ProgressEvent::Finished { index, preview: ui::preview(response_text) });
    }

    pub fn on_item_errored(&mut self, index: usize) {
        self.apply(ProgressEvent::Errored { index });
    }

    /// Replace the status line with the final summary and stop drawing.
    ///
    /// Returns the summary text.
    pub fn on_batch_complete(&mut self, failure_count: usize) -> String {
        let summary = ui::render_summary(failure_count, self.state.elapsed());
        #[cfg(feature = "spinner")]
        {
            let marker = if failure_count == 0 { "✔" } else { "✖" };
            self.bar.set_style(
                ProgressStyle::with_template("{msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            self.bar.finish_with_message(format!("{} {}", marker, summary));
        }
        summary
    }

    fn redraw(&self) {
        #[cfg(feature = "spinner")]
        {
            self.bar.set_message(self.status_line());
            self.bar.tick();
        }
    }
}
