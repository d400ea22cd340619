//! Text rendering for batch progress.

use crate::batch::progress::ProgressState;
use std::time::Duration;

/// Shown before the first item starts.
pub const STARTING_MESSAGE: &str = "Starting batch job...";

/// Maximum number of characters kept from a request or response preview.
pub const PREVIEW_CHARS: usize = 40;

const ELLIPSIS: &str = "...";

/// Render the one-line status for the current state.
///
/// `elapsed` is passed in rather than read from the clock so the output is
/// deterministic for a given state.
pub fn render_status(state: &ProgressState, elapsed: Duration) -> String {
    let mut line = format!(
        "Processing | Started: {} | Finished: {} | Total: {} | Errors: {} | Elapsed: {}",
        state.started,
        state.finished,
        state.total,
        state.errors,
        format_duration(elapsed)
    );

    if let Some(eta) = state.estimate_remaining(elapsed) {
        line.push_str(&format!(" | ETA: {}", format_duration(eta)));
    }
    if let Some(request) = &state.last_request {
        line.push_str(&format!(" | > {}", request));
    }
    if let Some(response) = &state.last_response {
        line.push_str(&format!(" | < {}", response));
    }

    line
}

/// Render the final line once every item is terminal.
pub fn render_summary(failure_count: usize, elapsed: Duration) -> String {
    if failure_count == 0 {
        format!("Batch job completed successfully. ({})", format_duration(elapsed))
    } else {
        format!(
            "Batch job completed with {} errors. ({})",
            failure_count,
            format_duration(elapsed)
        )
    }
}

/// Collapse whitespace and cut `text` to [`PREVIEW_CHARS`] characters.
pub fn preview(text: &str) -> String {
    let folded = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if folded.chars().count() <= PREVIEW_CHARS {
        return folded;
    }
    let mut cut: String = folded.chars().take(PREVIEW_CHARS).collect();
    cut.push_str(ELLIPSIS);
    cut
}

/// Format duration as human-readable string.
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
