use crate::output::stats::{format_elapsed, RunStats};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt;
use std::time::Duration;

/// A point-in-time view of the crawl, rendered as the progress line
#[derive(Debug, Clone, Copy)]
pub struct ProgressSnapshot {
    pub elapsed: Duration,
    pub idle_workers: usize,
    pub queued: usize,
    pub stats: RunStats,
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} workers idling, {} URLs in the queue, {} passed, {} failed, \
             {} rejected due to overload, {:.2}MB downloaded",
            format_elapsed(self.elapsed),
            self.idle_workers,
            self.queued,
            self.stats.passed,
            self.stats.failed,
            self.stats.overloaded,
            self.stats.megabytes()
        )
    }
}

/// The single, continuously overwritten status line on stdout
#[derive(Clone)]
pub struct ProgressLine {
    bar: ProgressBar,
}

impl ProgressLine {
    /// Creates the status line; a disabled line keeps its state but never draws
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout())
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::with_template("{msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self { bar }
    }

    /// Replaces the line with the snapshot
    pub fn update(&self, snapshot: &ProgressSnapshot) {
        self.bar.set_message(snapshot.to_string());
    }

    /// Text currently shown on the line
    pub fn message(&self) -> String {
        self.bar.message()
    }

    /// Leaves the last snapshot on screen and stops redrawing
    pub fn finish(&self) {
        self.bar.finish();
    }
}
