//! Run statistics
//!
//! Counters are only ever incremented, and only while the coordinator holds
//! its queue lock.

use crate::state::{Classification, FetchOutcome};
use std::time::Duration;

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Aggregate counters for one crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Fetches with a 2xx status
    pub passed: u64,

    /// Fetches that failed (HTTP errors and transport errors)
    pub failed: u64,

    /// Fetches that timed out or were answered with 503
    pub overloaded: u64,

    /// Body bytes of passed fetches
    pub total_bytes: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one reported outcome and returns its classification
    pub fn record(&mut self, outcome: &FetchOutcome) -> Classification {
        let classification = outcome.classification();
        match classification {
            Classification::Passed => {
                self.passed += 1;
                self.total_bytes += outcome.bytes;
            }
            Classification::Overloaded => self.overloaded += 1,
            Classification::Failed => self.failed += 1,
        }
        classification
    }

    /// Total number of reports recorded
    pub fn total(&self) -> u64 {
        self.passed + self.failed + self.overloaded
    }

    pub fn megabytes(&self) -> f64 {
        self.total_bytes as f64 / BYTES_PER_MB
    }
}

/// Prints the end-of-run summary to stdout
pub fn print_statistics(stats: &RunStats, elapsed: Duration) {
    println!("=== Crawl Statistics ===\n");

    println!("  Fetched: {}", stats.total());
    println!("  Passed: {}", stats.passed);
    println!("  Failed: {}", stats.failed);
    println!("  Overloaded: {}", stats.overloaded);
    println!("  Downloaded: {:.2}MB", stats.megabytes());
    println!("  Elapsed: {}", format_elapsed(elapsed));

    let success_rate = if stats.total() > 0 {
        (stats.passed as f64 / stats.total() as f64) * 100.0
    } else {
        0.0
    };
    println!("\nSuccess Rate: {:.1}%", success_rate);
}

/// Formats a duration as `mm:ss`; minutes keep growing past 59
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
