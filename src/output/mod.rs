//! Output module for crawl reporting
//!
//! This module handles:
//! - The per-run fetch log
//! - The live progress line
//! - Run statistics and the final summary

mod progress;
mod run_log;
pub mod stats;

pub use progress::{ProgressLine, ProgressSnapshot};
pub use run_log::{host_name, log_file_name, RunLog};
pub use stats::{format_elapsed, print_statistics, RunStats};
