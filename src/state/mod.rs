//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Classification` / `FetchOutcome`: what a finished fetch reports and how it is counted
//! - `WorkerState`: per-worker idle flag polled by the coordinator

mod classification;
mod worker_state;

pub use classification::{Classification, FetchOutcome, STATUS_TIMEOUT, STATUS_UNCLASSIFIED};
pub use worker_state::WorkerState;
