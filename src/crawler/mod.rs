//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with streamed bodies
//! - Incremental HTML link extraction
//! - The shared work queue
//! - Worker pool coordination and shutdown

mod coordinator;
mod fetcher;
mod parser;
mod queue;
mod worker;

pub use coordinator::{Coordinator, CrawlOutcome};
pub use fetcher::{build_http_client, fetch_url, is_html, FetchResult, ResponseSink};
pub use parser::LinkExtractor;
pub use queue::WorkQueue;
pub use worker::Worker;

use crate::config::CrawlConfig;
use crate::Result;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client and open the run log
/// 2. Seed the queue with `seed`
/// 3. Spawn the workers and monitor them until the crawl drains or Ctrl-C
/// 4. Join every worker and return the final statistics
///
/// # Arguments
///
/// * `config` - The crawl configuration
/// * `seed` - The URL the crawl starts from
/// * `progress` - Whether to print the live progress line
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The crawl ended (drained or interrupted)
/// * `Err(HydraError)` - The crawl could not be started
pub async fn crawl(
    config: CrawlConfig,
    seed: &str,
    progress: bool,
) -> Result<CrawlOutcome> {
    let coordinator = Arc::new(Coordinator::new(config)?.with_progress(progress));
    coordinator.run(seed).await
}
