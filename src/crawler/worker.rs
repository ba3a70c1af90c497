//! Crawl worker
//!
//! A worker pulls URLs from the coordinator until told there is no more work.
//! Every fetch ends in exactly one report, whatever happened on the wire.

use crate::crawler::coordinator::Coordinator;
use crate::crawler::fetcher::{fetch_url, is_html, FetchResult, ResponseSink};
use crate::crawler::parser::LinkExtractor;
use crate::state::{FetchOutcome, WorkerState};
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use std::sync::Arc;

pub struct Worker {
    id: usize,
    coordinator: Arc<Coordinator>,
    client: Client,
    state: Arc<WorkerState>,
    extractor: LinkExtractor,
}

impl Worker {
    pub fn new(
        id: usize,
        coordinator: Arc<Coordinator>,
        client: Client,
        state: Arc<WorkerState>,
    ) -> Self {
        Self {
            id,
            coordinator,
            client,
            state,
            extractor: LinkExtractor::new(),
        }
    }

    /// Runs the fetch loop until the coordinator runs out of work
    pub async fn run(mut self) {
        tracing::debug!("Worker {} started", self.id);

        while let Some(url) = self.coordinator.take().await {
            self.state.set_busy();
            let outcome = self.process_url(&url).await;
            self.coordinator.report(outcome);
            self.state.set_idle();
        }

        tracing::debug!("Worker {} stopped", self.id);
    }

    /// Fetches one URL, forwarding discovered links as they stream in
    async fn process_url(&mut self, url: &str) -> FetchOutcome {
        tracing::trace!("Worker {} fetching {}", self.id, url);

        let mut sink = PageSink {
            extractor: &mut self.extractor,
            coordinator: &self.coordinator,
            html: false,
            discovered: 0,
        };
        let result = fetch_url(&self.client, url, &mut sink).await;
        let discovered = sink.discovered;
        self.extractor.close();

        match result {
            FetchResult::Completed {
                final_url,
                status_code,
                bytes,
                elapsed,
            } => {
                tracing::debug!(
                    "{} -> {} ({} bytes, {} new links)",
                    final_url,
                    status_code,
                    bytes,
                    discovered
                );
                FetchOutcome::completed(final_url, status_code, bytes, elapsed)
            }
            FetchResult::Timeout { error, elapsed } => {
                tracing::warn!("Timeout fetching {}: {}", url, error);
                FetchOutcome::timed_out(url, elapsed)
            }
            FetchResult::NetworkError { error, elapsed } => {
                tracing::warn!("Error fetching {}: {}", url, error);
                FetchOutcome::failed(url, elapsed)
            }
        }
    }
}

/// Opens an extraction scope per response; only HTML bodies are fed to it
struct PageSink<'a> {
    extractor: &'a mut LinkExtractor,
    coordinator: &'a Coordinator,
    html: bool,
    discovered: usize,
}

impl ResponseSink for PageSink<'_> {
    fn on_headers(&mut self, final_url: &str, _status: StatusCode, headers: &HeaderMap) {
        self.html = is_html(headers);
        self.extractor.reset(final_url);
    }

    fn on_chunk(&mut self, chunk: &[u8]) {
        if !self.html {
            return;
        }

        let coordinator = self.coordinator;
        let discovered = &mut self.discovered;
        self.extractor.feed(chunk, |link| {
            if coordinator.enqueue(link) {
                *discovered += 1;
            }
        });
    }
}
