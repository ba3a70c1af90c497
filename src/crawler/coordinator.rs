//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the shared state every worker talks to, including:
//! - The deduplicating work queue
//! - Run statistics and the run log
//! - Spawning and joining workers
//! - Detecting quiescence and handling interrupts

use crate::config::CrawlConfig;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::queue::WorkQueue;
use crate::crawler::worker::Worker;
use crate::output::{ProgressLine, ProgressSnapshot, RunLog, RunStats};
use crate::state::{FetchOutcome, WorkerState};
use crate::Result;
use reqwest::Client;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;

/// State guarded by the coordinator lock
#[derive(Debug, Default)]
struct Shared {
    queue: WorkQueue,
    stats: RunStats,
    finished: bool,
}

/// How a crawl run ended
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Final statistics
    pub stats: RunStats,

    /// URLs handed to workers over the run
    pub dequeued: u64,

    /// Wall-clock duration of the run
    pub elapsed: Duration,

    /// Whether the run was stopped by an interrupt instead of draining
    pub interrupted: bool,

    /// Location of the run log
    pub log_path: PathBuf,
}

impl CrawlOutcome {
    /// A run succeeds when it drained on its own
    pub fn is_success(&self) -> bool {
        !self.interrupted
    }
}

/// Main crawler coordinator structure
///
/// The queue, the seen-set and the statistics share one lock that is held only
/// for in-memory updates. Waiting for work is signalled separately through
/// `work_ready`.
pub struct Coordinator {
    config: CrawlConfig,
    client: Client,
    shared: Mutex<Shared>,
    work_ready: Notify,
    log: RunLog,
    progress: bool,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Builds the HTTP client and creates the run log in `config.log_dir`.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HydraError)` - The client or the run log could not be created
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let client = build_http_client(&config)?;
        let log = RunLog::create(&config.log_dir)?;
        tracing::info!("Logging fetches to {}", log.path().display());

        Ok(Self {
            config,
            client,
            shared: Mutex::new(Shared::default()),
            work_ready: Notify::new(),
            log,
            progress: false,
        })
    }

    /// Enables the live progress line and shutdown messages on stdout
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Schedules `url` unless it has been seen before or the run is over
    ///
    /// # Returns
    ///
    /// * `true` - The URL is new and now pending
    /// * `false` - Duplicate, or the run has finished
    pub fn enqueue(&self, url: String) -> bool {
        let accepted = {
            let mut shared = self.lock();
            !shared.finished && shared.queue.push(url)
        };

        if accepted {
            self.work_ready.notify_one();
        }
        accepted
    }

    /// Takes the next pending URL, waiting while the queue is empty
    ///
    /// Returns `None` once the run has been told to finish.
    pub async fn take(&self) -> Option<String> {
        loop {
            // Register before checking so a wake-up between the check and the
            // await is not lost
            let notified = self.work_ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut shared = self.lock();
                if shared.finished {
                    return None;
                }
                if let Some(url) = shared.queue.pop() {
                    return Some(url);
                }
            }

            notified.await;
        }
    }

    /// Records the outcome of one fetch
    pub fn report(&self, outcome: FetchOutcome) {
        let classification = {
            let mut shared = self.lock();
            shared.queue.complete();
            shared.stats.record(&outcome)
        };

        tracing::trace!("{} classified as {}", outcome.url, classification);

        if let Err(e) = self.log.append(&outcome) {
            tracing::error!("Failed to write run log {}: {}", self.log.path().display(), e);
        }
    }

    /// Stops handing out work and wakes every waiting worker
    pub fn finish(&self) {
        self.lock().finished = true;
        self.work_ready.notify_waiters();
    }

    pub fn stats(&self) -> RunStats {
        self.lock().stats
    }

    /// Number of URLs waiting to be fetched
    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    /// Number of URLs handed to workers so far
    pub fn dequeued(&self) -> u64 {
        self.lock().queue.dequeued()
    }

    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    /// Crawls from `seed` until the run drains or Ctrl-C is pressed
    pub async fn run(self: &Arc<Self>, seed: &str) -> Result<CrawlOutcome> {
        self.run_until(seed, async {
            if tokio::signal::ctrl_c().await.is_err() {
                tracing::warn!("Unable to listen for Ctrl-C, interrupts are disabled");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Crawls from `seed` until the run drains or `interrupt` completes
    ///
    /// Once per monitoring interval the coordinator samples every worker's idle
    /// flag. The run counts as drained when all workers read idle and, under
    /// the queue lock, nothing is pending or in flight. Both paths end the
    /// same way: no more work is handed out, waiting workers are woken, and
    /// every worker is joined. In-flight fetches are never aborted.
    pub async fn run_until<F>(
        self: &Arc<Self>,
        seed: &str,
        interrupt: F,
    ) -> Result<CrawlOutcome>
    where
        F: Future<Output = ()>,
    {
        let start = Instant::now();
        self.enqueue(seed.to_string());

        let worker_count = self.config.max_workers;
        tracing::info!("Starting crawl of {} with {} workers", seed, worker_count);

        let mut states = Vec::with_capacity(worker_count);
        let mut handles = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let state = Arc::new(WorkerState::new());
            let worker = Worker::new(
                id,
                Arc::clone(self),
                self.client.clone(),
                Arc::clone(&state),
            );
            handles.push(tokio::spawn(worker.run()));
            states.push(state);
        }

        let line = ProgressLine::new(self.progress);
        let mut ticker = tokio::time::interval(self.config.monitor_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(interrupt);

        let interrupted = loop {
            tokio::select! {
                _ = &mut interrupt => break true,
                _ = ticker.tick() => {
                    let idle = states.iter().filter(|s| s.is_idle()).count();
                    let (queued, stats, drained) = {
                        let shared = self.lock();
                        (shared.queue.len(), shared.stats, shared.queue.is_drained())
                    };

                    line.update(&ProgressSnapshot {
                        elapsed: start.elapsed(),
                        idle_workers: idle,
                        queued,
                        stats,
                    });

                    if idle == worker_count && drained {
                        break false;
                    }
                }
            }
        };

        line.finish();
        if self.progress {
            if interrupted {
                println!("Aborting!");
            }
            println!("Stopping workers...");
        }
        if interrupted {
            tracing::warn!("Interrupted, waiting for in-flight fetches");
        } else {
            tracing::info!("Queue drained, stopping workers");
        }

        self.finish();

        if self.progress {
            println!("Waiting for workers to finish...");
        }
        for (id, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!("Worker {} terminated abnormally: {}", id, e);
            }
        }

        let (stats, dequeued) = {
            let shared = self.lock();
            (shared.stats, shared.queue.dequeued())
        };

        tracing::info!(
            "Crawl finished in {:?}: {} passed, {} failed, {} overloaded",
            start.elapsed(),
            stats.passed,
            stats.failed,
            stats.overloaded
        );

        Ok(CrawlOutcome {
            stats,
            dequeued,
            elapsed: start.elapsed(),
            interrupted,
            log_path: self.log.path().to_path_buf(),
        })
    }
}
