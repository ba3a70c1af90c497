use std::sync::atomic::{AtomicBool, Ordering};

/// Idle/busy flag of a single worker
///
/// Only the owning worker writes it. The coordinator polls it when deciding
/// whether the crawl has gone quiet; reads are best-effort.
#[derive(Debug)]
pub struct WorkerState {
    idle: AtomicBool,
}

impl WorkerState {
    /// Creates a new state; workers start out idle
    pub fn new() -> Self {
        Self {
            idle: AtomicBool::new(true),
        }
    }

    pub fn set_busy(&self) {
        self.idle.store(false, Ordering::Release);
    }

    pub fn set_idle(&self) {
        self.idle.store(true, Ordering::Release);
    }

    pub fn is_idle(&self) -> bool {
        self.idle.load(Ordering::Acquire)
    }
}

impl Default for WorkerState {
    fn default() -> Self {
        Self::new()
    }
}
