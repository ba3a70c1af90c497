//! Work queue with deduplication
//!
//! The queue itself is not synchronized; the coordinator keeps it behind its
//! lock together with the run statistics.

use std::collections::{HashSet, VecDeque};

/// FIFO of pending URLs plus the set of every URL ever accepted
#[derive(Debug, Default)]
pub struct WorkQueue {
    /// URLs waiting to be fetched, in discovery order
    pending: VecDeque<String>,

    /// Every URL ever pushed; a URL is accepted at most once per run
    seen: HashSet<String>,

    /// URLs handed out by `pop` whose outcome has not been reported yet
    in_flight: usize,

    /// Total number of URLs handed out by `pop`
    dequeued: u64,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `url` unless it has been seen before
    ///
    /// # Returns
    ///
    /// * `true` - The URL was new and is now pending
    /// * `false` - The URL was already seen; nothing changed
    pub fn push(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.pending.push_back(url);
        true
    }

    /// Removes the oldest pending URL and marks it in flight
    pub fn pop(&mut self) -> Option<String> {
        let url = self.pending.pop_front()?;
        self.in_flight += 1;
        self.dequeued += 1;
        Some(url)
    }

    /// Marks one in-flight URL as reported
    pub fn complete(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Returns true when nothing is pending and nothing is in flight
    pub fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.in_flight == 0
    }

    /// Number of pending URLs
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn dequeued(&self) -> u64 {
        self.dequeued
    }

    /// Number of distinct URLs ever accepted
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
