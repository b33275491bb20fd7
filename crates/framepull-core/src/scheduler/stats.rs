//! Run-wide outcome counters shared by all workers.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::outcome::ItemOutcome;

/// Counters updated concurrently by workers. `total` is fixed at creation;
/// each dispatched item records exactly one outcome.
#[derive(Debug)]
pub struct RunStats {
    total: usize,
    successful: AtomicUsize,
    partial: AtomicUsize,
    failed: AtomicUsize,
}

/// Plain copy of the counters, read after the pool drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub total: usize,
    pub successful: usize,
    pub partial: usize,
    pub failed: usize,
}

impl StatsSnapshot {
    /// Items that reached a terminal outcome.
    pub fn completed(&self) -> usize {
        self.successful + self.partial + self.failed
    }
}

impl RunStats {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            successful: AtomicUsize::new(0),
            partial: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    /// Record one item's terminal outcome. Safe from any number of tasks.
    pub fn record(&self, outcome: ItemOutcome) {
        let counter = match outcome {
            ItemOutcome::Successful => &self.successful,
            ItemOutcome::Partial => &self.partial,
            ItemOutcome::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::AcqRel);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total,
            successful: self.successful.load(Ordering::Acquire),
            partial: self.partial.load(Ordering::Acquire),
            failed: self.failed.load(Ordering::Acquire),
        }
    }
}
