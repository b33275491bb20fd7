//! Bounded worker pool over the manifest rows.
//!
//! Keeps up to `workers` items running at once; when one finishes, the next
//! row is started until the backlog is empty or a stop is requested. Returns
//! only after every dispatched item reached a terminal outcome.

use std::sync::Arc;
use tokio::task::JoinSet;

use crate::control::RunControl;
use crate::manifest::ManifestRow;

use super::item::ItemProcessor;
use super::outcome::{ItemOutcome, ItemReport};
use super::stats::RunStats;

/// What the pool did: one report per dispatched row, in completion order.
#[derive(Debug, Default)]
pub struct PoolResult {
    pub reports: Vec<ItemReport>,
    /// Rows left in the backlog because a stop was requested.
    pub not_dispatched: usize,
}

/// Runs `rows` with at most `workers` items in flight, recording each outcome
/// into `stats`. A panic in one item is caught at the item boundary and
/// counted as failed; siblings are unaffected.
pub async fn run_pool(
    rows: Vec<ManifestRow>,
    processor: Arc<ItemProcessor>,
    stats: Arc<RunStats>,
    control: &RunControl,
    workers: usize,
) -> PoolResult {
    let workers = workers.max(1);
    let mut backlog = rows.into_iter();
    let mut join_set = JoinSet::new();
    let mut reports = Vec::with_capacity(backlog.len());

    loop {
        while join_set.len() < workers && !control.is_stop_requested() {
            let Some(row) = backlog.next() else {
                break;
            };
            let processor = Arc::clone(&processor);
            let stats = Arc::clone(&stats);
            join_set.spawn(run_item(processor, stats, row));
        }

        if join_set.is_empty() {
            break;
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        match res {
            Ok(report) => reports.push(report),
            // run_item catches item panics itself; this is the runtime shutting down.
            Err(e) => tracing::error!("worker task join: {}", e),
        }
    }

    let not_dispatched = backlog.count();
    if not_dispatched > 0 {
        tracing::warn!(not_dispatched, "run stopped before the backlog was empty");
    }
    PoolResult {
        reports,
        not_dispatched,
    }
}

async fn run_item(processor: Arc<ItemProcessor>, stats: Arc<RunStats>, row: ManifestRow) -> ItemReport {
    let task_row = row.clone();
    let handle = tokio::spawn(async move { processor.process(&task_row).await });
    let outcome = match handle.await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(item = %row.item_id, error = %e, "unexpected error processing item");
            ItemOutcome::Failed
        }
    };
    stats.record(outcome);
    tracing::info!(item = %row.item_id, outcome = %outcome, "item finished");
    ItemReport { row, outcome }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FramepullConfig;
    use crate::fetch::{FetchError, MediaFetcher};
    use crate::sample::{SampleError, SampleExtractor, SampleOutcome};
    use crate::scheduler::item::ItemSettings;
    use crate::scheduler::rate_limit::RateLimiter;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Tracks how many fetches run at once; panics for "boom".
    #[derive(Default)]
    struct CountingFetcher {
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl MediaFetcher for CountingFetcher {
        async fn fetch(&self, url: &str, dest: &Path, _timeout: Duration) -> Result<(), FetchError> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            if url == "boom" {
                std::fs::write(dest, b"partial").unwrap();
                panic!("fetcher blew up");
            }
            std::fs::write(dest, b"media").unwrap();
            Ok(())
        }
    }

    struct AllFrames;

    #[async_trait]
    impl SampleExtractor for AllFrames {
        async fn extract(&self, _m: &Path, _d: &Path, _id: &str, count: usize) -> Result<SampleOutcome, SampleError> {
            Ok(SampleOutcome {
                requested: count,
                written: count,
            })
        }
    }

    fn setup(dir: &Path, fetcher: Arc<CountingFetcher>) -> Arc<ItemProcessor> {
        let mut cfg = FramepullConfig::default();
        cfg.download_dir = dir.join("dl");
        cfg.output_dir = dir.join("out");
        Arc::new(ItemProcessor::new(
            ItemSettings::from(&cfg),
            Arc::new(RateLimiter::new(Duration::ZERO, Duration::ZERO)),
            fetcher,
            Arc::new(AllFrames),
        ))
    }

    fn rows(urls: &[&str]) -> Vec<ManifestRow> {
        urls.iter()
            .enumerate()
            .map(|(i, u)| ManifestRow {
                item_id: (i + 1).to_string(),
                source_url: u.to_string(),
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn never_exceeds_worker_limit() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(CountingFetcher::default());
        let processor = setup(dir.path(), Arc::clone(&fetcher));
        let stats = Arc::new(RunStats::new(10));
        let result = run_pool(rows(&["ok"; 10]), processor, Arc::clone(&stats), &RunControl::new(), 3).await;
        assert_eq!(result.reports.len(), 10);
        assert_eq!(result.not_dispatched, 0);
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(stats.snapshot().successful, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_item_is_failed_and_pool_continues() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(CountingFetcher::default());
        let processor = setup(dir.path(), fetcher);
        let stats = Arc::new(RunStats::new(3));
        let result = run_pool(rows(&["ok", "boom", "ok"]), processor, Arc::clone(&stats), &RunControl::new(), 2).await;
        let snap = stats.snapshot();
        assert_eq!(snap.successful, 2);
        assert_eq!(snap.failed, 1);
        assert_eq!(snap.completed(), result.reports.len());
        assert!(!dir.path().join("dl").join("2_temp.mp4").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_start_dispatches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let processor = setup(dir.path(), Arc::new(CountingFetcher::default()));
        let stats = Arc::new(RunStats::new(4));
        let control = RunControl::new();
        control.request_stop();
        let result = run_pool(rows(&["ok"; 4]), processor, Arc::clone(&stats), &control, 2).await;
        assert!(result.reports.is_empty());
        assert_eq!(result.not_dispatched, 4);
        assert_eq!(stats.snapshot().completed(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_mid_run_drains_in_flight_items() {
        let dir = tempfile::tempdir().unwrap();
        let processor = setup(dir.path(), Arc::new(CountingFetcher::default()));
        let stats = Arc::new(RunStats::new(6));
        let control = RunControl::new();
        let stopper = control.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            stopper.request_stop();
        });
        let result = run_pool(rows(&["ok"; 6]), processor, Arc::clone(&stats), &control, 2).await;
        assert_eq!(result.reports.len(), 2);
        assert_eq!(result.not_dispatched, 4);
        assert_eq!(stats.snapshot().successful, 2);
    }
}
