//! Per-item pipeline: rate limit → fetch → sample → cleanup → outcome.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::FramepullConfig;
use crate::fetch::{FetchResult, MediaFetcher};
use crate::manifest::{path_component, ManifestRow};
use crate::sample::{SampleError, SampleExtractor, SampleOutcome};

use super::guard::TempFileGuard;
use super::outcome::{ItemOutcome, ItemState};
use super::rate_limit::RateLimiter;

/// Run-scoped values the processor needs, taken from the validated config.
#[derive(Debug, Clone)]
pub struct ItemSettings {
    pub download_dir: PathBuf,
    pub output_dir: PathBuf,
    pub samples_per_item: usize,
    pub fetch_timeout: Duration,
    pub sample_timeout: Option<Duration>,
    pub temp_extension: String,
}

impl From<&FramepullConfig> for ItemSettings {
    fn from(cfg: &FramepullConfig) -> Self {
        Self {
            download_dir: cfg.download_dir.clone(),
            output_dir: cfg.output_dir.clone(),
            samples_per_item: cfg.samples_per_item,
            fetch_timeout: cfg.fetch_timeout(),
            sample_timeout: cfg.sample_timeout(),
            temp_extension: cfg.fetcher.merge_output_format.clone(),
        }
    }
}

impl ItemSettings {
    /// `{download_dir}/{id}_temp.{ext}`
    pub fn temp_path(&self, id_component: &str) -> PathBuf {
        self.download_dir
            .join(format!("{}_temp.{}", id_component, self.temp_extension))
    }

    /// `{output_dir}/{id}`
    pub fn sample_dir(&self, id_component: &str) -> PathBuf {
        self.output_dir.join(id_component)
    }
}

/// Drives one manifest row to a terminal outcome. Never returns an error:
/// every failure is classified, and the temp file is removed on every path.
pub struct ItemProcessor {
    settings: ItemSettings,
    limiter: Arc<RateLimiter>,
    fetcher: Arc<dyn MediaFetcher>,
    extractor: Arc<dyn SampleExtractor>,
}

impl ItemProcessor {
    pub fn new(
        settings: ItemSettings,
        limiter: Arc<RateLimiter>,
        fetcher: Arc<dyn MediaFetcher>,
        extractor: Arc<dyn SampleExtractor>,
    ) -> Self {
        Self {
            settings,
            limiter,
            fetcher,
            extractor,
        }
    }

    pub fn settings(&self) -> &ItemSettings {
        &self.settings
    }

    pub async fn process(&self, row: &ManifestRow) -> ItemOutcome {
        let id = row.item_id.as_str();
        let Some(component) = path_component(id) else {
            tracing::error!(item = %id, "item id has no usable characters for a file name");
            return ItemOutcome::Failed;
        };

        let outcome = match self.run_stages(row, &component).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(item = %id, error = %format!("{:#}", e), "unexpected error processing item");
                ItemOutcome::Failed
            }
        };
        enter(id, ItemState::Terminal);
        outcome
    }

    async fn run_stages(&self, row: &ManifestRow, component: &str) -> Result<ItemOutcome> {
        let id = row.item_id.as_str();
        enter(id, ItemState::Queued);

        let waited = self.limiter.acquire().await;
        enter(id, ItemState::RateLimited);
        tracing::debug!(item = %id, waited_ms = waited.as_millis() as u64, "rate limit passed");

        let temp_path = self.settings.temp_path(component);
        let mut guard = TempFileGuard::new(temp_path, id);
        let outcome = self.fetch_and_sample(row, component, guard.path()).await;
        guard.cleanup();
        enter(id, ItemState::CleanedUp);
        outcome
    }

    async fn fetch_and_sample(
        &self,
        row: &ManifestRow,
        component: &str,
        temp_path: &Path,
    ) -> Result<ItemOutcome> {
        let id = row.item_id.as_str();
        tokio::fs::create_dir_all(&self.settings.download_dir)
            .await
            .with_context(|| format!("create download dir {}", self.settings.download_dir.display()))?;

        enter(id, ItemState::Fetching);
        tracing::info!(item = %id, url = %row.source_url, "downloading");
        let fetched = self
            .fetcher
            .fetch(&row.source_url, temp_path, self.settings.fetch_timeout)
            .await;
        let fetch = FetchResult::probe(temp_path);
        match fetched {
            Err(e) => {
                enter(id, ItemState::FetchFailed);
                tracing::error!(item = %id, error = %e, "failed to download");
                return Ok(ItemOutcome::Failed);
            }
            Ok(()) if !fetch.present => {
                enter(id, ItemState::FetchFailed);
                tracing::error!(item = %id, path = %fetch.local_path.display(), "fetcher reported success but no file was written");
                return Ok(ItemOutcome::Failed);
            }
            Ok(()) => {
                enter(id, ItemState::Fetched);
                tracing::info!(item = %id, "downloaded");
            }
        }

        enter(id, ItemState::Sampling);
        let sample_dir = self.settings.sample_dir(component);
        let outcome = match self.sample(&fetch.local_path, &sample_dir, component).await {
            Ok(samples) => {
                let outcome = ItemOutcome::from_samples(&samples);
                tracing::info!(
                    item = %id,
                    written = samples.written,
                    requested = samples.requested,
                    "sampling finished"
                );
                outcome
            }
            Err(e) => {
                tracing::error!(item = %id, error = %e, "error capturing frames");
                ItemOutcome::Failed
            }
        };
        enter(id, outcome.sample_state());
        Ok(outcome)
    }

    async fn sample(
        &self,
        media: &Path,
        dest_dir: &Path,
        component: &str,
    ) -> Result<SampleOutcome, SampleError> {
        let count = self.settings.samples_per_item;
        let extract = self.extractor.extract(media, dest_dir, component, count);
        match self.settings.sample_timeout {
            Some(limit) => tokio::time::timeout(limit, extract)
                .await
                .unwrap_or(Err(SampleError::Timeout(limit))),
            None => extract.await,
        }
    }
}

fn enter(item_id: &str, state: ItemState) {
    tracing::debug!(item = %item_id, state = ?state, "item state");
}
