//! Run one batch: load manifest, run the pool, clean scratch space, report.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::config::FramepullConfig;
use crate::control::RunControl;
use crate::fetch::{MediaFetcher, YtDlpFetcher};
use crate::manifest::{load_manifest, Manifest};
use crate::preflight::check_tools;
use crate::sample::{FfmpegDecoder, FrameSampler, SampleExtractor};

use super::item::{ItemProcessor, ItemSettings};
use super::outcome::ItemReport;
use super::parallel::run_pool;
use super::rate_limit::RateLimiter;
use super::report::RunReport;
use super::stats::RunStats;

/// Everything a finished batch produced.
#[derive(Debug)]
pub struct BatchResult {
    pub report: RunReport,
    pub items: Vec<ItemReport>,
    pub manifest: Manifest,
}

/// A configured batch runner. `Pipeline::new` wires the yt-dlp fetcher and the
/// ffmpeg sampler and checks those programs before a run; `with_components`
/// accepts any fetcher/extractor and skips the check.
pub struct Pipeline {
    cfg: Arc<FramepullConfig>,
    fetcher: Arc<dyn MediaFetcher>,
    extractor: Arc<dyn SampleExtractor>,
    seed: Option<u64>,
    check_tools: bool,
}

impl Pipeline {
    pub fn new(cfg: FramepullConfig) -> Self {
        Self::external(cfg, None)
    }

    /// Like `new`, with reproducible delays and frame positions.
    pub fn seeded(cfg: FramepullConfig, seed: u64) -> Self {
        Self::external(cfg, Some(seed)).seed(seed)
    }

    fn external(cfg: FramepullConfig, seed: Option<u64>) -> Self {
        let fetcher = Arc::new(YtDlpFetcher::new(cfg.fetcher.clone()));
        let decoder = FfmpegDecoder::new(&cfg.decoder);
        let extension = cfg.decoder.image_extension.clone();
        let extractor = Arc::new(match seed {
            Some(seed) => FrameSampler::with_seed(decoder, extension, seed),
            None => FrameSampler::new(decoder, extension),
        });
        let mut pipeline = Self::with_components(cfg, fetcher, extractor);
        pipeline.check_tools = true;
        pipeline
    }

    pub fn with_components(
        cfg: FramepullConfig,
        fetcher: Arc<dyn MediaFetcher>,
        extractor: Arc<dyn SampleExtractor>,
    ) -> Self {
        Self {
            cfg: Arc::new(cfg),
            fetcher,
            extractor,
            seed: None,
            check_tools: false,
        }
    }

    /// Seed the rate limiter's delay sequence.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &FramepullConfig {
        &self.cfg
    }

    /// Processes the first `limit` rows of `manifest_path` (all when `None`).
    ///
    /// Config, missing-program, manifest and directory errors abort before any item is
    /// dispatched. After that the run always completes with a report,
    /// however many items fail.
    pub async fn run(
        &self,
        manifest_path: &Path,
        limit: Option<usize>,
        control: &RunControl,
    ) -> Result<BatchResult> {
        let start = Instant::now();
        let cfg: &FramepullConfig = &self.cfg;
        cfg.validate().context("invalid run configuration")?;
        if self.check_tools {
            check_tools(cfg)
                .await
                .context("required external program is not available")?;
        }

        let manifest = load_manifest(manifest_path, limit)?;
        for dir in [&cfg.download_dir, &cfg.output_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create directory {}", dir.display()))?;
        }

        let rows = manifest.rows.clone();
        let stats = Arc::new(RunStats::new(rows.len()));
        let limiter = Arc::new(RateLimiter::from_config(&cfg.rate_limit, self.seed));
        let processor = Arc::new(ItemProcessor::new(
            ItemSettings::from(cfg),
            limiter,
            Arc::clone(&self.fetcher),
            Arc::clone(&self.extractor),
        ));

        tracing::info!(
            items = rows.len(),
            workers = cfg.workers,
            skipped_blank_url = manifest.skipped_blank_url,
            "starting processing of {} items with {} workers",
            rows.len(),
            cfg.workers
        );

        let pool = run_pool(rows, processor, Arc::clone(&stats), control, cfg.workers).await;

        remove_dir_if_empty(&cfg.download_dir);

        let report = RunReport {
            stats: stats.snapshot(),
            elapsed: start.elapsed(),
            not_dispatched: pool.not_dispatched,
        };
        report.log();

        Ok(BatchResult {
            report,
            items: pool.reports,
            manifest,
        })
    }
}

/// Best-effort removal of the scratch dir; only when empty, errors logged.
fn remove_dir_if_empty(dir: &Path) {
    let is_empty = match std::fs::read_dir(dir) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => return,
    };
    if !is_empty {
        tracing::warn!(path = %dir.display(), "temporary directory not empty; left in place");
        return;
    }
    if let Err(e) = std::fs::remove_dir(dir) {
        tracing::error!(path = %dir.display(), error = %e, "error cleaning up temporary directory");
    }
}
