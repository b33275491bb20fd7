//! CLI for the framepull batch frame sampler.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use framepull_core::config::{self, FramepullConfig, RunOverrides};
use std::path::{Path, PathBuf};

use commands::{run_batch, run_check, run_config};

/// Top-level CLI for framepull.
#[derive(Debug, Parser)]
#[command(name = "framepull")]
#[command(about = "framepull: fetch videos from a CSV manifest and sample still frames", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Process a manifest: fetch each video, sample frames, clean up.
    Run {
        /// CSV manifest with `video_number` and `vimeo_link` columns.
        manifest: PathBuf,

        #[command(flatten)]
        opts: RunOpts,
    },

    /// Load and validate a manifest without fetching anything.
    Check {
        /// CSV manifest to validate.
        manifest: PathBuf,

        /// Only consider the first N data rows.
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Print the effective configuration file path and contents.
    Config {
        /// Read this file instead of the default config path.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

/// Flags of `framepull run`. Unset flags keep the config file value.
#[derive(Debug, Clone, Default, Args)]
pub struct RunOpts {
    /// Read this config file instead of the default one.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of items processed concurrently.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Per-item fetch timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Per-item sampling timeout in seconds (off unless set).
    #[arg(long, value_name = "SECS")]
    pub sample_timeout: Option<u64>,

    /// Lower bound of the random delay between fetch starts.
    #[arg(long, value_name = "SECS")]
    pub min_delay: Option<f64>,

    /// Upper bound of the random delay between fetch starts.
    #[arg(long, value_name = "SECS")]
    pub max_delay: Option<f64>,

    /// Frames to sample per item.
    #[arg(long, value_name = "N")]
    pub samples: Option<usize>,

    /// Only process the first N data rows of the manifest.
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Root directory for sampled frames.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Scratch directory for temporary media files.
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Write failed and partial items to this CSV for a later run.
    #[arg(long, value_name = "PATH")]
    pub resubmit: Option<PathBuf>,

    /// Seed the delay and frame-position randomness.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,
}

impl RunOpts {
    pub fn overrides(&self) -> RunOverrides {
        RunOverrides {
            workers: self.workers,
            fetch_timeout_secs: self.timeout,
            sample_timeout_secs: self.sample_timeout,
            samples_per_item: self.samples,
            min_delay_secs: self.min_delay,
            max_delay_secs: self.max_delay,
            download_dir: self.download_dir.clone(),
            output_dir: self.output_dir.clone(),
        }
    }
}

/// Explicit `--config` file, or the default XDG config (created on first use).
fn load_config(path: Option<&Path>) -> Result<FramepullConfig> {
    let cfg = match path {
        Some(p) => config::load_from_path(p)?,
        None => config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run { manifest, opts } => {
                let mut cfg = load_config(opts.config.as_deref())?;
                opts.overrides().apply(&mut cfg);
                run_batch(cfg, &manifest, &opts).await?;
            }
            CliCommand::Check { manifest, limit } => run_check(&manifest, limit)?,
            CliCommand::Config { config } => {
                let cfg = load_config(config.as_deref())?;
                run_config(config.as_deref(), &cfg)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
