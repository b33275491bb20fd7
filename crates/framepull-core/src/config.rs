use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error loading or validating configuration. Always fatal before dispatch.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config directory: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Delay range between fetch starts (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Lower bound of the random delay, in seconds.
    pub min_delay_secs: f64,
    /// Upper bound of the random delay, in seconds.
    pub max_delay_secs: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: 3.0,
            max_delay_secs: 8.0,
        }
    }
}

/// How the media fetcher program is invoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Program name or path (resolved through PATH).
    pub program: String,
    /// Format selector passed to `--format`.
    pub format: String,
    /// Container passed to `--merge-output-format`; also the temp file extension.
    pub merge_output_format: String,
    /// Extra arguments inserted before the URL.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            format: "bestvideo+bestaudio/best".to_string(),
            merge_output_format: "mp4".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Programs used to count and grab frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    pub ffprobe: String,
    pub ffmpeg: String,
    /// Extension of written frames; ffmpeg picks the encoder from it.
    pub image_extension: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            ffprobe: "ffprobe".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            image_extension: "jpg".to_string(),
        }
    }
}

/// Run configuration loaded from `~/.config/framepull/config.toml`.
///
/// Built once per run, validated, then shared read-only with the limiter,
/// the item processor and the pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramepullConfig {
    /// Number of items processed concurrently.
    pub workers: usize,
    /// Hard timeout for one fetch, in seconds.
    pub fetch_timeout_secs: u64,
    /// Optional timeout for sampling one item (None = unbounded).
    #[serde(default)]
    pub sample_timeout_secs: Option<u64>,
    /// Frames extracted per item.
    pub samples_per_item: usize,
    /// Scratch directory for in-flight downloads.
    pub download_dir: PathBuf,
    /// Root of the per-item frame directories.
    pub output_dir: PathBuf,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
}

impl Default for FramepullConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            fetch_timeout_secs: 600,
            sample_timeout_secs: None,
            samples_per_item: 5,
            download_dir: PathBuf::from("temp_downloads"),
            output_dir: PathBuf::from("final-dataset"),
            rate_limit: RateLimitConfig::default(),
            fetcher: FetcherConfig::default(),
            decoder: DecoderConfig::default(),
        }
    }
}

impl FramepullConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn sample_timeout(&self) -> Option<Duration> {
        self.sample_timeout_secs.map(Duration::from_secs)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.samples_per_item == 0 {
            return Err(ConfigError::Invalid(
                "samples_per_item must be at least 1".into(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch_timeout_secs must be at least 1".into(),
            ));
        }
        if self.sample_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "sample_timeout_secs must be at least 1 when set".into(),
            ));
        }
        let RateLimitConfig {
            min_delay_secs,
            max_delay_secs,
        } = self.rate_limit;
        for (name, v) in [("min_delay_secs", min_delay_secs), ("max_delay_secs", max_delay_secs)] {
            if !v.is_finite() || v < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "rate_limit.{} must be a non-negative number, got {}",
                    name, v
                )));
            }
        }
        if self.fetcher.merge_output_format.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "fetcher.merge_output_format must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Operator overrides from the command line; `None` keeps the config value.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub workers: Option<usize>,
    pub fetch_timeout_secs: Option<u64>,
    pub sample_timeout_secs: Option<u64>,
    pub samples_per_item: Option<usize>,
    pub min_delay_secs: Option<f64>,
    pub max_delay_secs: Option<f64>,
    pub download_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl RunOverrides {
    pub fn apply(&self, cfg: &mut FramepullConfig) {
        if let Some(v) = self.workers {
            cfg.workers = v;
        }
        if let Some(v) = self.fetch_timeout_secs {
            cfg.fetch_timeout_secs = v;
        }
        if let Some(v) = self.sample_timeout_secs {
            cfg.sample_timeout_secs = Some(v);
        }
        if let Some(v) = self.samples_per_item {
            cfg.samples_per_item = v;
        }
        if let Some(v) = self.min_delay_secs {
            cfg.rate_limit.min_delay_secs = v;
        }
        if let Some(v) = self.max_delay_secs {
            cfg.rate_limit.max_delay_secs = v;
        }
        if let Some(ref v) = self.download_dir {
            cfg.download_dir = v.clone();
        }
        if let Some(ref v) = self.output_dir {
            cfg.output_dir = v.clone();
        }
    }
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("framepull")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FramepullConfig, ConfigError> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FramepullConfig::default();
        let toml = default_cfg.to_toml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file; the file must exist.
pub fn load_from_path(path: &Path) -> Result<FramepullConfig, ConfigError> {
    let data = fs::read_to_string(path)?;
    let cfg: FramepullConfig = toml::from_str(&data)?;
    Ok(cfg)
}
