//! Media fetch: download one remote item to a local path.
//!
//! The pipeline only sees the `MediaFetcher` capability; `YtDlpFetcher` is
//! the production implementation. Whether the file is present afterwards is
//! checked by the caller, never assumed from the exit status.

mod error;
mod ytdlp;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use error::FetchError;
pub use ytdlp::YtDlpFetcher;

/// Fetch capability: a single fallible call bounded by `timeout`.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path, timeout: Duration) -> Result<(), FetchError>;
}

/// Where the fetch was asked to write, and whether a file is there now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub local_path: PathBuf,
    pub present: bool,
}

impl FetchResult {
    pub fn probe(local_path: &Path) -> Self {
        Self {
            local_path: local_path.to_path_buf(),
            present: local_path.is_file(),
        }
    }
}
