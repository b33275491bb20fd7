//! yt-dlp backed fetcher: one child process per item, killed on timeout.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{FetchError, MediaFetcher};
use crate::config::FetcherConfig;

/// Longest diagnostic kept from the fetcher's stderr.
const MAX_DIAGNOSTIC_BYTES: usize = 2048;

pub struct YtDlpFetcher {
    cfg: FetcherConfig,
}

impl YtDlpFetcher {
    pub fn new(cfg: FetcherConfig) -> Self {
        Self { cfg }
    }

    /// Arguments for one fetch of `url` into `dest` (best quality, merged container).
    pub fn command_args(&self, url: &str, dest: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--format".into(),
            self.cfg.format.clone().into(),
            "--merge-output-format".into(),
            self.cfg.merge_output_format.clone().into(),
            "--output".into(),
            dest.as_os_str().to_owned(),
            "--no-warnings".into(),
            "--no-check-certificate".into(),
        ];
        args.extend(self.cfg.extra_args.iter().map(OsString::from));
        args.push(url.into());
        args
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(&self, url: &str, dest: &Path, timeout: Duration) -> Result<(), FetchError> {
        let mut cmd = Command::new(&self.cfg.program);
        cmd.args(self.command_args(url, dest))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(res) => res.map_err(FetchError::Spawn)?,
            Err(_) => return Err(FetchError::Timeout(timeout)),
        };

        if output.status.success() {
            return Ok(());
        }
        Err(FetchError::Exit {
            code: output.status.code(),
            diagnostic: diagnostic_text(&output.stderr),
        })
    }
}

fn diagnostic_text(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.len() <= MAX_DIAGNOSTIC_BYTES {
        return text.to_string();
    }
    let mut start = text.len() - MAX_DIAGNOSTIC_BYTES;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &text[start..])
}
