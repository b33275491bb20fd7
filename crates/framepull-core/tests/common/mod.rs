//! Fake fetcher and decoder driven by the source URL, so integration tests
//! can exercise the whole pipeline without yt-dlp or ffmpeg.
//!
//! URL forms understood by `FakeFetcher`:
//! - `fail://...`      fetch error, no file written
//! - `leftover://...`  writes a partial file and a `.part` file, then errors
//! - `ghost://...`     reports success without writing a file
//! - `media://{frames}[/{ok_samples}]` writes a fake media file; the decoder
//!   reports `frames` frames and fails every sample after `ok_samples`.

#![allow(dead_code)]

use async_trait::async_trait;
use framepull_core::config::FramepullConfig;
use framepull_core::fetch::{FetchError, MediaFetcher};
use framepull_core::sample::{FrameDecoder, SampleError};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct FakeFetcher {
    pub calls: AtomicUsize,
}

#[async_trait]
impl MediaFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, dest: &Path, _timeout: Duration) -> Result<(), FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if url.starts_with("fail://") {
            return Err(FetchError::Exit {
                code: Some(1),
                diagnostic: "ERROR: unable to download video".to_string(),
            });
        }
        if url.starts_with("leftover://") {
            std::fs::write(dest, b"half").unwrap();
            let mut part = dest.as_os_str().to_owned();
            part.push(".part");
            std::fs::write(part, b"half").unwrap();
            return Err(FetchError::Timeout(Duration::from_secs(1)));
        }
        if url.starts_with("ghost://") {
            return Ok(());
        }
        let descriptor = url.strip_prefix("media://").unwrap_or("100");
        std::fs::write(dest, descriptor).unwrap();
        Ok(())
    }
}

/// Reads the `{frames}[/{ok_samples}]` descriptor the fake fetcher wrote.
pub struct FakeDecoder;

fn read_descriptor(media: &Path) -> (i64, Option<usize>) {
    let text = std::fs::read_to_string(media).unwrap();
    let mut parts = text.split('/');
    let frames = parts.next().unwrap().parse().unwrap();
    let ok = parts.next().map(|s| s.parse().unwrap());
    (frames, ok)
}

/// Sample index k from `{id}_{k}.{ext}`.
fn sample_index(out: &Path) -> usize {
    let stem = out.file_stem().unwrap().to_str().unwrap();
    stem.rsplit('_').next().unwrap().parse().unwrap()
}

#[async_trait]
impl FrameDecoder for FakeDecoder {
    async fn frame_count(&self, media: &Path) -> Result<i64, SampleError> {
        Ok(read_descriptor(media).0)
    }

    async fn write_frame(&self, media: &Path, index: u64, out: &Path) -> Result<(), SampleError> {
        let (frames, ok) = read_descriptor(media);
        assert!((index as i64) < frames, "position {} out of range", index);
        if let Some(ok) = ok {
            if sample_index(out) > ok {
                return Err(SampleError::Decode("corrupt frame".to_string()));
            }
        }
        std::fs::write(out, format!("frame {}", index)).unwrap();
        Ok(())
    }
}

/// Config rooted in `dir` with no rate-limit delay.
pub fn test_config(dir: &Path, workers: usize) -> FramepullConfig {
    let mut cfg = FramepullConfig::default();
    cfg.workers = workers;
    cfg.download_dir = dir.join("temp_downloads");
    cfg.output_dir = dir.join("final-dataset");
    cfg.rate_limit.min_delay_secs = 0.0;
    cfg.rate_limit.max_delay_secs = 0.0;
    cfg
}

/// Writes a manifest with the standard header and returns its path.
pub fn write_manifest(dir: &Path, rows: &[(&str, &str)]) -> std::path::PathBuf {
    let path = dir.join("manifest.csv");
    let mut text = String::from("video_number,vimeo_link\n");
    for (id, url) in rows {
        text.push_str(&format!("{},{}\n", id, url));
    }
    std::fs::write(&path, text).unwrap();
    path
}
