//! Sample extraction: turn one local media file into N frame images.
//!
//! `SampleExtractor` is what the pipeline calls. `FrameSampler` implements it
//! over a `FrameDecoder` (frame count + single-frame write); `FfmpegDecoder`
//! is the production decoder.

mod error;
mod ffmpeg;
mod positions;
mod sampler;

use async_trait::async_trait;
use std::path::Path;

pub use error::SampleError;
pub use ffmpeg::FfmpegDecoder;
pub use positions::select_positions;
pub use sampler::FrameSampler;

/// How many samples were asked for and how many were written.
/// `written < requested` is a valid partial result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleOutcome {
    pub requested: usize,
    pub written: usize,
}

/// Extracts `count` samples from `media` into `dest_dir` as `{item_id}_{k}.{ext}`.
#[async_trait]
pub trait SampleExtractor: Send + Sync {
    async fn extract(
        &self,
        media: &Path,
        dest_dir: &Path,
        item_id: &str,
        count: usize,
    ) -> Result<SampleOutcome, SampleError>;
}

/// Media access needed by `FrameSampler`.
#[async_trait]
pub trait FrameDecoder: Send + Sync {
    /// Number of addressable frames; may be zero or negative for broken media.
    async fn frame_count(&self, media: &Path) -> Result<i64, SampleError>;

    /// Decode frame `index` and write it as an image to `out`.
    async fn write_frame(&self, media: &Path, index: u64, out: &Path) -> Result<(), SampleError>;
}
