//! Frame sampler: count frames, choose positions, write one image per position.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::sync::Mutex;

use super::positions::select_positions;
use super::{FrameDecoder, SampleError, SampleExtractor, SampleOutcome};

/// `SampleExtractor` over any `FrameDecoder`.
///
/// A write failure for a single position is logged and skipped; only a bad
/// frame count (or an unusable output dir) fails the whole call.
pub struct FrameSampler<D> {
    decoder: D,
    image_extension: String,
    rng: Mutex<StdRng>,
}

impl<D: FrameDecoder> FrameSampler<D> {
    pub fn new(decoder: D, image_extension: impl Into<String>) -> Self {
        Self {
            decoder,
            image_extension: image_extension.into(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible position selection.
    pub fn with_seed(decoder: D, image_extension: impl Into<String>, seed: u64) -> Self {
        Self {
            decoder,
            image_extension: image_extension.into(),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn positions(&self, frame_count: u64, count: usize) -> Vec<u64> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        select_positions(frame_count, count, &mut *rng)
    }
}

#[async_trait]
impl<D: FrameDecoder> SampleExtractor for FrameSampler<D> {
    async fn extract(
        &self,
        media: &Path,
        dest_dir: &Path,
        item_id: &str,
        count: usize,
    ) -> Result<SampleOutcome, SampleError> {
        let frame_count = self.decoder.frame_count(media).await?;
        if frame_count <= 0 {
            return Err(SampleError::NoFrames(frame_count));
        }

        tokio::fs::create_dir_all(dest_dir).await?;

        let positions = self.positions(frame_count as u64, count);
        tracing::debug!(item = %item_id, frame_count, ?positions, "selected frame positions");

        let mut written = 0usize;
        for (i, &position) in positions.iter().enumerate() {
            let index = i + 1;
            let out = dest_dir.join(format!("{}_{}.{}", item_id, index, self.image_extension));
            match self.decoder.write_frame(media, position, &out).await {
                Ok(()) => {
                    written += 1;
                    tracing::info!(item = %item_id, sample = index, frame = position, "saved frame");
                }
                Err(e) => {
                    tracing::warn!(item = %item_id, sample = index, frame = position, error = %e, "failed to extract frame");
                }
            }
        }

        Ok(SampleOutcome {
            requested: count,
            written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Decoder with a fixed frame count; the listed write calls (1-based) fail.
    struct FakeDecoder {
        frames: i64,
        fail_on: Vec<usize>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FrameDecoder for FakeDecoder {
        async fn frame_count(&self, _media: &Path) -> Result<i64, SampleError> {
            Ok(self.frames)
        }

        async fn write_frame(&self, _media: &Path, index: u64, out: &Path) -> Result<(), SampleError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on.contains(&call) {
                return Err(SampleError::Decode(format!("cannot seek to {}", index)));
            }
            std::fs::write(out, index.to_string()).map_err(SampleError::Io)
        }
    }

    fn fake(frames: i64, fail_on: Vec<usize>) -> FakeDecoder {
        FakeDecoder {
            frames,
            fail_on,
            calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn writes_all_requested_frames_named_by_index() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("12");
        let s = FrameSampler::with_seed(fake(1000, vec![]), "jpg", 3);
        let out = s.extract(Path::new("m.mp4"), &dest, "12", 5).await.unwrap();
        assert_eq!(out, SampleOutcome { requested: 5, written: 5 });
        for k in 1..=5 {
            assert!(dest.join(format!("12_{}.jpg", k)).is_file());
        }
    }

    #[tokio::test]
    async fn single_write_failure_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("9");
        let s = FrameSampler::with_seed(fake(1000, vec![2, 4, 5]), "jpg", 3);
        let out = s.extract(Path::new("m.mp4"), &dest, "9", 5).await.unwrap();
        assert_eq!(out.written, 2);
        assert!(dest.join("9_1.jpg").is_file());
        assert!(!dest.join("9_2.jpg").exists());
        assert!(dest.join("9_3.jpg").is_file());
    }

    #[tokio::test]
    async fn non_positive_frame_count_fails_without_dir() {
        let dir = tempfile::tempdir().unwrap();
        for frames in [0, -1] {
            let dest = dir.path().join(format!("x{}", frames));
            let s = FrameSampler::with_seed(fake(frames, vec![]), "jpg", 1);
            let err = s.extract(Path::new("m.mp4"), &dest, "x", 5).await.unwrap_err();
            assert!(matches!(err, SampleError::NoFrames(n) if n == frames));
            assert!(!dest.exists());
        }
    }

    #[tokio::test]
    async fn short_media_writes_evenly_spaced_repeats() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("s");
        let s = FrameSampler::with_seed(fake(3, vec![]), "png", 1);
        let out = s.extract(Path::new("m.mp4"), &dest, "s", 5).await.unwrap();
        assert_eq!(out.written, 5);
        let frames: Vec<String> = (1..=5)
            .map(|k| std::fs::read_to_string(dest.join(format!("s_{}.png", k))).unwrap())
            .collect();
        assert_eq!(frames, vec!["0", "0", "1", "1", "2"]);
    }
}
