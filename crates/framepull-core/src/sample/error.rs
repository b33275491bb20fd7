use std::time::Duration;

/// Hard sampling failure: no frames could be produced for the item.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    /// The media could not be opened or probed, or one frame could not be decoded.
    #[error("decode: {0}")]
    Decode(String),
    /// The media reports a non-positive number of addressable frames.
    #[error("invalid frame count {0}")]
    NoFrames(i64),
    /// Destination directory could not be created.
    #[error("output dir: {0}")]
    Io(#[from] std::io::Error),
    /// Sampling exceeded the configured timeout.
    #[error("sampling timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}
