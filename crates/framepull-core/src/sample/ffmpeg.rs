//! ffprobe/ffmpeg backed decoder.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::{FrameDecoder, SampleError};
use crate::config::DecoderConfig;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    nb_read_packets: Option<String>,
    nb_frames: Option<String>,
}

pub struct FfmpegDecoder {
    ffprobe: String,
    ffmpeg: String,
}

impl FfmpegDecoder {
    pub fn new(cfg: &DecoderConfig) -> Self {
        Self {
            ffprobe: cfg.ffprobe.clone(),
            ffmpeg: cfg.ffmpeg.clone(),
        }
    }

    async fn run(program: &str, args: Vec<std::ffi::OsString>) -> Result<Vec<u8>, SampleError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| SampleError::Decode(format!("failed to run {}: {}", program, e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SampleError::Decode(format!("{} failed: {}", program, stderr.trim())));
        }
        Ok(output.stdout)
    }
}

/// Frame count of the first video stream from ffprobe JSON; 0 when absent.
fn parse_frame_count(json: &[u8]) -> Result<i64, SampleError> {
    let probe: ProbeOutput = serde_json::from_slice(json)
        .map_err(|e| SampleError::Decode(format!("parse ffprobe output: {}", e)))?;
    let Some(stream) = probe.streams.first() else {
        return Ok(0);
    };
    let raw = stream
        .nb_read_packets
        .as_deref()
        .or(stream.nb_frames.as_deref())
        .unwrap_or("0");
    raw.trim()
        .parse::<i64>()
        .map_err(|_| SampleError::Decode(format!("unexpected frame count '{}'", raw)))
}

#[async_trait]
impl FrameDecoder for FfmpegDecoder {
    async fn frame_count(&self, media: &Path) -> Result<i64, SampleError> {
        let args = vec![
            "-v".into(),
            "error".into(),
            "-select_streams".into(),
            "v:0".into(),
            "-count_packets".into(),
            "-show_entries".into(),
            "stream=nb_read_packets,nb_frames".into(),
            "-of".into(),
            "json".into(),
            media.as_os_str().to_owned(),
        ];
        let stdout = Self::run(&self.ffprobe, args).await?;
        parse_frame_count(&stdout)
    }

    async fn write_frame(&self, media: &Path, index: u64, out: &Path) -> Result<(), SampleError> {
        let args = vec![
            "-v".into(),
            "error".into(),
            "-y".into(),
            "-i".into(),
            media.as_os_str().to_owned(),
            "-vf".into(),
            format!("select=eq(n\\,{})", index).into(),
            "-vsync".into(),
            "0".into(),
            "-frames:v".into(),
            "1".into(),
            out.as_os_str().to_owned(),
        ];
        Self::run(&self.ffmpeg, args).await?;
        if !out.is_file() {
            return Err(SampleError::Decode(format!("no frame decoded at index {}", index)));
        }
        Ok(())
    }
}
