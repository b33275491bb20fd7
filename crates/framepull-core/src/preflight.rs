//! Startup check that the external programs can be run at all.
//!
//! A missing yt-dlp or ffmpeg would otherwise surface once per item, after
//! each item's rate-limit wait.

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::config::FramepullConfig;

const VERSION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum PreflightError {
    #[error("cannot run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} {arg} exited with {status}")]
    Exit {
        program: String,
        arg: String,
        status: std::process::ExitStatus,
    },
    #[error("{program} {arg} did not answer within {}s", VERSION_TIMEOUT.as_secs())]
    Timeout { program: String, arg: String },
}

/// Runs `program version_arg` and requires a successful exit.
pub async fn check_program(program: &str, version_arg: &str) -> Result<(), PreflightError> {
    let mut cmd = Command::new(program);
    cmd.arg(version_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let status = match tokio::time::timeout(VERSION_TIMEOUT, cmd.status()).await {
        Ok(res) => res.map_err(|source| PreflightError::Spawn {
            program: program.to_string(),
            source,
        })?,
        Err(_) => {
            return Err(PreflightError::Timeout {
                program: program.to_string(),
                arg: version_arg.to_string(),
            })
        }
    };
    if !status.success() {
        return Err(PreflightError::Exit {
            program: program.to_string(),
            arg: version_arg.to_string(),
            status,
        });
    }
    tracing::debug!(program, "external tool available");
    Ok(())
}

/// Checks the fetcher, ffprobe and ffmpeg named in `cfg`.
pub async fn check_tools(cfg: &FramepullConfig) -> Result<(), PreflightError> {
    check_program(&cfg.fetcher.program, "--version").await?;
    check_program(&cfg.decoder.ffprobe, "-version").await?;
    check_program(&cfg.decoder.ffmpeg, "-version").await?;
    Ok(())
}
