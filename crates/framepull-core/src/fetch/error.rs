//! Fetch error type: coarse, opaque to the caller beyond "it failed".

use std::time::Duration;

/// Error returned by a media fetch. The diagnostic text is carried for the
/// log only; nothing branches on its content.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The fetcher program could not be started.
    #[error("failed to start fetcher: {0}")]
    Spawn(#[source] std::io::Error),
    /// The fetch did not finish within the configured timeout; the child was killed.
    #[error("fetch timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    /// The fetcher exited unsuccessfully.
    #[error("fetcher exited with {}: {diagnostic}", exit_code_text(.code))]
    Exit {
        code: Option<i32>,
        diagnostic: String,
    },
}

fn exit_code_text(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "signal".to_string(),
    }
}
