//! `framepull run` – process a manifest end to end.

use anyhow::{Context, Result};
use framepull_core::config::FramepullConfig;
use framepull_core::control::RunControl;
use framepull_core::manifest::write_resubmit_manifest;
use framepull_core::scheduler::Pipeline;
use std::future::Future;
use std::path::Path;

use crate::cli::RunOpts;

/// Exit status after a forced quit, as for a shell-killed SIGINT.
const FORCED_EXIT_CODE: i32 = 130;

pub async fn run_batch(cfg: FramepullConfig, manifest: &Path, opts: &RunOpts) -> Result<()> {
    let pipeline = match opts.seed {
        Some(seed) => Pipeline::seeded(cfg, seed),
        None => Pipeline::new(cfg),
    };

    let control = RunControl::new();
    tokio::spawn(watch_interrupts(control.clone()));

    let result = pipeline.run(manifest, opts.limit, &control).await?;
    print!("{}", result.report);

    if let Some(path) = opts.resubmit.as_deref() {
        let written = write_resubmit_manifest(path, &result.items)
            .with_context(|| format!("write resubmission manifest {}", path.display()))?;
        println!("Resubmission manifest: {} item(s) -> {}", written, path.display());
    }
    Ok(())
}

async fn watch_interrupts(control: RunControl) {
    let forced = escalate_interrupts(&control, || async { tokio::signal::ctrl_c().await.is_ok() }).await;
    if forced {
        tracing::warn!("second interrupt: exiting without waiting for in-flight items");
        std::process::exit(FORCED_EXIT_CODE);
    }
}

/// First interrupt stops dispatching and lets in-flight items drain. Returns
/// true when a second interrupt arrives, meaning quit now. `next_interrupt`
/// resolves to false when no more interrupts can be received.
async fn escalate_interrupts<F, Fut>(control: &RunControl, mut next_interrupt: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    if !next_interrupt().await {
        return false;
    }
    control.request_stop();
    next_interrupt().await
}
