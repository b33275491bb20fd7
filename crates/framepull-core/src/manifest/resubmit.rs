//! Resubmission manifest: failed and partial items, loadable as a new run's manifest.

use anyhow::{Context, Result};
use std::path::Path;

use super::{ID_COLUMN, URL_COLUMN};
use crate::scheduler::{ItemOutcome, ItemReport};

/// Writes every non-successful item to `path` with columns
/// `video_number,vimeo_link,outcome`. Returns the number of rows written.
pub fn write_resubmit_manifest(path: &Path, reports: &[ItemReport]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("create resubmit manifest: {}", path.display()))?;
    writer.write_record([ID_COLUMN, URL_COLUMN, "outcome"])?;

    let mut written = 0usize;
    for report in reports.iter().filter(|r| r.outcome != ItemOutcome::Successful) {
        writer.write_record([
            report.row.item_id.as_str(),
            report.row.source_url.as_str(),
            report.outcome.as_str(),
        ])?;
        written += 1;
    }
    writer
        .flush()
        .with_context(|| format!("write resubmit manifest: {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = written, "wrote resubmit manifest");
    Ok(written)
}
