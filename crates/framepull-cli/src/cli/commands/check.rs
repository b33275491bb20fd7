//! `framepull check` – validate a manifest without fetching.

use anyhow::Result;
use framepull_core::manifest::load_manifest;
use std::path::Path;

pub fn run_check(manifest: &Path, limit: Option<usize>) -> Result<()> {
    let m = load_manifest(manifest, limit)?;
    println!("Manifest: {}", manifest.display());
    println!("Rows read: {}", m.rows_read);
    println!("Items to process: {}", m.rows.len());
    println!("Skipped (blank link): {}", m.skipped_blank_url);
    println!("Skipped (missing or unusable id): {}", m.skipped_missing_id);
    println!("Skipped (duplicate id): {}", m.skipped_duplicate);
    Ok(())
}
