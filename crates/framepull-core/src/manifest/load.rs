//! Read the CSV manifest, check required columns, drop unusable rows.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::{path_component, Manifest, ManifestRow, ID_COLUMN, URL_COLUMN};

/// Manifest load failure. Always fatal: nothing is dispatched.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot read manifest {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error(
        "manifest must contain '{}' and '{}' columns; found columns: {}",
        ID_COLUMN,
        URL_COLUMN,
        .found.join(", ")
    )]
    MissingColumns { found: Vec<String> },
}

/// Loads `path`, keeping at most the first `limit` data rows (before any
/// filtering). Rows with a blank URL are dropped silently. Rows whose id is
/// blank or has no usable file-name characters, and rows whose id maps to the
/// same path component as an earlier row, are dropped with a warning.
pub fn load_manifest(path: &Path, limit: Option<usize>) -> Result<Manifest, ManifestError> {
    let read_err = |source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;

    let headers = reader.headers().map_err(read_err)?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (Some(id_idx), Some(url_idx)) = (column(ID_COLUMN), column(URL_COLUMN)) else {
        return Err(ManifestError::MissingColumns {
            found: headers.iter().map(|h| h.trim().to_string()).collect(),
        });
    };

    let mut manifest = Manifest::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (n, record) in reader.records().enumerate() {
        if limit.is_some_and(|l| n >= l) {
            break;
        }
        let record = record.map_err(read_err)?;
        manifest.rows_read += 1;

        let url = record.get(url_idx).unwrap_or("").trim();
        if url.is_empty() {
            manifest.skipped_blank_url += 1;
            continue;
        }
        let item_id = record.get(id_idx).unwrap_or("").trim();
        if item_id.is_empty() {
            tracing::warn!(row = n + 1, url = %url, "manifest row has no {}; skipped", ID_COLUMN);
            manifest.skipped_missing_id += 1;
            continue;
        }
        let Some(component) = path_component(item_id) else {
            tracing::warn!(item = %item_id, row = n + 1, "item id has no usable characters for a file name; skipped");
            manifest.skipped_missing_id += 1;
            continue;
        };
        // Ids that differ only in characters the sanitizer replaces would share
        // a temp file and an output dir.
        if !seen.insert(component) {
            tracing::warn!(item = %item_id, row = n + 1, "duplicate item id in manifest; skipped");
            manifest.skipped_duplicate += 1;
            continue;
        }

        manifest.rows.push(ManifestRow {
            item_id: item_id.to_string(),
            source_url: url.to_string(),
        });
    }

    tracing::info!(
        path = %path.display(),
        rows = manifest.rows_read,
        usable = manifest.rows.len(),
        "manifest loaded"
    );
    Ok(manifest)
}
