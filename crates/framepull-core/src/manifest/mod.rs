//! Manifest input: rows of `(item id, source URL)` read from CSV.
//!
//! Loading validates the required columns and filters unusable rows before
//! anything is dispatched; the resulting rows are read-only for the run.

mod item_id;
mod load;
mod resubmit;

pub use item_id::path_component;
pub use load::{load_manifest, ManifestError};
pub use resubmit::write_resubmit_manifest;

/// Column holding the unique item identifier.
pub const ID_COLUMN: &str = "video_number";
/// Column holding the source URL.
pub const URL_COLUMN: &str = "vimeo_link";

/// One unit of work: an item id and where to fetch its media from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRow {
    pub item_id: String,
    pub source_url: String,
}

/// Usable rows plus counts of what was dropped while loading.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub rows: Vec<ManifestRow>,
    /// Data rows considered (after the row limit).
    pub rows_read: usize,
    pub skipped_blank_url: usize,
    /// Blank ids and ids with nothing usable as a file name.
    pub skipped_missing_id: usize,
    /// Ids whose file-name form repeats an earlier row's.
    pub skipped_duplicate: usize,
}
