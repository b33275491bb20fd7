//! RAII guard that removes one item's temporary download.

use std::io;
use std::path::{Path, PathBuf};

/// Owns the temp path of one item. `cleanup` removes the file and its fetcher
/// leftovers if present and only ever logs errors; it runs once, either
/// explicitly or on drop.
#[derive(Debug)]
pub struct TempFileGuard {
    path: PathBuf,
    item_id: String,
    done: bool,
}

impl TempFileGuard {
    pub fn new(path: PathBuf, item_id: impl Into<String>) -> Self {
        Self {
            path,
            item_id: item_id.into(),
            done: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the file and any fetcher leftovers next to it (`.part` files,
    /// per-format intermediates). Returns true if anything was deleted by
    /// this call. Later calls are no-ops.
    pub fn cleanup(&mut self) -> bool {
        if self.done {
            return false;
        }
        self.done = true;
        let mut removed = self.remove(&self.path);
        for leftover in self.leftovers() {
            removed |= self.remove(&leftover);
        }
        removed
    }

    fn remove(&self, path: &Path) -> bool {
        match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::info!(item = %self.item_id, path = %path.display(), "deleted temp file");
                true
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::error!(item = %self.item_id, path = %path.display(), error = %e, "error deleting temp file");
                false
            }
        }
    }

    /// Siblings named `{stem}.*`, e.g. `7_temp.mp4.part` or `7_temp.f137.mp4`
    /// for `7_temp.mp4`. A sibling whose suffix holds another `_temp.` is some
    /// other item's file and is left alone.
    fn leftovers(&self) -> Vec<PathBuf> {
        let (Some(dir), Some(stem)) = (self.path.parent(), self.path.file_stem()) else {
            return Vec::new();
        };
        let prefix = format!("{}.", stem.to_string_lossy());
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::error!(item = %self.item_id, dir = %dir.display(), error = %e, "cannot scan for leftover temp files");
                return Vec::new();
            }
        };
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|p| *p != self.path)
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| n.strip_prefix(prefix.as_str()))
                    .is_some_and(|rest| !rest.contains("_temp."))
            })
            .collect()
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if !self.done {
            tracing::warn!(item = %self.item_id, "temp file cleanup on unwind");
            self.cleanup();
        }
    }
}
