//! Run control: a shared stop token checked by the pool before each dispatch.
//!
//! The CLI requests a stop on Ctrl-C. Items already dispatched are not
//! aborted; they finish (including temp file cleanup) and are counted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cheap clonable handle; all clones share one stop flag.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    stop: Arc<AtomicBool>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop dispatching new items. Idempotent.
    pub fn request_stop(&self) {
        if !self.stop.swap(true, Ordering::AcqRel) {
            tracing::warn!("stop requested: no new items will be dispatched, draining in-flight items");
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}
