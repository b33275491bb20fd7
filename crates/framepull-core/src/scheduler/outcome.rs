//! Per-item states and terminal outcomes.

use std::fmt;

use crate::manifest::ManifestRow;
use crate::sample::SampleOutcome;

/// Where an item is in its pipeline; logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Queued,
    RateLimited,
    Fetching,
    FetchFailed,
    Fetched,
    Sampling,
    SampleFailed,
    SamplePartial,
    SampleComplete,
    CleanedUp,
    Terminal,
}

/// The one bucket each dispatched item ends in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemOutcome {
    Successful,
    Partial,
    Failed,
}

impl ItemOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemOutcome::Successful => "successful",
            ItemOutcome::Partial => "partial",
            ItemOutcome::Failed => "failed",
        }
    }

    /// All requested samples ⇒ successful, some ⇒ partial, none ⇒ failed.
    pub fn from_samples(outcome: &SampleOutcome) -> Self {
        if outcome.written == 0 {
            ItemOutcome::Failed
        } else if outcome.written >= outcome.requested {
            ItemOutcome::Successful
        } else {
            ItemOutcome::Partial
        }
    }

    pub(super) fn sample_state(self) -> ItemState {
        match self {
            ItemOutcome::Successful => ItemState::SampleComplete,
            ItemOutcome::Partial => ItemState::SamplePartial,
            ItemOutcome::Failed => ItemState::SampleFailed,
        }
    }
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dispatched row and how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub row: ManifestRow,
    pub outcome: ItemOutcome,
}
