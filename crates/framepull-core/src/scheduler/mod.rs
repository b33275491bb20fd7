//! Batch scheduler.
//!
//! Coordinates the per-item pipeline (rate limit → fetch → sample → cleanup)
//! across a bounded worker pool, and aggregates outcomes into run statistics
//! and a final report.

mod guard;
mod item;
mod outcome;
mod parallel;
mod rate_limit;
mod report;
mod run;
mod stats;

pub use guard::TempFileGuard;
pub use item::{ItemProcessor, ItemSettings};
pub use outcome::{ItemOutcome, ItemReport, ItemState};
pub use parallel::{run_pool, PoolResult};
pub use rate_limit::RateLimiter;
pub use report::{format_elapsed, RunReport};
pub use run::{BatchResult, Pipeline};
pub use stats::{RunStats, StatsSnapshot};
