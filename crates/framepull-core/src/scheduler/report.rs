//! End-of-run summary (counts and elapsed wall-clock time).
//!
//! Built once after the drain barrier; pure presentation.

use std::fmt;
use std::time::Duration;

use super::stats::StatsSnapshot;

const RULE: &str = "==================================================";

#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: StatsSnapshot,
    pub elapsed: Duration,
    /// Rows never dispatched because a stop was requested.
    pub not_dispatched: usize,
}

impl RunReport {
    pub fn interrupted(&self) -> bool {
        self.not_dispatched > 0
    }

    fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            RULE.to_string(),
            format!("Processing completed in {}", format_elapsed(self.elapsed)),
            format!("Total items: {}", self.stats.total),
            format!("Successful: {}", self.stats.successful),
            format!("Partial success: {}", self.stats.partial),
            format!("Failed: {}", self.stats.failed),
        ];
        if self.interrupted() {
            lines.push(format!("Not dispatched (stopped): {}", self.not_dispatched));
        }
        lines.push(RULE.to_string());
        lines
    }

    /// Emit the summary through tracing, one line per event.
    pub fn log(&self) {
        for line in self.lines() {
            tracing::info!("{}", line);
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// `{h}h {m}m {s}s`, whole seconds.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}
