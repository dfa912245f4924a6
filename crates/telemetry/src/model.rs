//! Data model for timed operations and performance reports.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ── Operation ─────────────────────────────────────────────────────────────

/// The kind of work being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Reading and merging the configuration file.
    ConfigLoad,
    /// Resolving one standard template.
    TemplateLoad,
    /// Feature extraction for one prompt.
    Analysis,
    /// The whole enhancement pipeline for one prompt.
    Enhancement,
}

impl Operation {
    /// Duration above which the operation is logged as slow.
    pub fn threshold(&self) -> Duration {
        match self {
            Self::ConfigLoad => Duration::from_millis(100),
            Self::TemplateLoad => Duration::from_millis(50),
            Self::Analysis => Duration::from_millis(200),
            Self::Enhancement => Duration::from_millis(500),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigLoad => "config_load",
            Self::TemplateLoad => "template_load",
            Self::Analysis => "analysis",
            Self::Enhancement => "enhancement",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle returned by `start_timer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub(crate) u64);

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

// ── Aggregates ────────────────────────────────────────────────────────────

/// Running totals for one operation kind.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct OperationStats {
    pub count: u64,
    pub total: Duration,
    pub max: Duration,
    pub slow: u64,
}

impl OperationStats {
    pub fn observe(&mut self, elapsed: Duration, threshold: Duration) {
        self.count += 1;
        self.total += elapsed;
        self.max = self.max.max(elapsed);
        if elapsed > threshold {
            self.slow += 1;
        }
    }
}

/// Per-operation summary line of a [`PerformanceReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSummary {
    pub operation: Operation,
    pub count: u64,
    pub avg_ms: f64,
    pub max_ms: f64,
    pub threshold_ms: f64,
    /// How many runs exceeded the threshold.
    pub slow_count: u64,
}

impl OperationSummary {
    pub(crate) fn from_stats(operation: Operation, stats: &OperationStats) -> Self {
        let avg = if stats.count == 0 {
            0.0
        } else {
            millis(stats.total) / stats.count as f64
        };
        Self {
            operation,
            count: stats.count,
            avg_ms: avg,
            max_ms: millis(stats.max),
            threshold_ms: millis(operation.threshold()),
            slow_count: stats.slow,
        }
    }
}

/// Snapshot of everything timed so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub operations: Vec<OperationSummary>,
}

impl PerformanceReport {
    pub fn get(&self, operation: Operation) -> Option<&OperationSummary> {
        self.operations.iter().find(|s| s.operation == operation)
    }

    pub fn total_count(&self) -> u64 {
        self.operations.iter().map(|s| s.count).sum()
    }
}

pub fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
