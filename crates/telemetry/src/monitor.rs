//! Thread-safe performance monitor: timers, per-operation totals and
//! slow-operation warnings.

use crate::TelemetryError;
use crate::model::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Collects timings for the enhancer's operations.
///
/// Thread-safe via `RwLock`. A run that exceeds its operation's threshold
/// is logged at `warn` but otherwise treated like any other.
#[derive(Debug, Default)]
pub struct PerformanceMonitor {
    next_id: AtomicU64,
    /// Timers started but not yet ended.
    active: RwLock<HashMap<TimerId, (Operation, Instant)>>,
    stats: RwLock<BTreeMap<Operation, OperationStats>>,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Timers ────────────────────────────────────────────────────────

    pub fn start_timer(&self, operation: Operation) -> TimerId {
        let id = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.active
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, (operation, Instant::now()));
        id
    }

    /// Stop a timer and fold its duration into the totals.
    pub fn end_timer(&self, id: TimerId) -> Result<Duration, TelemetryError> {
        let (operation, started) = self
            .active
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id)
            .ok_or(TelemetryError::UnknownTimer(id))?;
        let elapsed = started.elapsed();
        self.observe(operation, elapsed);
        Ok(elapsed)
    }

    /// Time a closure.
    pub fn time<T>(&self, operation: Operation, f: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let value = f();
        self.observe(operation, started.elapsed());
        value
    }

    /// Record an externally measured duration.
    pub fn observe(&self, operation: Operation, elapsed: Duration) {
        let threshold = operation.threshold();
        if elapsed > threshold {
            tracing::warn!(
                operation = %operation,
                elapsed_ms = millis(elapsed),
                threshold_ms = millis(threshold),
                "Operation exceeded time threshold"
            );
        }
        self.stats
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(operation)
            .or_default()
            .observe(elapsed, threshold);
    }

    // ── Reporting ─────────────────────────────────────────────────────

    /// Timers that have been started but not ended.
    pub fn active_timers(&self) -> usize {
        self.active.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn report(&self) -> PerformanceReport {
        let stats = self.stats.read().unwrap_or_else(|e| e.into_inner());
        PerformanceReport {
            operations: stats
                .iter()
                .map(|(op, s)| OperationSummary::from_stats(*op, s))
                .collect(),
        }
    }

    pub fn reset(&self) {
        self.stats.write().unwrap_or_else(|e| e.into_inner()).clear();
        self.active.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}
