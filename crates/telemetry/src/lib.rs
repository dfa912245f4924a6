//! Operation timing for the prompt enhancer.
//!
//! Every stage of the pipeline (config load, template resolution, analysis,
//! the full enhancement) is timed against a fixed threshold. Slow runs are
//! logged; totals are available as a [`PerformanceReport`].

pub mod model;
pub mod monitor;

pub use model::{Operation, OperationSummary, PerformanceReport, TimerId};
pub use monitor::PerformanceMonitor;

/// Errors from the telemetry subsystem.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("unknown timer: {0}")]
    UnknownTimer(TimerId),
}
