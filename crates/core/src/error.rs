//! Error types for the prompt enhancer domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all enhancer operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Template errors ---
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    // --- Learning errors ---
    #[error("Learning error: {0}")]
    Learning(#[from] LearningError),

    // --- Analysis errors ---
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum TemplateError {
    #[error("Invalid template name: {0}")]
    InvalidName(String),

    #[error("Template not found: {name} (looked in {path})")]
    NotFound { name: String, path: String },

    #[error("Failed to read template {name}: {reason}")]
    ReadFailed { name: String, reason: String },
}

#[derive(Debug, Error)]
pub enum LearningError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Malformed learning data in {file}: {reason}")]
    Malformed { file: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    #[error("Pattern '{name}' failed to compile: {reason}")]
    PatternCompile { name: String, reason: String },
}
