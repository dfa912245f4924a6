//! # Prompt Analysis
//!
//! Feature extraction and mode selection.
//!
//! [`ContextAnalyzer`] turns a prompt and its conversation history into a
//! [`FeatureRecord`](enhancer_core::FeatureRecord); [`select_mode`] decides
//! between the standard and ultra enrichment profiles from that record and
//! the active configuration.
//!
//! All pattern tables are compiled once into [`PatternTables`] and shared
//! read-only. Extraction never fails: each extractor runs behind its own
//! fault barrier and degrades to a neutral value.

pub mod analyzer;
pub mod cache;
pub mod extract;
pub mod patterns;
pub mod selector;

pub use analyzer::ContextAnalyzer;
pub use cache::AnalysisCache;
pub use patterns::PatternTables;
pub use selector::select_mode;
