//! # Prompt Enhancer Core
//!
//! Domain types, traits, and error definitions for the prompt enhancer.
//! This crate has **no I/O** — it defines the domain model that the
//! analysis, enrichment, and learning crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (template storage, learning) is defined as a
//! trait here. Implementations live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with in-memory implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod fault;
pub mod features;
pub mod learning;
pub mod message;
pub mod profile;
pub mod template;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use features::{
    Complexity, ComplexityCounts, ComplexityLevel, ContextClues, ConversationPatterns, Domain,
    FeatureRecord, ProjectType, Technology, TriggerCategory, UrgencyLevel,
};
pub use learning::{InteractionRecord, PatternInsight, PatternLearner};
pub use message::{ConversationTurn, HookInput};
pub use profile::{EnrichmentProfile, ModeDecision, TriggerReason};
pub use template::{TemplateSource, TemplateVars};
