//! Enrichment for the prompt enhancer.
//!
//! Turns a [`FeatureRecord`](enhancer_core::features::FeatureRecord) and a
//! selected profile into the final document:
//!
//! - [`layers`]: the eight enrichment layers and how each is built
//! - [`composer`]: layer ordering, filtering and joining
//! - [`wrapper`]: header, footer, prompt escaping and the fallback document
//! - [`bypass`]: prompts that skip enrichment
//! - [`templates`]: on-disk and in-memory template stores
//! - [`pipeline`]: the [`Enhancer`] that runs a hook request end to end

pub mod bypass;
pub mod composer;
pub mod layers;
pub mod pipeline;
pub mod templates;
pub mod wrapper;

pub use bypass::BypassRules;
pub use composer::{Composer, Composition};
pub use layers::{Layer, LayerKind};
pub use pipeline::{AnalysisReport, Enhancement, Enhancer, HookOutcome};
pub use templates::{FileTemplateStore, InMemoryTemplates};
pub use wrapper::{escape_prompt, fallback_document, wrap};
