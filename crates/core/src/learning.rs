//! Learning trait — historical pattern insights and interaction recording.
//!
//! The enhancer consults a learner for optional insight blocks and hands it
//! a record of every enhancement once the output has been produced.
//! Recording is fire-and-forget: failures are logged by the caller and never
//! change the hook's output.

use crate::error::LearningError;
use crate::features::ComplexityLevel;
use crate::profile::EnrichmentProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One enhancement, as stored by learning backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Unique ID for this interaction
    pub id: String,

    pub timestamp: DateTime<Utc>,

    /// Length of the original prompt in characters
    pub prompt_length: usize,

    /// Length of the produced enrichment body in characters
    pub enhancement_length: usize,

    pub profile: EnrichmentProfile,

    pub complexity: ComplexityLevel,

    /// Names of the layers that made it into the document
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applied_enrichments: Vec<String>,

    pub execution_time_ms: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_feedback: Option<String>,
}

/// A historical pattern that matched the current prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternInsight {
    pub pattern_id: String,
    /// 0.0–1.0
    pub confidence: f64,
    /// 0.0–1.0
    pub success_rate: f64,
}

impl std::fmt::Display for PatternInsight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "• Pattern detected: {} (confidence: {:.1}%, success_rate: {:.1}%)",
            self.pattern_id,
            self.confidence * 100.0,
            self.success_rate * 100.0
        )
    }
}

/// Capability interface for the optional learning subsystem.
///
/// A no-op implementation is selected at startup when learning is disabled.
pub trait PatternLearner: Send + Sync {
    /// Backend name (e.g. "none", "file", "in_memory").
    fn name(&self) -> &str;

    /// Stored patterns whose expression matches the prompt.
    fn insights(&self, prompt: &str) -> Vec<PatternInsight>;

    /// Task types with a high historical success rate.
    fn success_guidance(&self) -> Vec<String>;

    /// Persist one interaction.
    fn record(&self, record: &InteractionRecord) -> Result<(), LearningError>;
}
