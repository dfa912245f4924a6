//! Enrichment profile and the reasons it was chosen.

use crate::features::{ComplexityLevel, TriggerCategory};
use serde::{Deserialize, Serialize};

/// Which family of layers the composer emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentProfile {
    #[default]
    Standard,
    /// Extended reasoning: protocol layers are emitted before the standard ones.
    Ultra,
}

impl EnrichmentProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Ultra => "ultra",
        }
    }

    pub fn is_ultra(&self) -> bool {
        matches!(self, Self::Ultra)
    }
}

impl std::fmt::Display for EnrichmentProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerReason {
    /// Ultra mode is switched off in configuration.
    UltraDisabled,
    /// Complexity level equals the configured trigger level.
    ComplexityMatched { level: ComplexityLevel },
    /// Two or more distinct trigger categories were detected.
    MultipleTriggers { categories: Vec<TriggerCategory> },
    /// No rule fired.
    BelowThreshold,
}

impl std::fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UltraDisabled => f.write_str("ultra mode disabled"),
            Self::ComplexityMatched { level } => write!(f, "complexity {level}"),
            Self::MultipleTriggers { categories } => {
                let names: Vec<&str> = categories.iter().map(TriggerCategory::as_str).collect();
                write!(f, "triggers {}", names.join(", "))
            }
            Self::BelowThreshold => f.write_str("below threshold"),
        }
    }
}

/// Output of the mode selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDecision {
    pub profile: EnrichmentProfile,
    pub reasons: Vec<TriggerReason>,
}

impl ModeDecision {
    pub fn standard(reason: TriggerReason) -> Self {
        Self {
            profile: EnrichmentProfile::Standard,
            reasons: vec![reason],
        }
    }

    pub fn ultra(reason: TriggerReason) -> Self {
        Self {
            profile: EnrichmentProfile::Ultra,
            reasons: vec![reason],
        }
    }
}
