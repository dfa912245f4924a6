//! Feature record — the single artifact produced for one incoming prompt.
//!
//! Every set-valued field is a `BTreeSet`, so two records built from the
//! same prompt compare equal regardless of match order and always render
//! in sorted order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Project category inferred from keyword overlap.
///
/// Declaration order is the tie-break order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    WebApp,
    MobileApp,
    CliTool,
    Library,
    DataScience,
    #[default]
    General,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebApp => "web_app",
            Self::MobileApp => "mobile_app",
            Self::CliTool => "cli_tool",
            Self::Library => "library",
            Self::DataScience => "data_science",
            Self::General => "general",
        }
    }
}

/// Technology labels detected by membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Technology {
    Python,
    JavaScript,
    TypeScript,
    Docker,
    Kubernetes,
}

impl Technology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::JavaScript => "JavaScript",
            Self::TypeScript => "TypeScript",
            Self::Docker => "Docker",
            Self::Kubernetes => "Kubernetes",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    High,
    Medium,
    Low,
    #[default]
    Normal,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Normal => "normal",
        }
    }
}

/// Complexity tier. Also used as the configured ultra-mode trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Extreme,
    High,
    Medium,
    #[default]
    Low,
}

impl ComplexityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extreme => "extreme",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Match counts per complexity tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityCounts {
    pub extreme: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ComplexityCounts {
    pub fn total(&self) -> usize {
        self.extreme + self.high + self.medium + self.low
    }

    /// Highest tier with a non-zero count; medium beats low only on a
    /// strictly larger count.
    pub fn level(&self) -> ComplexityLevel {
        if self.extreme > 0 {
            ComplexityLevel::Extreme
        } else if self.high > 0 {
            ComplexityLevel::High
        } else if self.medium > self.low {
            ComplexityLevel::Medium
        } else {
            ComplexityLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complexity {
    pub level: ComplexityLevel,
    pub counts: ComplexityCounts,
    pub total: usize,
}

impl Complexity {
    pub fn from_counts(counts: ComplexityCounts) -> Self {
        Self {
            level: counts.level(),
            counts,
            total: counts.total(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationPatterns {
    pub has_history: bool,
    pub message_count: usize,
    /// Turns whose content is longer than the depth threshold.
    pub technical_depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextClues {
    pub has_examples: bool,
    pub has_constraints: bool,
    pub has_questions: bool,
    pub has_commands: bool,
    pub word_count: usize,
    pub ambiguity_score: u8,
}

impl ContextClues {
    /// Prompts longer than this many words are considered unambiguous.
    pub const AMBIGUITY_WORD_THRESHOLD: usize = 20;

    pub fn ambiguity_for(word_count: usize) -> u8 {
        if word_count > Self::AMBIGUITY_WORD_THRESHOLD { 0 } else { 2 }
    }
}

impl Default for ContextClues {
    fn default() -> Self {
        Self {
            has_examples: false,
            has_constraints: false,
            has_questions: false,
            has_commands: false,
            word_count: 0,
            ambiguity_score: Self::ambiguity_for(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Medical,
    Finance,
    Education,
    Ecommerce,
    Gaming,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medical => "medical",
            Self::Finance => "finance",
            Self::Education => "education",
            Self::Ecommerce => "ecommerce",
            Self::Gaming => "gaming",
        }
    }
}

/// A named cluster of keywords indicating a specific reasoning need.
///
/// `ComplexTask` is synthetic: it is set by compound high-signal patterns
/// rather than by a keyword list, but counts as a category like the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCategory {
    ComplexReasoning,
    ComplexTask,
    HighStakes,
    Orchestration,
    Planning,
    Research,
}

impl TriggerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ComplexReasoning => "complex_reasoning",
            Self::ComplexTask => "complex_task",
            Self::HighStakes => "high_stakes",
            Self::Orchestration => "orchestration",
            Self::Planning => "planning",
            Self::Research => "research",
        }
    }
}

impl std::fmt::Display for TriggerCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the analyzer derives from one prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub technical_keywords: BTreeSet<String>,
    pub file_references: BTreeSet<String>,
    pub function_names: BTreeSet<String>,
    pub project_type: ProjectType,
    pub technology_stack: BTreeSet<Technology>,
    pub urgency_level: UrgencyLevel,
    pub complexity: Complexity,
    pub conversation: ConversationPatterns,
    pub context_clues: ContextClues,
    pub domain_terms: BTreeSet<Domain>,
    pub ultra_triggers: BTreeSet<TriggerCategory>,
}

impl FeatureRecord {
    /// The all-neutral record used when analysis fails as a whole.
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Trigger category labels, sorted.
    pub fn trigger_labels(&self) -> Vec<&'static str> {
        let mut labels: Vec<&'static str> =
            self.ultra_triggers.iter().map(TriggerCategory::as_str).collect();
        labels.sort_unstable();
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medium_needs_strictly_more_than_low() {
        let tied = ComplexityCounts { medium: 1, low: 1, ..Default::default() };
        assert_eq!(tied.level(), ComplexityLevel::Low);

        let ahead = ComplexityCounts { medium: 2, low: 1, ..Default::default() };
        assert_eq!(ahead.level(), ComplexityLevel::Medium);
    }

    #[test]
    fn extreme_wins_over_everything() {
        let counts = ComplexityCounts { extreme: 1, high: 3, medium: 5, low: 9 };
        let complexity = Complexity::from_counts(counts);
        assert_eq!(complexity.level, ComplexityLevel::Extreme);
        assert_eq!(complexity.total, 18);
    }

    #[test]
    fn neutral_record_is_fully_populated() {
        let record = FeatureRecord::neutral();
        assert_eq!(record.project_type, ProjectType::General);
        assert_eq!(record.urgency_level, UrgencyLevel::Normal);
        assert_eq!(record.complexity.level, ComplexityLevel::Low);
        assert_eq!(record.context_clues.ambiguity_score, 2);
        assert!(!record.conversation.has_history);
    }

    #[test]
    fn trigger_labels_are_sorted() {
        let mut record = FeatureRecord::neutral();
        record.ultra_triggers.insert(TriggerCategory::Research);
        record.ultra_triggers.insert(TriggerCategory::HighStakes);
        record.ultra_triggers.insert(TriggerCategory::Orchestration);
        assert_eq!(
            record.trigger_labels(),
            vec!["high_stakes", "orchestration", "research"]
        );
    }

    #[test]
    fn labels_serialize_in_snake_case() {
        let json = serde_json::to_string(&ProjectType::DataScience).unwrap();
        assert_eq!(json, "\"data_science\"");
        let json = serde_json::to_string(&TriggerCategory::ComplexReasoning).unwrap();
        assert_eq!(json, "\"complex_reasoning\"");
    }
}
