//! On-disk learning data and the matching logic shared by every backend.

use enhancer_core::learning::{InteractionRecord, PatternInsight};
use enhancer_core::profile::EnrichmentProfile;
use enhancer_core::features::ComplexityLevel;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Task types must beat this success rate to be reported.
pub const HIGH_SUCCESS_RATE: f64 = 0.8;

/// One entry of `patterns.json`, keyed by pattern id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPattern {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_regex: Option<String>,

    #[serde(default = "default_confidence")]
    pub confidence_threshold: f64,

    #[serde(default)]
    pub success_rate: f64,
}

fn default_confidence() -> f64 {
    0.7
}

impl StoredPattern {
    pub fn new(pattern_regex: impl Into<String>, success_rate: f64) -> Self {
        Self {
            pattern_regex: Some(pattern_regex.into()),
            confidence_threshold: default_confidence(),
            success_rate,
        }
    }
}

/// Patterns sorted by id, so insights come out in a stable order.
pub type PatternBook = BTreeMap<String, StoredPattern>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskTypeMetrics {
    #[serde(default)]
    pub success_rate: f64,
}

/// `success_metrics.json`. Unknown top-level keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuccessMetrics {
    #[serde(default)]
    pub task_types: BTreeMap<String, TaskTypeMetrics>,
}

/// Patterns whose expression matches the prompt, case-insensitively.
/// Entries without an expression or with an invalid one are skipped.
pub fn match_patterns(book: &PatternBook, prompt: &str) -> Vec<PatternInsight> {
    book.iter()
        .filter_map(|(id, pattern)| {
            let expr = pattern.pattern_regex.as_deref()?;
            let re = match Regex::new(&format!("(?i){expr}")) {
                Ok(re) => re,
                Err(e) => {
                    debug!(pattern = %id, error = %e, "Skipping invalid learned pattern");
                    return None;
                }
            };
            re.is_match(prompt).then(|| PatternInsight {
                pattern_id: id.clone(),
                confidence: pattern.confidence_threshold,
                success_rate: pattern.success_rate,
            })
        })
        .collect()
}

/// One guidance line per task type with a high success rate.
pub fn success_guidance(metrics: &SuccessMetrics) -> Vec<String> {
    metrics
        .task_types
        .iter()
        .filter(|(_, data)| data.success_rate > HIGH_SUCCESS_RATE)
        .map(|(task, _)| format!("• {task} tasks show high success rates with current approach"))
        .collect()
}

/// Build a record with a fresh id and the current timestamp.
pub fn new_interaction(
    prompt_length: usize,
    enhancement_length: usize,
    profile: EnrichmentProfile,
    complexity: ComplexityLevel,
    applied_enrichments: Vec<String>,
    execution_time_ms: f64,
) -> InteractionRecord {
    InteractionRecord {
        id: uuid::Uuid::new_v4().to_string(),
        timestamp: chrono::Utc::now(),
        prompt_length,
        enhancement_length,
        profile,
        complexity,
        applied_enrichments,
        execution_time_ms,
        user_feedback: None,
    }
}
