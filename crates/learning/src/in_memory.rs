//! In-memory learner — useful for testing and ephemeral sessions.

use crate::model::{PatternBook, StoredPattern, SuccessMetrics, TaskTypeMetrics};
use crate::model::{match_patterns, success_guidance};
use enhancer_core::error::LearningError;
use enhancer_core::learning::{InteractionRecord, PatternInsight, PatternLearner};
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryLearner {
    patterns: RwLock<PatternBook>,
    metrics: RwLock<SuccessMetrics>,
    records: RwLock<Vec<InteractionRecord>>,
}

impl InMemoryLearner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern(self, id: impl Into<String>, pattern: StoredPattern) -> Self {
        self.patterns
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.into(), pattern);
        self
    }

    pub fn with_task_type(self, task: impl Into<String>, success_rate: f64) -> Self {
        self.metrics
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .task_types
            .insert(task.into(), TaskTypeMetrics { success_rate });
        self
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<InteractionRecord> {
        self.records.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl PatternLearner for InMemoryLearner {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn insights(&self, prompt: &str) -> Vec<PatternInsight> {
        match_patterns(&self.patterns.read().unwrap_or_else(|e| e.into_inner()), prompt)
    }

    fn success_guidance(&self) -> Vec<String> {
        success_guidance(&self.metrics.read().unwrap_or_else(|e| e.into_inner()))
    }

    fn record(&self, record: &InteractionRecord) -> Result<(), LearningError> {
        self.records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone());
        Ok(())
    }
}
