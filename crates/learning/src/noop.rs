//! No-op learner — disables learning entirely.

use enhancer_core::error::LearningError;
use enhancer_core::learning::{InteractionRecord, PatternInsight, PatternLearner};

/// A learner that knows nothing and stores nothing.
pub struct NoopLearner;

impl PatternLearner for NoopLearner {
    fn name(&self) -> &str {
        "none"
    }

    fn insights(&self, _prompt: &str) -> Vec<PatternInsight> {
        Vec::new()
    }

    fn success_guidance(&self) -> Vec<String> {
        Vec::new()
    }

    fn record(&self, _record: &InteractionRecord) -> Result<(), LearningError> {
        Ok(())
    }
}
