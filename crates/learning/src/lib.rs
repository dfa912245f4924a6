//! Learning backends for the prompt enhancer.

pub mod file_backend;
pub mod in_memory;
pub mod model;
pub mod noop;

pub use file_backend::FileLearner;
pub use in_memory::InMemoryLearner;
pub use model::{PatternBook, StoredPattern, SuccessMetrics, new_interaction};
pub use noop::NoopLearner;

use enhancer_config::EnhancerConfig;
use enhancer_core::learning::PatternLearner;
use std::sync::Arc;

/// Pick the learner the configuration asks for.
pub fn learner_from_config(config: &EnhancerConfig) -> Arc<dyn PatternLearner> {
    if config.learning.enabled {
        Arc::new(FileLearner::new(config.learning_dir()))
    } else {
        Arc::new(NoopLearner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_learning_selects_noop() {
        let config = EnhancerConfig::default();
        assert_eq!(learner_from_config(&config).name(), "none");
    }

    #[test]
    fn enabled_learning_uses_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = EnhancerConfig::default();
        config.learning.enabled = true;
        config.learning.directory = Some(dir.path().to_path_buf());
        assert_eq!(learner_from_config(&config).name(), "file");
    }
}
