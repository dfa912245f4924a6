//! Context analyzer: runs every extractor and assembles the feature record.

use crate::cache::AnalysisCache;
use crate::extract;
use crate::patterns::PatternTables;
use enhancer_core::error::AnalysisError;
use enhancer_core::fault::{isolate, isolate_or_default};
use enhancer_core::features::FeatureRecord;
use enhancer_core::message::ConversationTurn;
use std::sync::Arc;
use tracing::debug;

/// Turns a prompt (plus history) into a [`FeatureRecord`].
///
/// Cheap to clone; the compiled tables and cache are shared.
#[derive(Debug, Clone)]
pub struct ContextAnalyzer {
    tables: Arc<PatternTables>,
    cache: Arc<AnalysisCache>,
}

impl ContextAnalyzer {
    pub fn new() -> Result<Self, AnalysisError> {
        Ok(Self::with_tables(Arc::new(PatternTables::compile()?)))
    }

    pub fn with_tables(tables: Arc<PatternTables>) -> Self {
        Self {
            tables,
            cache: Arc::new(AnalysisCache::new()),
        }
    }

    pub fn tables(&self) -> &PatternTables {
        &self.tables
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Analyze one prompt. Never panics: a failing extractor yields its
    /// neutral value, and a failure outside the extractors yields
    /// [`FeatureRecord::neutral`].
    pub fn analyze(&self, prompt: &str, history: &[ConversationTurn]) -> FeatureRecord {
        isolate(
            "analysis",
            || self.build_record(prompt, history),
            FeatureRecord::neutral,
        )
    }

    fn build_record(&self, prompt: &str, history: &[ConversationTurn]) -> FeatureRecord {
        let tables = self.tables.as_ref();
        let combined = extract::combined_text(prompt, history);

        let mut function_names =
            extract_field("function_names", || extract::prompt_function_names(tables, prompt));
        function_names.extend(extract_field("history_function_names", || {
            extract::history_function_names(tables, history)
        }));

        let record = FeatureRecord {
            technical_keywords: extract_field("technical_keywords", || {
                extract::technical_keywords(tables, prompt)
            }),
            file_references: extract_field("file_references", || {
                extract::file_references(tables, prompt)
            }),
            function_names,
            project_type: extract_field("project_type", || {
                extract::project_type(tables, &combined)
            }),
            technology_stack: extract_field("technology_stack", || {
                extract::technology_stack(tables, &combined)
            }),
            urgency_level: extract_field("urgency", || extract::urgency(tables, prompt)),
            complexity: extract_field("complexity", || extract::complexity(tables, prompt)),
            conversation: extract_field("conversation", || extract::conversation(history)),
            context_clues: extract_field("context_clues", || {
                extract::context_clues(tables, &self.cache, prompt)
            }),
            domain_terms: extract_field("domain_terms", || extract::domains(tables, prompt)),
            ultra_triggers: extract_field("ultra_triggers", || {
                extract::ultra_triggers(tables, prompt)
            }),
        };

        debug!(
            complexity = %record.complexity.level,
            project_type = record.project_type.as_str(),
            triggers = ?record.trigger_labels(),
            "Prompt analyzed"
        );
        record
    }
}

/// One extractor behind its own fault barrier.
fn extract_field<T: Default>(stage: &str, f: impl FnOnce() -> T) -> T {
    isolate_or_default(stage, || {
        #[cfg(test)]
        tests::fail_if_selected(stage);
        f()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use enhancer_core::features::{
        ComplexityLevel, ProjectType, Technology, TriggerCategory, UrgencyLevel,
    };
    use std::cell::Cell;

    thread_local! {
        static FAILING_STAGE: Cell<Option<&'static str>> = const { Cell::new(None) };
    }

    pub(super) fn fail_if_selected(stage: &str) {
        if FAILING_STAGE.with(Cell::get) == Some(stage) {
            panic!("{stage} extractor failed");
        }
    }

    fn analyzer() -> ContextAnalyzer {
        ContextAnalyzer::new().unwrap()
    }

    #[test]
    fn empty_prompt_gives_neutral_values() {
        let record = analyzer().analyze("", &[]);
        assert_eq!(record, FeatureRecord::neutral());
    }

    #[test]
    fn simple_fix_is_low_complexity() {
        let record = analyzer().analyze("fix typo in README.md", &[]);
        assert_eq!(record.complexity.level, ComplexityLevel::Low);
        assert!(record.file_references.contains("README.md"));
        assert!(record.ultra_triggers.is_empty());
        assert_eq!(record.urgency_level, UrgencyLevel::Normal);
    }

    #[test]
    fn architecture_prompt_is_extreme() {
        let record = analyzer().analyze(
            "Design a distributed microservice architecture for production. \
             Orchestrate multi-agent workflows.",
            &[],
        );
        assert_eq!(record.complexity.level, ComplexityLevel::Extreme);
        for expected in [
            TriggerCategory::Orchestration,
            TriggerCategory::Planning,
            TriggerCategory::HighStakes,
            TriggerCategory::ComplexTask,
        ] {
            assert!(record.ultra_triggers.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn history_feeds_stack_and_function_names() {
        let history = vec![
            ConversationTurn::new("We are building a Django backend"),
            ConversationTurn::new("the authenticate method keeps failing"),
        ];
        let record = analyzer().analyze("add a login page", &history);
        assert!(record.technology_stack.contains(&Technology::Python));
        assert_eq!(record.project_type, ProjectType::WebApp);
        assert!(record.function_names.contains("authenticate"));
        assert_eq!(record.conversation.message_count, 2);
    }

    #[test]
    fn analysis_is_deterministic() {
        let analyzer = analyzer();
        let prompt = "Refactor the payment module for performance, e.g. batch writes?";
        assert_eq!(analyzer.analyze(prompt, &[]), analyzer.analyze(prompt, &[]));
    }

    #[test]
    fn clones_share_the_cache() {
        let first = analyzer();
        let second = first.clone();
        first.analyze("what changed?", &[]);
        assert_eq!(second.cache().sizes().1, 1);
    }

    #[test]
    fn failing_extractor_leaves_other_fields_intact() {
        let analyzer = analyzer();
        let prompt = "refactor the Django login flow in views.py for production";
        let healthy = analyzer.analyze(prompt, &[]);

        FAILING_STAGE.with(|stage| stage.set(Some("technology_stack")));
        let degraded = analyzer.analyze(prompt, &[]);
        FAILING_STAGE.with(|stage| stage.set(None));

        assert!(healthy.technology_stack.contains(&Technology::Python));
        assert!(degraded.technology_stack.is_empty());
        assert_ne!(degraded, FeatureRecord::neutral());
        assert_eq!(degraded.complexity, healthy.complexity);
        assert_eq!(degraded.file_references, healthy.file_references);
        assert_eq!(degraded.project_type, healthy.project_type);
        assert_eq!(degraded.ultra_triggers, healthy.ultra_triggers);
        assert_eq!(degraded.technical_keywords, healthy.technical_keywords);
    }
}
