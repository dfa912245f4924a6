//! The enhancement pipeline.
//!
//! [`Enhancer`] is built once at process start and owns every piece of
//! shared state: the config cache, the analyzer (tables + memo cache), the
//! template store, the learner and the performance monitor. Each request
//! flows through it start to finish:
//!
//! ```text
//! input → bypass? → analyze → select mode → compose → wrap → output
//!                                                      └→ learner.record
//! ```

use crate::bypass::BypassRules;
use crate::composer::{Composer, Composition};
use crate::templates::FileTemplateStore;
use crate::wrapper::{escape_prompt, fallback_document, wrap};
use enhancer_analysis::{ContextAnalyzer, select_mode};
use enhancer_config::{ConfigCache, EnhancerConfig};
use enhancer_core::error::Result;
use enhancer_core::fault::isolate;
use enhancer_core::features::FeatureRecord;
use enhancer_core::learning::PatternLearner;
use enhancer_core::message::HookInput;
use enhancer_core::profile::ModeDecision;
use enhancer_core::template::{TemplateSource, TemplateVars};
use enhancer_learning::{learner_from_config, new_interaction};
use enhancer_telemetry::model::millis;
use enhancer_telemetry::{Operation, PerformanceMonitor, PerformanceReport};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const INSIGHTS_HEADING: &str = "🧠 LEARNING INSIGHTS:";
pub const SUCCESS_HEADING: &str = "📊 SUCCESS PATTERNS:";

/// What the hook prints for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome {
    /// No prompt: print an empty line.
    Empty,
    /// A bypass rule matched: print the cleaned prompt.
    Bypassed(String),
    Enhanced(Box<Enhancement>),
    /// The pipeline failed: print the fallback document.
    Fallback(String),
}

impl HookOutcome {
    /// The text to write to stdout.
    pub fn output(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Bypassed(text) | Self::Fallback(text) => text,
            Self::Enhanced(enhancement) => &enhancement.document,
        }
    }

    pub fn is_enhanced(&self) -> bool {
        matches!(self, Self::Enhanced(_))
    }
}

/// A successfully enhanced prompt and everything that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Enhancement {
    pub document: String,
    pub features: FeatureRecord,
    pub decision: ModeDecision,
    pub composition: Composition,
}

/// Analysis-only view of a prompt, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub features: FeatureRecord,
    pub decision: ModeDecision,
    pub timings: PerformanceReport,
}

pub struct Enhancer {
    config: ConfigCache,
    analyzer: ContextAnalyzer,
    templates: Arc<dyn TemplateSource>,
    learner: Arc<dyn PatternLearner>,
    monitor: PerformanceMonitor,
}

impl Enhancer {
    /// Build an enhancer whose template store and learner follow the
    /// configuration current at construction time.
    pub fn new(config: ConfigCache) -> Result<Self> {
        let snapshot = config.get();
        let templates: Arc<dyn TemplateSource> =
            Arc::new(FileTemplateStore::new(snapshot.templates_dir()));
        let learner = learner_from_config(&snapshot);
        debug!(
            templates = %snapshot.templates_dir().display(),
            learner = learner.name(),
            "Enhancer initialized"
        );
        Ok(Self {
            config,
            analyzer: ContextAnalyzer::new()?,
            templates,
            learner,
            monitor: PerformanceMonitor::new(),
        })
    }

    pub fn with_templates(mut self, templates: Arc<dyn TemplateSource>) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_learner(mut self, learner: Arc<dyn PatternLearner>) -> Self {
        self.learner = learner;
        self
    }

    pub fn config(&self) -> Arc<EnhancerConfig> {
        self.config.get()
    }

    pub fn monitor(&self) -> &PerformanceMonitor {
        &self.monitor
    }

    pub fn learner(&self) -> &dyn PatternLearner {
        self.learner.as_ref()
    }

    /// Run one hook request. Never panics.
    pub fn process(&self, input: &HookInput) -> HookOutcome {
        if input.is_empty() {
            return HookOutcome::Empty;
        }
        let prompt = input.prompt.as_str();
        let config = self.monitor.time(Operation::ConfigLoad, || self.config.get());

        if let Some(cleaned) = BypassRules::from_config(&config.bypass).check(prompt) {
            debug!("Prompt bypassed");
            return HookOutcome::Bypassed(cleaned);
        }

        let escaped = escape_prompt(prompt);
        isolate(
            "pipeline",
            || HookOutcome::Enhanced(Box::new(self.enhance(input, &escaped, &config))),
            || HookOutcome::Fallback(fallback_document(&escaped)),
        )
    }

    fn enhance(&self, input: &HookInput, escaped: &str, config: &EnhancerConfig) -> Enhancement {
        let timer = self.monitor.start_timer(Operation::Enhancement);

        let features = self.monitor.time(Operation::Analysis, || {
            self.analyzer.analyze(&input.prompt, &input.history)
        });
        let decision = select_mode(&features, config);

        let templates = TimedTemplates {
            inner: self.templates.as_ref(),
            monitor: &self.monitor,
        };
        let mut composition = Composer::new(config, &templates).compose(decision.profile, &features);
        if config.learning.include_insights {
            append_learning(&mut composition.body, self.learner.as_ref(), &input.prompt);
        }

        let document = wrap(escaped, &features, &composition, config);
        let elapsed_ms = match self.monitor.end_timer(timer) {
            Ok(elapsed) => millis(elapsed),
            Err(e) => {
                debug!(error = %e, "Enhancement timer missing");
                0.0
            }
        };

        info!(
            profile = %decision.profile,
            complexity = %features.complexity.level,
            layers = composition.layers.len(),
            elapsed_ms,
            "Prompt enhanced"
        );
        self.record(&input.prompt, &features, &composition, elapsed_ms);

        Enhancement {
            document,
            features,
            decision,
            composition,
        }
    }

    /// Hand the interaction to the learner. Failures are logged only.
    fn record(
        &self,
        prompt: &str,
        features: &FeatureRecord,
        composition: &Composition,
        elapsed_ms: f64,
    ) {
        let record = new_interaction(
            prompt.chars().count(),
            composition.body.chars().count(),
            composition.profile,
            features.complexity.level,
            composition.layer_names(),
            elapsed_ms,
        );
        let result = isolate(
            "learning",
            || self.learner.record(&record),
            || Ok(()),
        );
        if let Err(e) = result {
            warn!(learner = self.learner.name(), error = %e, "Failed to record interaction");
        }
    }

    /// Features and mode decision without composing a document.
    pub fn analyze(&self, input: &HookInput) -> AnalysisReport {
        let config = self.monitor.time(Operation::ConfigLoad, || self.config.get());
        let features = self.monitor.time(Operation::Analysis, || {
            self.analyzer.analyze(&input.prompt, &input.history)
        });
        let decision = select_mode(&features, &config);
        AnalysisReport {
            features,
            decision,
            timings: self.monitor.report(),
        }
    }
}

/// Append the learner's insight and success blocks to the body.
fn append_learning(body: &mut String, learner: &dyn PatternLearner, prompt: &str) {
    let insights = learner.insights(prompt);
    if !insights.is_empty() {
        let lines: Vec<String> = insights.iter().map(ToString::to_string).collect();
        body.push_str("\n\n");
        body.push_str(INSIGHTS_HEADING);
        body.push('\n');
        body.push_str(&lines.join("\n"));
    }

    let guidance = learner.success_guidance();
    if !guidance.is_empty() {
        body.push_str("\n\n");
        body.push_str(SUCCESS_HEADING);
        body.push('\n');
        body.push_str(&guidance.join("\n"));
    }
}

/// Template source that reports each fetch to the monitor.
struct TimedTemplates<'a> {
    inner: &'a dyn TemplateSource,
    monitor: &'a PerformanceMonitor,
}

impl TemplateSource for TimedTemplates<'_> {
    fn fetch(&self, name: &str, vars: &TemplateVars) -> String {
        self.monitor
            .time(Operation::TemplateLoad, || self.inner.fetch(name, vars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::InMemoryTemplates;
    use enhancer_core::error::LearningError;
    use enhancer_core::learning::{InteractionRecord, PatternInsight};
    use enhancer_core::profile::EnrichmentProfile;
    use enhancer_learning::{InMemoryLearner, StoredPattern};

    fn enhancer_with(config: EnhancerConfig) -> Enhancer {
        Enhancer::new(ConfigCache::fixed(config))
            .unwrap()
            .with_templates(Arc::new(InMemoryTemplates::builtin()))
    }

    fn enhancer() -> Enhancer {
        enhancer_with(EnhancerConfig::default())
    }

    #[test]
    fn empty_prompt_is_empty_outcome() {
        let outcome = enhancer().process(&HookInput::default());
        assert_eq!(outcome, HookOutcome::Empty);
        assert_eq!(outcome.output(), "");
    }

    #[test]
    fn bypass_prefix_is_stripped() {
        let outcome = enhancer().process(&HookInput::new("*just echo this"));
        assert_eq!(outcome.output(), "just echo this");
    }

    #[test]
    fn simple_prompt_gets_standard_document() {
        let outcome = enhancer().process(&HookInput::new("fix a typo"));
        let HookOutcome::Enhanced(enhancement) = &outcome else {
            panic!("expected an enhanced outcome, got {outcome:?}");
        };
        assert_eq!(enhancement.decision.profile, EnrichmentProfile::Standard);
        assert!(enhancement.document.contains("[STANDARD MODE]"));
        assert!(!enhancement.document.contains("REASONING PROTOCOL"));
        assert!(enhancement.document.contains("DESIGN GUIDANCE"));
    }

    #[test]
    fn monitor_sees_every_stage() {
        let enhancer = enhancer();
        enhancer.process(&HookInput::new("add a button"));
        let report = enhancer.monitor().report();
        for op in [Operation::ConfigLoad, Operation::Analysis, Operation::Enhancement] {
            assert_eq!(report.get(op).unwrap().count, 1, "{op}");
        }
        assert_eq!(report.get(Operation::TemplateLoad).unwrap().count, 4);
        assert_eq!(enhancer.monitor().active_timers(), 0);
    }

    #[test]
    fn interactions_are_recorded() {
        let learner = Arc::new(InMemoryLearner::new());
        let enhancer = enhancer().with_learner(learner.clone());
        enhancer.process(&HookInput::new("add a button"));
        let records = learner.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].prompt_length, "add a button".len());
        assert_eq!(records[0].applied_enrichments.len(), 4);
    }

    #[test]
    fn insights_are_appended_when_enabled() {
        let mut config = EnhancerConfig::default();
        config.learning.include_insights = true;
        let learner = Arc::new(
            InMemoryLearner::new()
                .with_pattern("button_work", StoredPattern::new("button", 0.9))
                .with_task_type("ui", 0.95),
        );
        let outcome = enhancer_with(config)
            .with_learner(learner)
            .process(&HookInput::new("add a button"));
        let doc = outcome.output();
        assert!(doc.contains("🧠 LEARNING INSIGHTS:\n• Pattern detected: button_work"));
        assert!(doc.contains("📊 SUCCESS PATTERNS:\n• ui tasks show high success rates"));
    }

    struct BrokenLearner;

    impl PatternLearner for BrokenLearner {
        fn name(&self) -> &str {
            "broken"
        }
        fn insights(&self, _prompt: &str) -> Vec<PatternInsight> {
            panic!("insight store corrupted")
        }
        fn success_guidance(&self) -> Vec<String> {
            Vec::new()
        }
        fn record(&self, _record: &InteractionRecord) -> std::result::Result<(), LearningError> {
            Err(LearningError::Storage("disk full".into()))
        }
    }

    #[test]
    fn record_failures_do_not_change_output() {
        let plain = enhancer().process(&HookInput::new("add a button"));
        let broken = enhancer()
            .with_learner(Arc::new(BrokenLearner))
            .process(&HookInput::new("add a button"));
        assert_eq!(plain.output(), broken.output());
    }

    #[test]
    fn pipeline_fault_yields_fallback_document() {
        let mut config = EnhancerConfig::default();
        config.learning.include_insights = true;
        let outcome = enhancer_with(config)
            .with_learner(Arc::new(BrokenLearner))
            .process(&HookInput::new("say \"hi\""));
        let HookOutcome::Fallback(doc) = &outcome else {
            panic!("expected fallback, got {outcome:?}");
        };
        assert!(doc.starts_with("# Enhanced Request"));
        assert!(doc.contains("say \\\"hi\\\""));
    }

    #[test]
    fn analyze_reports_without_composing() {
        let enhancer = enhancer();
        let report = enhancer.analyze(&HookInput::new(
            "orchestrate a multi-agent distributed microservice architecture for production",
        ));
        assert_eq!(report.decision.profile, EnrichmentProfile::Ultra);
        assert!(report.timings.get(Operation::Enhancement).is_none());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["features"]["complexity"]["level"], "extreme");
    }
}
