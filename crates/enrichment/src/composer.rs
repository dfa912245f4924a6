//! Enrichment composition: ordering, filtering and joining layers.
//!
//! Layer order is fixed. For the ultra profile the four protocol layers
//! come first (reasoning, output format, uncertainty, tool use), followed by
//! the standard guidance layers (design, excellence, tool preferences,
//! workspace methodology). Layers that come out empty are skipped.
//!
//! # Determinism
//!
//! Composition is a pure function of the profile, the feature record, the
//! configuration and the template bodies. Identical inputs produce a
//! byte-identical body.

use crate::layers::{self, Layer, LayerKind};
use enhancer_config::EnhancerConfig;
use enhancer_core::fault::isolate;
use enhancer_core::features::FeatureRecord;
use enhancer_core::profile::EnrichmentProfile;
use enhancer_core::template::TemplateSource;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Joins adjacent layers.
pub const SEPARATOR: &str =
    "\n\n═══════════════════════════════════════════════════════════════════\n\n";

/// The composed enrichment body plus what went into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    /// Joined layer text; empty when enrichment is off or nothing was produced.
    pub body: String,
    pub profile: EnrichmentProfile,
    /// Sorted trigger category labels.
    pub trigger_summary: Vec<String>,
    /// Layers that made it into the body, in order.
    pub layers: Vec<LayerKind>,
}

impl Composition {
    pub fn empty(profile: EnrichmentProfile, trigger_summary: Vec<String>) -> Self {
        Self {
            body: String::new(),
            profile,
            trigger_summary,
            layers: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn layer_names(&self) -> Vec<String> {
        self.layers.iter().map(|k| k.as_str().to_string()).collect()
    }
}

/// Builds a [`Composition`] for one request.
pub struct Composer<'a> {
    config: &'a EnhancerConfig,
    templates: &'a dyn TemplateSource,
}

impl<'a> Composer<'a> {
    pub fn new(config: &'a EnhancerConfig, templates: &'a dyn TemplateSource) -> Self {
        Self { config, templates }
    }

    /// Layer kinds considered for a profile, in emission order.
    pub fn plan(profile: EnrichmentProfile) -> Vec<LayerKind> {
        let mut plan = Vec::with_capacity(8);
        if profile.is_ultra() {
            plan.extend(LayerKind::ULTRA);
        }
        plan.extend(LayerKind::STANDARD);
        plan
    }

    /// Compose the enrichment body. A panic while building or joining
    /// layers yields an empty body.
    pub fn compose(&self, profile: EnrichmentProfile, features: &FeatureRecord) -> Composition {
        let triggers: Vec<String> =
            features.trigger_labels().into_iter().map(String::from).collect();

        if !self.config.enrichment.enabled {
            debug!("Enrichment disabled");
            return Composition::empty(profile, triggers);
        }

        let fallback_triggers = triggers.clone();
        isolate(
            "composition",
            || self.assemble(profile, triggers),
            || Composition::empty(profile, fallback_triggers),
        )
    }

    fn assemble(&self, profile: EnrichmentProfile, trigger_summary: Vec<String>) -> Composition {
        let built: Vec<Layer> = Self::plan(profile)
            .into_iter()
            .filter_map(|kind| layers::build(kind, self.config, self.templates))
            .collect();

        let body = join(&built);
        debug!(
            profile = %profile,
            layers = built.len(),
            chars = body.len(),
            "Enrichment composed"
        );
        Composition {
            body,
            profile,
            trigger_summary,
            layers: built.iter().map(|layer| layer.kind).collect(),
        }
    }
}

/// Join layer contents with [`SEPARATOR`]. No layers, empty string.
pub fn join(layers: &[Layer]) -> String {
    layers
        .iter()
        .map(|layer| layer.content.as_str())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::InMemoryTemplates;
    use enhancer_core::features::TriggerCategory;
    use enhancer_core::template::TemplateVars;

    fn templates() -> InMemoryTemplates {
        InMemoryTemplates::new()
            .with("design_guidance", "DESIGN")
            .with("excellence_criteria", "EXCELLENCE")
            .with("tool_preferences", "TOOLS")
            .with("workspace_methodology", "WORKSPACE")
    }

    #[test]
    fn standard_profile_joins_template_layers() {
        let config = EnhancerConfig::default();
        let templates = templates();
        let composition = Composer::new(&config, &templates)
            .compose(EnrichmentProfile::Standard, &FeatureRecord::neutral());
        assert_eq!(
            composition.body,
            ["DESIGN", "EXCELLENCE", "TOOLS", "WORKSPACE"].join(SEPARATOR)
        );
        assert_eq!(composition.layers, LayerKind::STANDARD.to_vec());
    }

    #[test]
    fn ultra_protocols_come_first_in_order() {
        let config = EnhancerConfig::default();
        let templates = templates();
        let composition = Composer::new(&config, &templates)
            .compose(EnrichmentProfile::Ultra, &FeatureRecord::neutral());

        assert_eq!(&composition.layers[..4], &LayerKind::ULTRA);
        let body = &composition.body;
        let positions: Vec<usize> = [
            "REASONING PROTOCOL",
            "OUTPUT FORMAT REQUIREMENTS",
            "UNCERTAINTY HANDLING PROTOCOL",
            "ReAct + Parallel Tool Use",
            "DESIGN",
        ]
        .iter()
        .map(|needle| body.find(needle).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn disabled_enrichment_gives_empty_body() {
        let mut config = EnhancerConfig::default();
        config.enrichment.enabled = false;
        let templates = templates();
        let composition = Composer::new(&config, &templates)
            .compose(EnrichmentProfile::Ultra, &FeatureRecord::neutral());
        assert!(composition.is_empty());
        assert!(composition.layers.is_empty());
    }

    #[test]
    fn empty_layers_are_skipped() {
        let config = EnhancerConfig::default();
        let templates = InMemoryTemplates::new().with("tool_preferences", "ONLY");
        let composition = Composer::new(&config, &templates)
            .compose(EnrichmentProfile::Standard, &FeatureRecord::neutral());
        assert_eq!(composition.body, "ONLY");
        assert_eq!(composition.layers, vec![LayerKind::ToolPreferences]);
    }

    #[test]
    fn no_layers_no_body() {
        let config = EnhancerConfig::default();
        let composition = Composer::new(&config, &InMemoryTemplates::new())
            .compose(EnrichmentProfile::Standard, &FeatureRecord::neutral());
        assert!(composition.is_empty());
    }

    #[test]
    fn trigger_summary_is_sorted() {
        let config = EnhancerConfig::default();
        let mut features = FeatureRecord::neutral();
        features.ultra_triggers.insert(TriggerCategory::Research);
        features.ultra_triggers.insert(TriggerCategory::ComplexTask);
        let composition = Composer::new(&config, &InMemoryTemplates::new())
            .compose(EnrichmentProfile::Ultra, &features);
        assert_eq!(composition.trigger_summary, vec!["complex_task", "research"]);
    }

    struct ExplodingTemplates;

    impl TemplateSource for ExplodingTemplates {
        fn fetch(&self, _name: &str, _vars: &TemplateVars) -> String {
            panic!("template store exploded")
        }
    }

    #[test]
    fn panicking_layer_yields_empty_body() {
        let config = EnhancerConfig::default();
        let composition = Composer::new(&config, &ExplodingTemplates)
            .compose(EnrichmentProfile::Ultra, &FeatureRecord::neutral());
        assert!(composition.is_empty());
        assert_eq!(composition.profile, EnrichmentProfile::Ultra);
    }

    #[test]
    fn composition_is_deterministic() {
        let config = EnhancerConfig::default();
        let templates = templates();
        let composer = Composer::new(&config, &templates);
        let a = composer.compose(EnrichmentProfile::Ultra, &FeatureRecord::neutral());
        let b = composer.compose(EnrichmentProfile::Ultra, &FeatureRecord::neutral());
        assert_eq!(a, b);
    }
}
