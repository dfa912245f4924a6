//! Enrichment mode selection.
//!
//! Rules, first match wins:
//! 1. ultra mode disabled: standard
//! 2. complexity level equals the configured trigger level: ultra
//! 3. two or more distinct trigger categories (including `complex_task`): ultra
//! 4. otherwise: standard

use enhancer_config::EnhancerConfig;
use enhancer_core::features::FeatureRecord;
use enhancer_core::profile::{ModeDecision, TriggerReason};
use tracing::debug;

/// Distinct trigger categories needed to switch to ultra on their own.
pub const MIN_TRIGGER_CATEGORIES: usize = 2;

pub fn select_mode(features: &FeatureRecord, config: &EnhancerConfig) -> ModeDecision {
    let ultra = &config.enrichment.ultra_mode;

    let decision = if !ultra.enabled {
        ModeDecision::standard(TriggerReason::UltraDisabled)
    } else if features.complexity.level == ultra.trigger_complexity {
        ModeDecision::ultra(TriggerReason::ComplexityMatched {
            level: features.complexity.level,
        })
    } else if features.ultra_triggers.len() >= MIN_TRIGGER_CATEGORIES {
        ModeDecision::ultra(TriggerReason::MultipleTriggers {
            categories: features.ultra_triggers.iter().copied().collect(),
        })
    } else {
        ModeDecision::standard(TriggerReason::BelowThreshold)
    };

    debug!(profile = %decision.profile, reason = ?decision.reasons, "Mode selected");
    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use enhancer_core::features::{Complexity, ComplexityCounts, ComplexityLevel, TriggerCategory};
    use enhancer_core::profile::EnrichmentProfile;

    fn features(level: ComplexityLevel, triggers: &[TriggerCategory]) -> FeatureRecord {
        let counts = match level {
            ComplexityLevel::Extreme => ComplexityCounts { extreme: 1, ..Default::default() },
            ComplexityLevel::High => ComplexityCounts { high: 1, ..Default::default() },
            ComplexityLevel::Medium => ComplexityCounts { medium: 1, ..Default::default() },
            ComplexityLevel::Low => ComplexityCounts::default(),
        };
        FeatureRecord {
            complexity: Complexity::from_counts(counts),
            ultra_triggers: triggers.iter().copied().collect(),
            ..FeatureRecord::neutral()
        }
    }

    #[test]
    fn disabled_always_standard() {
        let mut config = EnhancerConfig::default();
        config.enrichment.ultra_mode.enabled = false;
        let decision = select_mode(&features(ComplexityLevel::Extreme, &[]), &config);
        assert_eq!(decision.profile, EnrichmentProfile::Standard);
        assert_eq!(decision.reasons, vec![TriggerReason::UltraDisabled]);
    }

    #[test]
    fn trigger_complexity_selects_ultra() {
        let config = EnhancerConfig::default();
        let decision = select_mode(&features(ComplexityLevel::Extreme, &[]), &config);
        assert_eq!(decision.profile, EnrichmentProfile::Ultra);
        assert_eq!(
            decision.reasons,
            vec![TriggerReason::ComplexityMatched { level: ComplexityLevel::Extreme }]
        );
    }

    #[test]
    fn configured_trigger_level_is_respected() {
        let mut config = EnhancerConfig::default();
        config.enrichment.ultra_mode.trigger_complexity = ComplexityLevel::High;
        assert!(select_mode(&features(ComplexityLevel::High, &[]), &config).profile.is_ultra());
        assert!(!select_mode(&features(ComplexityLevel::Extreme, &[]), &config).profile.is_ultra());
    }

    #[test]
    fn two_triggers_select_ultra() {
        let config = EnhancerConfig::default();
        let decision = select_mode(
            &features(
                ComplexityLevel::Low,
                &[TriggerCategory::Research, TriggerCategory::HighStakes],
            ),
            &config,
        );
        assert!(decision.profile.is_ultra());
        assert_eq!(
            decision.reasons,
            vec![TriggerReason::MultipleTriggers {
                categories: vec![TriggerCategory::HighStakes, TriggerCategory::Research],
            }]
        );
    }

    #[test]
    fn complex_task_counts_as_a_category() {
        let config = EnhancerConfig::default();
        let decision = select_mode(
            &features(
                ComplexityLevel::Medium,
                &[TriggerCategory::ComplexTask, TriggerCategory::Planning],
            ),
            &config,
        );
        assert!(decision.profile.is_ultra());
    }

    #[test]
    fn single_trigger_stays_standard() {
        let config = EnhancerConfig::default();
        let decision =
            select_mode(&features(ComplexityLevel::High, &[TriggerCategory::Research]), &config);
        assert_eq!(decision.profile, EnrichmentProfile::Standard);
        assert_eq!(decision.reasons, vec![TriggerReason::BelowThreshold]);
    }
}
