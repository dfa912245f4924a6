//! Configuration loading, validation, and caching for the prompt enhancer.
//!
//! Loads configuration from `~/.claude/prompt-enhancer-config.json` (or the
//! path in `PROMPT_ENHANCER_CONFIG`). The user file is deep-merged over the
//! built-in defaults, so a user only writes the keys they want to change.

pub mod cache;

pub use cache::ConfigCache;

use enhancer_core::features::ComplexityLevel;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "PROMPT_ENHANCER_CONFIG";

/// The root configuration structure.
///
/// Maps directly to `~/.claude/prompt-enhancer-config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancerConfig {
    #[serde(default = "default_version")]
    pub version: String,

    /// Layer toggles and ultra-mode routing
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Tree-of-thought reasoning protocol parameters
    #[serde(default)]
    pub tot_reflection: TotReflectionConfig,

    /// Prompts that skip enhancement entirely
    #[serde(default)]
    pub bypass: BypassConfig,

    #[serde(default)]
    pub research: ResearchConfig,

    /// Clarifying-question policy rendered into the footer
    #[serde(default)]
    pub questions: QuestionsConfig,

    /// Where guidance templates are read from
    #[serde(default)]
    pub templates: TemplatesConfig,

    /// Historical learning backend
    #[serde(default)]
    pub learning: LearningConfig,
}

fn default_version() -> String {
    "2.0.0".into()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Master switch; when false the enrichment body is always empty
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub layers: LayerToggles,

    #[serde(default)]
    pub ultra_mode: UltraModeConfig,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            layers: LayerToggles::default(),
            ultra_mode: UltraModeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerToggles {
    #[serde(default = "default_true")]
    pub design_guidance: bool,

    #[serde(default = "default_true")]
    pub excellence_criteria: bool,

    #[serde(default = "default_true")]
    pub tool_preferences: bool,

    #[serde(default = "default_true")]
    pub workspace_methodology: bool,
}

impl Default for LayerToggles {
    fn default() -> Self {
        Self {
            design_guidance: true,
            excellence_criteria: true,
            tool_preferences: true,
            workspace_methodology: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UltraModeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Complexity level that switches the ultra profile on by itself
    #[serde(default = "default_trigger_complexity")]
    pub trigger_complexity: ComplexityLevel,

    /// Accepted for compatibility; detection uses the built-in trigger tables
    #[serde(default = "default_trigger_keywords")]
    pub trigger_keywords: Vec<String>,
}

fn default_trigger_complexity() -> ComplexityLevel {
    ComplexityLevel::Extreme
}
fn default_trigger_keywords() -> Vec<String> {
    ["orchestrate", "multi-agent", "research", "plan", "design system", "architecture"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for UltraModeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trigger_complexity: default_trigger_complexity(),
            trigger_keywords: default_trigger_keywords(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotReflectionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_min_approaches")]
    pub min_approaches: u32,

    #[serde(default = "default_max_approaches")]
    pub max_approaches: u32,

    /// 1–10; below this the model must list what would raise its confidence
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: u32,

    #[serde(default = "default_true")]
    pub mandatory_critique: bool,
}

fn default_min_approaches() -> u32 {
    2
}
fn default_max_approaches() -> u32 {
    3
}
fn default_confidence_threshold() -> u32 {
    8
}

impl Default for TotReflectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_approaches: default_min_approaches(),
            max_approaches: default_max_approaches(),
            confidence_threshold: default_confidence_threshold(),
            mandatory_critique: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BypassConfig {
    /// A prompt starting with any of these is echoed without its prefix
    #[serde(default = "default_bypass_prefixes")]
    pub prefixes: Vec<String>,

    /// Regular expressions; a match echoes the prompt unchanged
    #[serde(default)]
    pub patterns: Vec<String>,
}

fn default_bypass_prefixes() -> Vec<String> {
    vec!["*".into(), "/".into(), "#".into()]
}

impl Default for BypassConfig {
    fn default() -> Self {
        Self {
            prefixes: default_bypass_prefixes(),
            patterns: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default = "default_true")]
    pub required_phase: bool,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            required_phase: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionsConfig {
    #[serde(default = "default_max_questions")]
    pub max_count: u32,

    /// "specific_options" asks for concrete choices; anything else is open-ended
    #[serde(default = "default_question_style")]
    pub style: String,
}

fn default_max_questions() -> u32 {
    6
}
fn default_question_style() -> String {
    "specific_options".into()
}

impl Default for QuestionsConfig {
    fn default() -> Self {
        Self {
            max_count: default_max_questions(),
            style: default_question_style(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// Defaults to `~/.claude/prompt-enhancer/templates`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Record interactions and read learned patterns from disk
    #[serde(default)]
    pub enabled: bool,

    /// Defaults to `~/.claude/prompt-enhancer-learning`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Append learning insight blocks to the enrichment body
    #[serde(default)]
    pub include_insights: bool,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            enrichment: EnrichmentConfig::default(),
            tot_reflection: TotReflectionConfig::default(),
            bypass: BypassConfig::default(),
            research: ResearchConfig::default(),
            questions: QuestionsConfig::default(),
            templates: TemplatesConfig::default(),
            learning: LearningConfig::default(),
        }
    }
}

impl EnhancerConfig {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from a specific file path.
    ///
    /// A missing file yields the defaults. An empty JSON object does too.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config = Self::from_json_str(&content).map_err(|e| match e {
            ConfigError::ParseError { reason, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;

        tracing::debug!(path = %path.display(), "Loaded user configuration");
        Ok(config)
    }

    /// Load for the hook: never fails.
    ///
    /// Keys that do not deserialize or validate fall back to their defaults
    /// (one `warn` per key) and the rest of the user file is kept. Only an
    /// unreadable file or malformed JSON yields the full defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Self::default();
        }

        let loaded = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
            .and_then(|content| Self::from_json_str_lenient(&content));

        match loaded {
            Ok((config, reset)) => {
                for key in &reset {
                    tracing::warn!(key = %key, path = %path.display(), "Invalid config value, using default");
                }
                config
            }
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to default configuration");
                Self::default()
            }
        }
    }

    /// Like [`EnhancerConfig::from_json_str`], but invalid keys are reset to
    /// their defaults instead of rejecting the document. Returns the config
    /// and the dotted names of the keys that were reset.
    pub fn from_json_str_lenient(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let parse_err = |reason: String| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            reason,
        };

        let overlay: Value = serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?;
        if !overlay.is_object() {
            return Err(parse_err("top-level value must be a JSON object".into()));
        }

        let defaults =
            serde_json::to_value(Self::default()).map_err(|e| parse_err(e.to_string()))?;
        let mut merged = defaults.clone();
        deep_merge(&mut merged, overlay.clone());

        let mut reset = Vec::new();
        if serde_json::from_value::<Self>(merged.clone()).is_err() {
            let mut leaves = Vec::new();
            leaf_paths(&overlay, &mut Vec::new(), &mut leaves);
            for path in leaves {
                // Each key is checked on its own against the defaults.
                let mut candidate = defaults.clone();
                if let Some(value) = value_at(&overlay, &path) {
                    set_at(&mut candidate, &path, value.clone());
                }
                if serde_json::from_value::<Self>(candidate).is_ok() {
                    continue;
                }
                match value_at(&defaults, &path) {
                    Some(default) => set_at(&mut merged, &path, default.clone()),
                    None => remove_at(&mut merged, &path),
                }
                reset.push(path.join("."));
            }
        }

        let mut config: Self =
            serde_json::from_value(merged).map_err(|e| parse_err(e.to_string()))?;
        reset.extend(config.repair());
        Ok((config, reset))
    }

    /// Parse a user JSON document and deep-merge it over the defaults.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let parse_err = |reason: String| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            reason,
        };

        let overlay: Value = serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?;
        if !overlay.is_object() {
            return Err(parse_err("top-level value must be a JSON object".into()));
        }

        let mut merged =
            serde_json::to_value(Self::default()).map_err(|e| parse_err(e.to_string()))?;
        deep_merge(&mut merged, overlay);

        let config: Self = serde_json::from_value(merged).map_err(|e| parse_err(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Config file location: `$PROMPT_ENHANCER_CONFIG` or
    /// `~/.claude/prompt-enhancer-config.json`.
    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::claude_dir().join("prompt-enhancer-config.json"))
    }

    /// The `~/.claude` directory all enhancer data lives under.
    pub fn claude_dir() -> PathBuf {
        dirs_home().join(".claude")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.templates
            .directory
            .clone()
            .unwrap_or_else(|| Self::claude_dir().join("prompt-enhancer").join("templates"))
    }

    pub fn learning_dir(&self) -> PathBuf {
        self.learning
            .directory
            .clone()
            .unwrap_or_else(|| Self::claude_dir().join("prompt-enhancer-learning"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tot = &self.tot_reflection;
        if tot.min_approaches == 0 {
            return Err(ConfigError::ValidationError(
                "tot_reflection.min_approaches must be at least 1".into(),
            ));
        }
        if tot.min_approaches > tot.max_approaches {
            return Err(ConfigError::ValidationError(format!(
                "tot_reflection.min_approaches ({}) exceeds max_approaches ({})",
                tot.min_approaches, tot.max_approaches
            )));
        }
        if !(1..=10).contains(&tot.confidence_threshold) {
            return Err(ConfigError::ValidationError(
                "tot_reflection.confidence_threshold must be between 1 and 10".into(),
            ));
        }
        if self.questions.max_count == 0 {
            return Err(ConfigError::ValidationError(
                "questions.max_count must be at least 1".into(),
            ));
        }
        if self.bypass.prefixes.iter().any(String::is_empty) {
            return Err(ConfigError::ValidationError(
                "bypass.prefixes must not contain empty strings".into(),
            ));
        }
        Ok(())
    }

    /// Reset every value [`validate`](Self::validate) would reject to its
    /// default. Returns the dotted names of the keys that changed.
    fn repair(&mut self) -> Vec<String> {
        let mut reset = Vec::new();
        let defaults = TotReflectionConfig::default();
        let tot = &mut self.tot_reflection;
        if tot.min_approaches == 0 || tot.min_approaches > tot.max_approaches {
            tot.min_approaches = defaults.min_approaches;
            tot.max_approaches = tot.max_approaches.max(defaults.min_approaches);
            reset.push("tot_reflection.min_approaches".to_string());
        }
        if !(1..=10).contains(&tot.confidence_threshold) {
            tot.confidence_threshold = defaults.confidence_threshold;
            reset.push("tot_reflection.confidence_threshold".to_string());
        }
        if self.questions.max_count == 0 {
            self.questions.max_count = default_max_questions();
            reset.push("questions.max_count".to_string());
        }
        if self.bypass.prefixes.iter().any(String::is_empty) {
            self.bypass.prefixes.retain(|p| !p.is_empty());
            reset.push("bypass.prefixes".to_string());
        }
        reset
    }

    /// Pretty JSON of the effective configuration (for `config show` and
    /// the `{{config}}` template variable).
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Recursively merge `overlay` into `base`. Objects merge key by key;
/// every other value in `overlay` replaces the one in `base`.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let nested = value.is_object() && base_map.get(&key).is_some_and(Value::is_object);
                match base_map.get_mut(&key) {
                    Some(existing) if nested => deep_merge(existing, value),
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Paths of every non-object value (and empty object) in `value`.
fn leaf_paths(value: &Value, prefix: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
    match value.as_object() {
        Some(map) if !map.is_empty() => {
            for (key, nested) in map {
                prefix.push(key.clone());
                leaf_paths(nested, prefix, out);
                prefix.pop();
            }
        }
        _ if !prefix.is_empty() => out.push(prefix.clone()),
        _ => {}
    }
}

fn value_at<'a>(value: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(key))
}

/// Set `path` to `new`, creating (or replacing non-object) parents.
fn set_at(value: &mut Value, path: &[String], new: Value) {
    let Some((last, parents)) = path.split_last() else {
        *value = new;
        return;
    };
    let mut current = value;
    for key in parents {
        if !current.is_object() {
            *current = Value::Object(serde_json::Map::new());
        }
        let Value::Object(map) = current else { return };
        current = map
            .entry(key.clone())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
    if !current.is_object() {
        *current = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(last.clone(), new);
    }
}

fn remove_at(value: &mut Value, path: &[String]) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let parent = parents
        .iter()
        .try_fold(value, |current, key| current.get_mut(key));
    if let Some(Value::Object(map)) = parent {
        map.remove(last);
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_config_is_valid() {
        let config = EnhancerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.enrichment.enabled);
        assert_eq!(config.enrichment.ultra_mode.trigger_complexity, ComplexityLevel::Extreme);
        assert_eq!(config.bypass.prefixes, vec!["*", "/", "#"]);
        assert_eq!(config.questions.max_count, 6);
    }

    #[test]
    fn partial_user_config_merges_over_defaults() {
        let config = EnhancerConfig::from_json_str(
            r#"{"enrichment": {"layers": {"tool_preferences": false}}, "tot_reflection": {"max_approaches": 5}}"#,
        )
        .unwrap();
        assert!(!config.enrichment.layers.tool_preferences);
        assert!(config.enrichment.layers.design_guidance);
        assert!(config.enrichment.ultra_mode.enabled);
        assert_eq!(config.tot_reflection.max_approaches, 5);
        assert_eq!(config.tot_reflection.min_approaches, 2);
    }

    #[test]
    fn trigger_complexity_parses_lowercase() {
        let config = EnhancerConfig::from_json_str(
            r#"{"enrichment": {"ultra_mode": {"trigger_complexity": "high"}}}"#,
        )
        .unwrap();
        assert_eq!(config.enrichment.ultra_mode.trigger_complexity, ComplexityLevel::High);
    }

    #[test]
    fn unknown_trigger_complexity_is_a_parse_error() {
        let result = EnhancerConfig::from_json_str(
            r#"{"enrichment": {"ultra_mode": {"trigger_complexity": "galactic"}}}"#,
        );
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn invalid_approach_range_rejected() {
        let result = EnhancerConfig::from_json_str(
            r#"{"tot_reflection": {"min_approaches": 4, "max_approaches": 2}}"#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn non_object_config_rejected() {
        assert!(EnhancerConfig::from_json_str("[1, 2, 3]").is_err());
        assert!(EnhancerConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = EnhancerConfig::load_from(Path::new("/nonexistent/enhancer.json")).unwrap();
        assert_eq!(config, EnhancerConfig::default());
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ definitely not json").unwrap();

        assert!(matches!(
            EnhancerConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
        assert_eq!(EnhancerConfig::load_or_default(&path), EnhancerConfig::default());
    }

    #[test]
    fn invalid_value_keeps_the_rest_of_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"enrichment": {"enabled": false}, "tot_reflection": {"confidence_threshold": 0}}"#,
        )
        .unwrap();

        let config = EnhancerConfig::load_or_default(&path);
        assert!(!config.enrichment.enabled);
        assert_eq!(config.tot_reflection.confidence_threshold, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_key_resets_only_itself() {
        let (config, reset) = EnhancerConfig::from_json_str_lenient(
            r#"{
                "enrichment": {"enabled": false, "ultra_mode": {"trigger_complexity": "EXTREME", "enabled": false}},
                "bypass": {"prefixes": ["!", ""]},
                "questions": {"max_count": "lots", "style": "open_ended"},
                "templates": {"directory": 5}
            }"#,
        )
        .unwrap();

        assert!(!config.enrichment.enabled);
        assert!(!config.enrichment.ultra_mode.enabled);
        assert_eq!(config.enrichment.ultra_mode.trigger_complexity, ComplexityLevel::Extreme);
        assert_eq!(config.bypass.prefixes, vec!["!"]);
        assert_eq!(config.questions.max_count, 6);
        assert_eq!(config.questions.style, "open_ended");
        assert_eq!(config.templates.directory, None);

        let mut reset = reset;
        reset.sort();
        assert_eq!(
            reset,
            vec![
                "bypass.prefixes",
                "enrichment.ultra_mode.trigger_complexity",
                "questions.max_count",
                "templates.directory",
            ]
        );
    }

    #[test]
    fn approach_range_is_repaired() {
        let (config, reset) = EnhancerConfig::from_json_str_lenient(
            r#"{"tot_reflection": {"min_approaches": 5, "mandatory_critique": false}}"#,
        )
        .unwrap();
        assert_eq!(config.tot_reflection.min_approaches, 2);
        assert_eq!(config.tot_reflection.max_approaches, 3);
        assert!(!config.tot_reflection.mandatory_critique);
        assert_eq!(reset, vec!["tot_reflection.min_approaches"]);
    }

    #[test]
    fn valid_file_resets_nothing() {
        let (config, reset) =
            EnhancerConfig::from_json_str_lenient(r#"{"research": {"required_phase": false}}"#).unwrap();
        assert!(reset.is_empty());
        assert!(!config.research.required_phase);
    }

    #[test]
    fn file_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"bypass": {"prefixes": ["!"]}}"#).unwrap();

        let config = EnhancerConfig::load_from(&path).unwrap();
        assert_eq!(config.bypass.prefixes, vec!["!"]);
    }

    #[test]
    fn deep_merge_replaces_non_objects() {
        let mut base = json!({"a": {"b": 1, "c": [1, 2]}, "d": true});
        deep_merge(&mut base, json!({"a": {"c": [3]}, "d": {"nested": 1}}));
        assert_eq!(base, json!({"a": {"b": 1, "c": [3]}, "d": {"nested": 1}}));
    }

    #[test]
    fn json_roundtrip() {
        let config = EnhancerConfig::default();
        let parsed = EnhancerConfig::from_json_str(&config.to_json_pretty()).unwrap();
        assert_eq!(parsed, config);
    }
}
