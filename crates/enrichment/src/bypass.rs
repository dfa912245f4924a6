//! Bypass rules: prompts that skip enrichment entirely.

use enhancer_config::BypassConfig;
use regex_lite::Regex;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct BypassRules {
    prefixes: Vec<String>,
    patterns: Vec<Regex>,
}

impl BypassRules {
    /// Compile the configured rules. Invalid patterns are skipped.
    pub fn from_config(config: &BypassConfig) -> Self {
        let patterns = config
            .patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "Skipping invalid bypass pattern");
                    None
                }
            })
            .collect();
        Self {
            prefixes: config.prefixes.iter().filter(|p| !p.is_empty()).cloned().collect(),
            patterns,
        }
    }

    /// The text to emit instead of an enriched document, if the prompt is
    /// bypassed. A matching prefix is stripped; a matching pattern echoes
    /// the prompt. Either way the result is trimmed.
    pub fn check(&self, prompt: &str) -> Option<String> {
        if let Some(rest) = self.prefixes.iter().find_map(|p| prompt.strip_prefix(p.as_str())) {
            return Some(rest.trim().to_string());
        }
        if self.patterns.iter().any(|re| re.is_match(prompt)) {
            return Some(prompt.trim().to_string());
        }
        None
    }
}
