//! Template stores.
//!
//! [`FileTemplateStore`] reads `<dir>/<name>.txt` and falls back to the
//! bodies compiled into the binary for the four standard layers.
//! [`InMemoryTemplates`] is for tests and embedding.

use enhancer_core::error::TemplateError;
use enhancer_core::template::{TemplateSource, TemplateVars, is_valid_template_name, render};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default bodies for the standard layers.
pub const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("design_guidance", include_str!("../templates/design_guidance.txt")),
    ("excellence_criteria", include_str!("../templates/excellence_criteria.txt")),
    ("tool_preferences", include_str!("../templates/tool_preferences.txt")),
    ("workspace_methodology", include_str!("../templates/workspace_methodology.txt")),
];

pub fn builtin(name: &str) -> Option<&'static str> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, body)| *body)
}

// ── File store ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FileTemplateStore {
    dir: PathBuf,
    use_builtin: bool,
}

impl FileTemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            use_builtin: true,
        }
    }

    /// Only serve what is on disk.
    pub fn without_builtin(mut self) -> Self {
        self.use_builtin = false;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.txt"))
    }

    /// Raw template body, before rendering.
    pub fn load(&self, name: &str) -> Result<String, TemplateError> {
        if !is_valid_template_name(name) {
            return Err(TemplateError::InvalidName(name.to_string()));
        }
        let path = self.path_for(name);
        match std::fs::read_to_string(&path) {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                match builtin(name).filter(|_| self.use_builtin) {
                    Some(body) => {
                        debug!(template = name, "Using built-in template");
                        Ok(body.to_string())
                    }
                    None => Err(TemplateError::NotFound {
                        name: name.to_string(),
                        path: path.display().to_string(),
                    }),
                }
            }
            Err(e) => Err(TemplateError::ReadFailed {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

impl TemplateSource for FileTemplateStore {
    fn fetch(&self, name: &str, vars: &TemplateVars) -> String {
        match self.load(name) {
            Ok(body) => render(&body, vars),
            Err(e) => {
                warn!(error = %e, "Template unavailable");
                String::new()
            }
        }
    }
}

// ── In-memory store ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplates {
    bodies: BTreeMap<String, String>,
}

impl InMemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with the built-in bodies.
    pub fn builtin() -> Self {
        BUILTIN_TEMPLATES
            .iter()
            .fold(Self::new(), |store, (name, body)| store.with(*name, *body))
    }

    pub fn with(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(name.into(), body.into());
        self
    }
}

impl TemplateSource for InMemoryTemplates {
    fn fetch(&self, name: &str, vars: &TemplateVars) -> String {
        if !is_valid_template_name(name) {
            return String::new();
        }
        self.bodies
            .get(name)
            .map(|body| render(body, vars))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> TemplateVars {
        let mut vars = TemplateVars::new();
        vars.insert("config".into(), "{}".into());
        vars
    }

    #[test]
    fn disk_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("design_guidance.txt"), "custom {{config}}").unwrap();
        let store = FileTemplateStore::new(dir.path());
        assert_eq!(store.fetch("design_guidance", &vars()), "custom {}");
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTemplateStore::new(dir.path());
        assert!(store.fetch("excellence_criteria", &vars()).starts_with("EXCELLENCE CRITERIA"));
    }

    #[test]
    fn builtin_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTemplateStore::new(dir.path()).without_builtin();
        assert_eq!(store.fetch("excellence_criteria", &vars()), "");
        assert!(matches!(
            store.load("excellence_criteria"),
            Err(TemplateError::NotFound { .. })
        ));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTemplateStore::new(dir.path());
        assert!(matches!(
            store.load("../secrets"),
            Err(TemplateError::InvalidName(_))
        ));
        assert_eq!(store.fetch("../secrets", &vars()), "");
        assert_eq!(InMemoryTemplates::builtin().fetch("a/b", &vars()), "");
    }

    #[test]
    fn builtin_bodies_do_not_embed_the_config() {
        let builtin = InMemoryTemplates::builtin();
        for (name, body) in BUILTIN_TEMPLATES {
            assert!(!body.contains("{{config}}"), "{name}");
            assert!(!builtin.fetch(name, &vars()).is_empty(), "{name}");
        }
        let body = builtin.fetch("workspace_methodology", &vars());
        assert!(body.starts_with("WORKSPACE METHODOLOGY"));
        assert!(!body.contains("configuration"));
    }

    #[test]
    fn unknown_names_are_empty() {
        assert_eq!(InMemoryTemplates::new().fetch("design_guidance", &vars()), "");
    }
}
