//! Template source trait and `{{variable}}` rendering.

use std::collections::BTreeMap;

/// Variables available to a template, keyed by placeholder name.
pub type TemplateVars = BTreeMap<String, String>;

/// Anything that can hand out named guidance templates.
///
/// Implementations must degrade to an empty string for unknown or invalid
/// names; callers treat an empty body as "layer not produced".
pub trait TemplateSource: Send + Sync {
    fn fetch(&self, name: &str, vars: &TemplateVars) -> String;
}

/// Template names are alphanumeric once `_` and `.` are removed.
pub fn is_valid_template_name(name: &str) -> bool {
    let stripped: String = name.chars().filter(|c| *c != '_' && *c != '.').collect();
    !stripped.is_empty() && stripped.chars().all(char::is_alphanumeric)
}

/// Replace every `{{key}}` with its value. Unknown placeholders are kept.
pub fn render(template: &str, vars: &TemplateVars) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{{{key}}}}}"), value)
    })
}
