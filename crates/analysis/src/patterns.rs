//! Vocabulary and pattern tables.
//!
//! The tables are plain declarative data: a category next to the regex
//! fragments that signal it. [`PatternTables::compile`] turns them into an
//! immutable lookup structure once at startup; the analyzer shares it
//! read-only across requests.

use enhancer_core::error::AnalysisError;
use enhancer_core::features::{ComplexityLevel, Domain, ProjectType, Technology, TriggerCategory};
use regex_lite::Regex;

// ═══════════════════════════════════════════════════════════════════════
// Tables
// ═══════════════════════════════════════════════════════════════════════

/// Technical vocabulary. Compound terms allow a space, hyphen or nothing
/// between their parts.
pub const TECHNICAL_KEYWORDS: &[&str] = &[
    r"\b(kubernetes|docker|microservice|serverless|nosql|oauth|jwt|graphql|rest[\s-]?api)\b",
    r"\b(machine[\s-]?learning|artificial[\s-]?intelligence|neural[\s-]?network|deep[\s-]?learning)\b",
    r"\b(blockchain|smart[\s-]?contract|distributed[\s-]?ledger|cryptocurrency)\b",
    r"\b(devops|cicd|continuous[\s-]?integration|continuous[\s-]?deployment|agile)\b",
];

/// Path-like tokens, grouped by extension family (code, config, docs/data).
pub const FILE_REFERENCES: &[&str] = &[
    r"\b[\w./-]+\.(?:py|js|jsx|ts|tsx|java|cpp|c|h|go|rs|rb|php|swift|kt|scala|sh|bat|ps1)\b",
    r"\b[\w./-]+\.(?:json|yaml|yml|xml|toml|ini|conf|config)\b",
    r"\b[\w./-]+\.(?:md|txt|csv|sql|html|css|scss|less)\b",
];

/// `name()`
pub const CALL_SYNTAX: &str = r"\b([a-zA-Z_][a-zA-Z0-9_]*)\(\)";
/// `def name`, `function name`, `func name`
pub const DECLARATION_SYNTAX: &str = r"\b(?i:def|function|func)\s+([a-zA-Z_][a-zA-Z0-9_]*)";
/// `class Name`, `interface Name` (type names start upper-case)
pub const TYPE_DECLARATION: &str = r"\b(?i:class|interface)\s+([A-Z][a-zA-Z0-9_]*)";
/// `implement a function name()` and friends
pub const IMPERATIVE_PHRASE: &str =
    r"\b(?i:implement|create|write|add)\s+(?:(?i:a)\s+)?(?:(?i:function)\s+)?([a-zA-Z_][a-zA-Z0-9_]*)\(\)";
/// `name method`, `name function` (history only, noisy)
pub const NAMED_MEMBER_PHRASE: &str = r"\b([a-zA-Z_][a-zA-Z0-9_]*)\s+(?i:method|function)";

pub const URGENCY: &str = r"(?i)\b(urgent|asap|immediately|critical|emergency|priority)\b";
pub const CASUAL_HEDGES: &str = r"(?i)\b(maybe|perhaps|might|could|sometime|eventually)\b";

/// Context clue detectors. These are deliberately unanchored substrings.
pub const CLUES: &[(Clue, &str)] = &[
    (Clue::Examples, r"(?i)(example|e\.g\.|such as)"),
    (Clue::Constraints, r"(?i)(constraint|requirement|must)"),
    (Clue::Questions, r"\?"),
    (Clue::Commands, r"(?i)(add|create|fix|implement)"),
];

/// Each indicator that appears adds one to its project type's score.
pub const PROJECT_TYPES: &[(ProjectType, &[&str])] = &[
    (ProjectType::WebApp, &["web", "frontend", "backend", "api", "react", "vue"]),
    (ProjectType::MobileApp, &["mobile", "ios", "android", "flutter"]),
    (ProjectType::CliTool, &["cli", r"command[\s-]line", "terminal"]),
    (ProjectType::Library, &["library", "package", "module", "sdk"]),
    (ProjectType::DataScience, &["data", "ml", "analysis", "pandas"]),
];

pub const TECHNOLOGIES: &[(Technology, &[&str])] = &[
    (Technology::Python, &["python", "django", "flask", "fastapi"]),
    (Technology::JavaScript, &["javascript", r"node(?:\.?js)?", "react", "vue"]),
    (Technology::TypeScript, &["typescript", "ts", "tsx"]),
    (Technology::Docker, &["docker", "containers?"]),
    (Technology::Kubernetes, &["kubernetes", "k8s"]),
];

pub const DOMAINS: &[(Domain, &[&str])] = &[
    (Domain::Medical, &["medical", "healthcare", "clinical", "patient", "diagnosis"]),
    (Domain::Finance, &["finance", "financial", "banking", "payment", "transaction"]),
    (Domain::Education, &["education", "learning", "student", "course", "curriculum"]),
    (Domain::Ecommerce, &["ecommerce", r"shopping.*cart", "payment", "checkout", "inventory"]),
    (Domain::Gaming, &["game", "gaming", "player", "score", "level"]),
];

/// Weighted complexity tiers; every match counts.
pub const COMPLEXITY_TIERS: &[(ComplexityLevel, &[&str])] = &[
    (
        ComplexityLevel::Extreme,
        &[
            r"\b(architecture|system design|distributed|microservices|orchestrate|multi-agent)\b",
            r"\b(complex workflow|advanced|sophisticated|intricate)\b",
        ],
    ),
    (
        ComplexityLevel::High,
        &[
            r"\b(integration|refactor|optimize|performance|scalability)\b",
            r"\b(multiple|several|various|complex)\b",
        ],
    ),
    (ComplexityLevel::Medium, &[r"\b(add|create|implement|build|modify)\b"]),
    (ComplexityLevel::Low, &[r"\b(fix|debug|simple|basic|quick)\b"]),
];

/// Keyword clusters for the ultra-mode trigger categories. Keywords only
/// need to start at a word boundary, so "orchestrate" also covers
/// "orchestrated".
pub const TRIGGER_CATEGORIES: &[(TriggerCategory, &[&str])] = &[
    (
        TriggerCategory::Orchestration,
        &["orchestrate", "multi-agent", "coordinate", "workflow", "pipeline"],
    ),
    (
        TriggerCategory::Research,
        &["research", "investigate", "analyze deeply", "comprehensive study"],
    ),
    (
        TriggerCategory::Planning,
        &["plan", "design system", "architecture", "strategic", "roadmap"],
    ),
    (
        TriggerCategory::ComplexReasoning,
        &["evaluate alternatives", "tradeoffs", "decision matrix", "compare approaches"],
    ),
    (
        TriggerCategory::HighStakes,
        &["production", "critical", "mission-critical", "enterprise-grade"],
    ),
];

/// Compound high-signal patterns that set the synthetic `complex_task` trigger.
pub const COMPOUND_TASKS: &[&str] = &[
    r"(?i)\b(?:orchestrat|design.*architect|coordinate.*multi|comprehens.*system|microservice.*pattern)\w*",
    r"(?i)\b(?:enterprise.*scale|production.*grade|distributed.*system|cloud.*native|kubernetes)\w*",
    r"(?i)\b(?:complex.*workflow|advanced.*pattern|sophisticated.*solution|intricate.*design)\w*",
];

/// Context clue kinds; also the key space of the analysis cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clue {
    Examples,
    Constraints,
    Questions,
    Commands,
}

// ═══════════════════════════════════════════════════════════════════════
// Compiled form
// ═══════════════════════════════════════════════════════════════════════

/// Identifier recognition shared by the prompt and history extractors.
#[derive(Debug)]
pub struct IdentifierPatterns {
    pub call: Regex,
    pub declaration: Regex,
    pub type_declaration: Regex,
    pub imperative: Regex,
    pub named_member: Regex,
}

/// All tables, compiled. Immutable once built.
#[derive(Debug)]
pub struct PatternTables {
    pub technical: Vec<Regex>,
    pub file_references: Vec<Regex>,
    pub identifiers: IdentifierPatterns,
    pub urgency: Regex,
    pub casual: Regex,
    pub clues: Vec<(Clue, Regex)>,
    pub project_types: Vec<(ProjectType, Vec<Regex>)>,
    pub technologies: Vec<(Technology, Regex)>,
    pub domains: Vec<(Domain, Regex)>,
    pub complexity: Vec<(ComplexityLevel, Vec<Regex>)>,
    pub triggers: Vec<(TriggerCategory, Regex)>,
    pub compound_tasks: Vec<Regex>,
}

impl PatternTables {
    pub fn compile() -> Result<Self, AnalysisError> {
        Ok(Self {
            technical: compile_all("technical_keywords", TECHNICAL_KEYWORDS, case_insensitive)?,
            file_references: compile_all("file_references", FILE_REFERENCES, case_insensitive)?,
            identifiers: IdentifierPatterns {
                call: compile("call_syntax", CALL_SYNTAX)?,
                declaration: compile("declaration_syntax", DECLARATION_SYNTAX)?,
                type_declaration: compile("type_declaration", TYPE_DECLARATION)?,
                imperative: compile("imperative_phrase", IMPERATIVE_PHRASE)?,
                named_member: compile("named_member_phrase", NAMED_MEMBER_PHRASE)?,
            },
            urgency: compile("urgency", URGENCY)?,
            casual: compile("casual", CASUAL_HEDGES)?,
            clues: CLUES
                .iter()
                .map(|(clue, pattern)| Ok((*clue, compile("clue", pattern)?)))
                .collect::<Result<_, AnalysisError>>()?,
            project_types: PROJECT_TYPES
                .iter()
                .map(|(kind, words)| {
                    let indicators = words
                        .iter()
                        .map(|word| compile(kind.as_str(), &whole_word(word)))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok((*kind, indicators))
                })
                .collect::<Result<_, AnalysisError>>()?,
            technologies: TECHNOLOGIES
                .iter()
                .map(|(tech, words)| Ok((*tech, compile(tech.as_str(), &any_whole_word(words))?)))
                .collect::<Result<_, AnalysisError>>()?,
            domains: DOMAINS
                .iter()
                .map(|(domain, words)| {
                    Ok((*domain, compile(domain.as_str(), &any_whole_word(words))?))
                })
                .collect::<Result<_, AnalysisError>>()?,
            complexity: COMPLEXITY_TIERS
                .iter()
                .map(|(level, patterns)| {
                    Ok((*level, compile_all(level.as_str(), patterns, case_insensitive)?))
                })
                .collect::<Result<_, AnalysisError>>()?,
            triggers: TRIGGER_CATEGORIES
                .iter()
                .map(|(category, words)| {
                    Ok((*category, compile(category.as_str(), &any_word_prefix(words))?))
                })
                .collect::<Result<_, AnalysisError>>()?,
            compound_tasks: COMPOUND_TASKS
                .iter()
                .map(|pattern| compile("compound_task", pattern))
                .collect::<Result<_, _>>()?,
        })
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex, AnalysisError> {
    Regex::new(pattern).map_err(|e| AnalysisError::PatternCompile {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn compile_all(
    name: &str,
    patterns: &[&str],
    wrap: fn(&str) -> String,
) -> Result<Vec<Regex>, AnalysisError> {
    patterns.iter().map(|p| compile(name, &wrap(p))).collect()
}

fn case_insensitive(pattern: &str) -> String {
    format!("(?i){pattern}")
}

fn whole_word(word: &str) -> String {
    format!(r"(?i)\b(?:{word})\b")
}

fn any_whole_word(words: &[&str]) -> String {
    format!(r"(?i)\b(?:{})\b", words.join("|"))
}

fn any_word_prefix(words: &[&str]) -> String {
    format!(r"(?i)\b(?:{})", words.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_tables_compile() {
        let tables = PatternTables::compile().unwrap();
        assert_eq!(tables.technical.len(), TECHNICAL_KEYWORDS.len());
        assert_eq!(tables.project_types.len(), 5);
        assert_eq!(tables.triggers.len(), 5);
        assert_eq!(tables.complexity.len(), 4);
    }

    #[test]
    fn trigger_keywords_match_at_word_start_only() {
        let tables = PatternTables::compile().unwrap();
        let planning = &tables
            .triggers
            .iter()
            .find(|(c, _)| *c == TriggerCategory::Planning)
            .unwrap()
            .1;
        assert!(planning.is_match("Let's plan the rollout"));
        assert!(planning.is_match("planning session"));
        assert!(!planning.is_match("explain this"));
    }

    #[test]
    fn compound_patterns_accept_word_stems() {
        let tables = PatternTables::compile().unwrap();
        let hit = |text: &str| tables.compound_tasks.iter().any(|re| re.is_match(text));
        assert!(hit("orchestrate the agents"));
        assert!(hit("a cloud-native deployment"));
        assert!(hit("design the service architecture"));
        assert!(!hit("rename a variable"));
    }
}
