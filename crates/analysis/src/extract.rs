//! Individual feature extractors.
//!
//! Each extractor is a pure function of its input text and the compiled
//! tables. The analyzer wraps every call in its own fault barrier.

use crate::cache::AnalysisCache;
use crate::patterns::{Clue, PatternTables};
use enhancer_core::features::{
    Complexity, ComplexityCounts, ComplexityLevel, ContextClues, ConversationPatterns, Domain,
    ProjectType, Technology, TriggerCategory, UrgencyLevel,
};
use enhancer_core::message::ConversationTurn;
use std::collections::BTreeSet;

/// Turns longer than this many characters count toward technical depth.
pub const TECHNICAL_DEPTH_CHARS: usize = 200;

/// Language keywords that the declaration patterns can capture.
const KEYWORD_STOPWORDS: &[&str] = &[
    "if", "for", "while", "def", "class", "interface", "function", "func", "return",
];

/// Identifiers that the loose history patterns pick up but are never
/// function names.
const HISTORY_STOPWORDS: &[&str] = &[
    "if", "for", "while", "def", "class", "interface", "function", "func", "implement", "create",
    "write", "add", "get", "set", "new", "old", "use", "used", "need", "needs", "make", "made",
    "take", "took", "first", "second", "third", "next", "previous", "last", "final", "the",
    "this", "that", "a", "an",
];

pub fn technical_keywords(tables: &PatternTables, text: &str) -> BTreeSet<String> {
    tables
        .technical
        .iter()
        .flat_map(|re| re.find_iter(text))
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

pub fn file_references(tables: &PatternTables, text: &str) -> BTreeSet<String> {
    tables
        .file_references
        .iter()
        .flat_map(|re| re.find_iter(text))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Identifiers written in explicit syntax in the prompt itself.
pub fn prompt_function_names(tables: &PatternTables, text: &str) -> BTreeSet<String> {
    let ids = &tables.identifiers;
    [&ids.call, &ids.declaration, &ids.type_declaration, &ids.imperative]
        .into_iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| name.len() > 1 && !is_stopword(KEYWORD_STOPWORDS, name))
        .map(str::to_string)
        .collect()
}

/// Identifiers mentioned in earlier turns. The looser patterns are
/// filtered through a stoplist of common words.
pub fn history_function_names(
    tables: &PatternTables,
    history: &[ConversationTurn],
) -> BTreeSet<String> {
    let ids = &tables.identifiers;
    let patterns = [
        &ids.call,
        &ids.declaration,
        &ids.type_declaration,
        &ids.imperative,
        &ids.named_member,
    ];
    let mut names = BTreeSet::new();
    for turn in history {
        for re in patterns {
            for caps in re.captures_iter(&turn.content) {
                let Some(m) = caps.get(1) else { continue };
                let name = m.as_str();
                if name.len() > 1 && !is_stopword(HISTORY_STOPWORDS, name) {
                    names.insert(name.to_string());
                }
            }
        }
    }
    names
}

fn is_stopword(list: &[&str], name: &str) -> bool {
    list.iter().any(|w| w.eq_ignore_ascii_case(name))
}

/// Highest-scoring project type; ties go to the earlier type, zero scores
/// to `General`.
pub fn project_type(tables: &PatternTables, text: &str) -> ProjectType {
    let mut best = (ProjectType::General, 0usize);
    for (kind, indicators) in &tables.project_types {
        let score = indicators.iter().filter(|re| re.is_match(text)).count();
        if score > best.1 {
            best = (*kind, score);
        }
    }
    best.0
}

pub fn technology_stack(tables: &PatternTables, text: &str) -> BTreeSet<Technology> {
    tables
        .technologies
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(tech, _)| *tech)
        .collect()
}

pub fn urgency(tables: &PatternTables, text: &str) -> UrgencyLevel {
    match tables.urgency.find_iter(text).count() {
        n if n >= 2 => UrgencyLevel::High,
        1 => UrgencyLevel::Medium,
        _ if tables.casual.is_match(text) => UrgencyLevel::Low,
        _ => UrgencyLevel::Normal,
    }
}

pub fn complexity(tables: &PatternTables, text: &str) -> Complexity {
    let mut counts = ComplexityCounts::default();
    for (level, patterns) in &tables.complexity {
        let hits: usize = patterns.iter().map(|re| re.find_iter(text).count()).sum();
        match level {
            ComplexityLevel::Extreme => counts.extreme += hits,
            ComplexityLevel::High => counts.high += hits,
            ComplexityLevel::Medium => counts.medium += hits,
            ComplexityLevel::Low => counts.low += hits,
        }
    }
    Complexity::from_counts(counts)
}

pub fn conversation(history: &[ConversationTurn]) -> ConversationPatterns {
    ConversationPatterns {
        has_history: !history.is_empty(),
        message_count: history.len(),
        technical_depth: history
            .iter()
            .filter(|turn| turn.content.chars().count() > TECHNICAL_DEPTH_CHARS)
            .count(),
    }
}

pub fn context_clues(tables: &PatternTables, cache: &AnalysisCache, text: &str) -> ContextClues {
    let detect = |wanted: Clue| {
        cache.clue(wanted, text, || {
            tables
                .clues
                .iter()
                .any(|(clue, re)| *clue == wanted && re.is_match(text))
        })
    };
    let word_count = cache.word_count(text);
    ContextClues {
        has_examples: detect(Clue::Examples),
        has_constraints: detect(Clue::Constraints),
        has_questions: detect(Clue::Questions),
        has_commands: detect(Clue::Commands),
        word_count,
        ambiguity_score: ContextClues::ambiguity_for(word_count),
    }
}

pub fn domains(tables: &PatternTables, text: &str) -> BTreeSet<Domain> {
    tables
        .domains
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(domain, _)| *domain)
        .collect()
}

pub fn ultra_triggers(tables: &PatternTables, text: &str) -> BTreeSet<TriggerCategory> {
    let mut triggers: BTreeSet<TriggerCategory> = tables
        .triggers
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(category, _)| *category)
        .collect();
    if tables.compound_tasks.iter().any(|re| re.is_match(text)) {
        triggers.insert(TriggerCategory::ComplexTask);
    }
    triggers
}

/// Prompt plus every history turn, space separated.
pub fn combined_text(prompt: &str, history: &[ConversationTurn]) -> String {
    let mut text = String::from(prompt);
    for turn in history {
        text.push(' ');
        text.push_str(&turn.content);
    }
    text
}
