//! Presentation of the final document: header, enrichment body, execution
//! protocol footer. Also the fallback document and prompt escaping.

use crate::composer::Composition;
use crate::layers::RULE;
use enhancer_config::EnhancerConfig;
use enhancer_core::features::FeatureRecord;
use std::fmt::Write;

/// Escaped prompts longer than this many characters are cut.
pub const MAX_EMBEDDED_CHARS: usize = 50_000;
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Technologies listed in the context analysis header.
const MAX_LISTED_TECHNOLOGIES: usize = 3;

// ── Escaping ──────────────────────────────────────────────────────────────

/// Backslash-escape `\`, `"` and `'`, then truncate.
pub fn escape_prompt(prompt: &str) -> String {
    let mut escaped = String::with_capacity(prompt.len());
    for c in prompt.chars() {
        if matches!(c, '\\' | '"' | '\'') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    truncate(escaped)
}

fn truncate(text: String) -> String {
    match text.char_indices().nth(MAX_EMBEDDED_CHARS) {
        Some((cut, _)) => {
            let mut kept = text[..cut].to_string();
            kept.push_str(TRUNCATION_MARKER);
            kept
        }
        None => text,
    }
}

/// Inverse of [`escape_prompt`] for untruncated text.
pub fn unescape_prompt(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

// ── Documents ─────────────────────────────────────────────────────────────

/// Wrap an enrichment body into the full document.
pub fn wrap(
    escaped_prompt: &str,
    features: &FeatureRecord,
    composition: &Composition,
    config: &EnhancerConfig,
) -> String {
    let ultra = composition.profile.is_ultra();
    let mut doc = String::with_capacity(composition.body.len() + escaped_prompt.len() + 2048);

    // ── Header
    let mode = if ultra {
        "[ULTRA MODE: Advanced Reasoning + Reflection Enabled]"
    } else {
        "[STANDARD MODE]"
    };
    let technologies: Vec<&str> = features
        .technology_stack
        .iter()
        .take(MAX_LISTED_TECHNOLOGIES)
        .map(|t| t.as_str())
        .collect();
    let triggers = if ultra && !composition.trigger_summary.is_empty() {
        composition.trigger_summary.join(", ")
    } else {
        "None".to_string()
    };

    let _ = write!(
        doc,
        "{RULE}
PROMPT EVALUATION & STRATEGIC ENRICHMENT
{mode}
{RULE}

**Original Request:**
\"{escaped_prompt}\"

**Context Analysis:**
- Complexity: {complexity}
- Project Type: {project}
- Technology: {technologies}
- Ultra Mode Triggers: {triggers}

{RULE}
STRATEGIC ENRICHMENT
{RULE}

{body}

{RULE}
EXECUTION PROTOCOL
{RULE}

**Primary Directive:**
Execute the user's request with maximum quality, leveraging the enrichment guidance above.
",
        complexity = features.complexity.level,
        project = features.project_type.as_str(),
        technologies = technologies.join(", "),
        body = composition.body,
    );

    // ── Footer
    if config.research.required_phase {
        doc.push_str(
            "
**Research Phase (if needed):**
1. Check conversation history FIRST
2. Use available tools (codebase search, web search, documentation)
3. Gather context before asking questions
",
        );
    }

    let _ = write!(
        doc,
        "
**Clarification Phase (only if critical ambiguity exists):**
After research, if still unclear: {}
",
        clarification_line(config)
    );

    let tot = &config.tot_reflection;
    doc.push_str("\n**Implementation Phase:**\n");
    if ultra {
        let _ = writeln!(
            doc,
            "- Follow ToT protocol: Generate {}-{} approaches, evaluate, select best",
            tot.min_approaches, tot.max_approaches
        );
        doc.push_str("- Use ReAct format for multi-step tasks\n");
        if tot.mandatory_critique {
            doc.push_str("- Perform mandatory self-critique before finalizing\n");
        }
    } else {
        doc.push_str("- Implement the solution\n");
    }

    doc.push_str("\n**Quality Gate:**\n");
    if ultra {
        doc.push_str("- All self-assessment scores must be ≥9\n");
        doc.push_str("- Assumptions explicitly documented\n");
        doc.push_str("- Plan B provided for uncertainties\n");
    } else {
        doc.push_str("- Verify solution meets requirements\n");
    }

    doc.push_str("\nBEGIN EXECUTION NOW.\n");
    doc
}

fn clarification_line(config: &EnhancerConfig) -> String {
    let max = config.questions.max_count;
    let style = config.questions.style.as_str();
    if style == "specific_options" {
        format!("Ask max 1-{max} specific questions with concrete options")
    } else {
        format!("Ask max 1-{max} {} questions", style.replace('_', " "))
    }
}

/// Document emitted when the pipeline itself fails.
pub fn fallback_document(escaped_prompt: &str) -> String {
    format!(
        "# Enhanced Request

**Original Request:**
{escaped_prompt}

## Instructions
Apply best practices and proceed with implementation.

## Context
This is an enhanced prompt that failed to process through the full enhancement pipeline. \
Please continue with the original request using standard best practices."
    )
}
