//! Enrichment layer builders.
//!
//! Four protocol layers are emitted only for the ultra profile; they are
//! fixed text with a few values interpolated from configuration. The four
//! standard layers are template bodies fetched by name.

use enhancer_config::{EnhancerConfig, LayerToggles, TotReflectionConfig};
use enhancer_core::template::{TemplateSource, TemplateVars};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Heavy rule used around layer titles and between layers.
pub const RULE: &str = "═══════════════════════════════════════════════════════════════════";

// ── Layer kinds ───────────────────────────────────────────────────────────

/// Every layer the composer knows about, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    ReasoningProtocol,
    OutputFormat,
    UncertaintyProtocol,
    ToolUseProtocol,
    DesignGuidance,
    ExcellenceCriteria,
    ToolPreferences,
    WorkspaceMethodology,
}

impl LayerKind {
    pub const ULTRA: [LayerKind; 4] = [
        LayerKind::ReasoningProtocol,
        LayerKind::OutputFormat,
        LayerKind::UncertaintyProtocol,
        LayerKind::ToolUseProtocol,
    ];

    pub const STANDARD: [LayerKind; 4] = [
        LayerKind::DesignGuidance,
        LayerKind::ExcellenceCriteria,
        LayerKind::ToolPreferences,
        LayerKind::WorkspaceMethodology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReasoningProtocol => "reasoning_protocol",
            Self::OutputFormat => "output_format",
            Self::UncertaintyProtocol => "uncertainty_protocol",
            Self::ToolUseProtocol => "tool_use_protocol",
            Self::DesignGuidance => "design_guidance",
            Self::ExcellenceCriteria => "excellence_criteria",
            Self::ToolPreferences => "tool_preferences",
            Self::WorkspaceMethodology => "workspace_methodology",
        }
    }

    /// Whether the configuration lets this layer through. Protocol layers
    /// have no toggle of their own.
    pub fn enabled_in(&self, toggles: &LayerToggles) -> bool {
        match self {
            Self::DesignGuidance => toggles.design_guidance,
            Self::ExcellenceCriteria => toggles.excellence_criteria,
            Self::ToolPreferences => toggles.tool_preferences,
            Self::WorkspaceMethodology => toggles.workspace_methodology,
            _ => true,
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One built layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub kind: LayerKind,
    pub content: String,
}

// ── Builders ──────────────────────────────────────────────────────────────

/// Build one layer; `None` when the layer is switched off or came out empty.
pub fn build(kind: LayerKind, config: &EnhancerConfig, templates: &dyn TemplateSource) -> Option<Layer> {
    if !kind.enabled_in(&config.enrichment.layers) {
        return None;
    }
    let content = match kind {
        LayerKind::ReasoningProtocol => reasoning_protocol(&config.tot_reflection)?,
        LayerKind::OutputFormat => output_format(),
        LayerKind::UncertaintyProtocol => uncertainty_protocol(),
        LayerKind::ToolUseProtocol => tool_use_protocol(),
        _ => templates.fetch(kind.as_str(), &template_vars(config)),
    };
    if content.trim().is_empty() {
        return None;
    }
    Some(Layer { kind, content })
}

/// Variables available to standard templates.
pub fn template_vars(config: &EnhancerConfig) -> TemplateVars {
    let mut vars = TemplateVars::new();
    vars.insert("config".into(), config.to_json_pretty());
    vars
}

fn banner(title: &str) -> String {
    format!("{RULE}\n{title}\n{RULE}\n")
}

/// Tree-of-thought reasoning protocol with optional post-output critique.
pub fn reasoning_protocol(tot: &TotReflectionConfig) -> Option<String> {
    if !tot.enabled {
        return None;
    }
    let (min, max, threshold) = (tot.min_approaches, tot.max_approaches, tot.confidence_threshold);

    let mut out = banner("REASONING PROTOCOL (MANDATORY - Tree-of-Thought)");
    let _ = write!(
        out,
        "
Before ANY implementation, you MUST:

1. GENERATE {min}-{max} DISTINCT APPROACHES
   For each approach, evaluate on:
   • Correctness: Will it solve the problem completely?
   • Performance: Time/space complexity, scalability
   • Maintainability: Code clarity, future extensibility
   • Security: Vulnerabilities, input validation
   • Architecture Alignment: Fits existing patterns?

2. COMPARE AND SELECT
   Create a decision matrix. Select the best approach.
   Explicitly justify why others were discarded.

3. CONFIDENCE SCORING
   Rate your confidence in this approach: 1-10
   • If < {threshold}: List what additional information would raise confidence
   • If ≥ {threshold}: Proceed with implementation
"
    );

    if tot.mandatory_critique {
        out.push('\n');
        out.push_str(&banner("MANDATORY POST-OUTPUT REFLECTION"));
        out.push_str(
            "
After producing your solution, you MUST perform this critique:

**Self-Assessment Scorecard:**
- Accuracy (1-10): Does it solve the exact problem stated?
- Completeness (1-10): All edge cases handled? All requirements met?
- Elegance (1-10): Is the code clean, idiomatic, well-structured?
- Test Coverage (1-10): Are all critical paths tested?

**Quality Gate:**
If ANY score < 9:
1. Identify the specific weakness
2. Rewrite that section
3. Explain the improvement made

**Assumption Audit:**
List all assumptions made. For each assumption, state:
- What you assumed
- Why you assumed it
- How the solution would change if assumption is wrong

**Alternative Considerations:**
If time/resources were unlimited, what would you do differently?
What's the \"good enough now\" vs \"perfect future\" tradeoff?
",
        );
    }
    Some(out)
}

/// Structure every ultra-mode answer must follow.
pub fn output_format() -> String {
    banner("OUTPUT FORMAT REQUIREMENTS")
        + "
Your response MUST follow this structure:

1. **Approach Summary** (2-3 sentences)
   Brief overview of the selected approach and why it's optimal

2. **Implementation** (code/detailed solution)
   - Use appropriate code blocks with language tags
   - Include inline comments for complex logic
   - Follow project conventions and style guides

3. **Testing Strategy** (if applicable)
   - Unit tests for core functionality
   - Integration tests for system interactions
   - Edge cases and error scenarios

4. **Deployment Considerations** (if applicable)
   - Configuration requirements
   - Migration steps
   - Rollback procedures

5. **Self-Critique** (mandatory)
   - Scorecard from reflection section above
   - Assumptions and alternatives

**For JSON/Structured Output:**
- Use strict JSON formatting (no trailing commas, proper escaping)
- Validate against schema before outputting
- Include schema definition in code comments

**For Tool Calls:**
- Verify all required parameters are present
- Use explicit type conversions
- Include error handling for tool failures
"
}

pub fn uncertainty_protocol() -> String {
    banner("UNCERTAINTY HANDLING PROTOCOL")
        + "
**Ambiguity Detection:**
If ANY requirement is ambiguous or depends on unstated context:

1. **Explicit Assumption Statement**
   \"I am assuming: [specific assumption]
   Based on: [evidence from prompt/context]
   Risk level: [low/medium/high]\"

2. **Primary Solution (Plan A)**
   Implement based on most likely interpretation

3. **Alternative Solution (Plan B)**
   Describe alternative approach if assumption is wrong
   \"If instead [different assumption], then:
   - Change X to Y
   - Add/remove Z
   - Performance impact: [description]\"

4. **Clarification Request** (when appropriate)
   If ambiguity is high-risk, explicitly state:
   \"Before proceeding, please confirm: [specific question]
   This affects: [critical decision point]\"

**Risk Mitigation:**
For high-uncertainty tasks:
- Implement safeguards (validation, logging, feature flags)
- Design for easy rollback
- Document all decision points and rationale
"
}

/// ReAct loop, parallel tool use and self-correction.
pub fn tool_use_protocol() -> String {
    banner("Orchestrator OPTIMIZATION: ReAct + Parallel Tool Use")
        + "
**Strict ReAct Format for Multi-Step Tasks:**

For any task requiring tools or multiple steps, use this loop:

**Thought:** [Analyze current state, identify what's needed next]
**Action:** [Tool call or implementation step]
**Observation:** [Result of action, what was learned]
**Thought:** [Integrate observation, plan next step]
... repeat until complete ...
**Final Answer:** [Synthesized solution]

**Parallel Tool Use:**
When multiple independent information sources are needed:
- Identify parallelizable queries
- Execute tool calls simultaneously
- Aggregate results before next reasoning step

Example:
**Thought:** Need info from codebase AND documentation
**Action:** [parallel: codebase_search(\"auth\"), doc_search(\"authentication\")]
**Observation:** [results from both searches]

**Self-Correction Protocol:**
After generating code or complex solution:
1. Use code_execution tool to verify (if applicable)
2. Run mental trace/desk check of logic
3. If error detected: Document error, generate correction, re-verify

**Quality Amplification:**
For critical code paths:
- Generate solution
- Review your own code as if you were a senior engineer
- Identify potential issues
- Refine and re-output
"
}
