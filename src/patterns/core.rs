//! General-purpose patterns shared by most intents

use super::{
    default_applicable, Impact, Pattern, PatternContext, PatternDescriptor, PatternResult,
    PatternScope, ALL_INTENTS,
};
use crate::intent::Intent;
use crate::quality::Dimension;
use crate::utils::text::{self, ListStyle, Section};
use crate::utils::Result;

pub(super) fn patterns() -> Vec<Box<dyn Pattern>> {
    vec![
        Box::new(ObjectiveClarifier),
        Box::new(AmbiguityDetector),
        Box::new(ScopeDefiner),
        Box::new(TechnicalContextEnricher),
        Box::new(ErrorToleranceEnhancer),
        Box::new(SuccessCriteriaEnforcer),
        Box::new(StepDecomposer),
        Box::new(OutputFormatEnforcer),
    ]
}

// ==================== Objective Clarifier ====================

/// Adds an explicit objective when the prompt never states its goal
pub struct ObjectiveClarifier;

static OBJECTIVE_CLARIFIER: PatternDescriptor = PatternDescriptor {
    id: "objective-clarifier",
    name: "Objective Clarifier",
    description: "States the primary goal and intended outcome explicitly",
    intents: &[
        Intent::CodeGeneration,
        Intent::Planning,
        Intent::Refinement,
        Intent::Debugging,
        Intent::Documentation,
        Intent::Testing,
        Intent::Migration,
        Intent::SecurityReview,
    ],
    scope: PatternScope::Both,
    priority: 10,
};

const GOAL_MARKERS: &[&str] = &["goal is", "objective", "so that", "in order to", "the purpose", "my goal"];

impl Pattern for ObjectiveClarifier {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &OBJECTIVE_CLARIFIER
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        let lower = current.to_lowercase();
        if text::has_heading_about(current, &["objective", "goal"]) || text::contains_any(&lower, GOAL_MARKERS) {
            return Ok(PatternResult::unchanged(current, Dimension::Clarity, "Objective already stated"));
        }

        let goal = text::sentences(ctx.original_prompt)
            .first()
            .map(|s| format!("Primary goal: {}", s.trim_end_matches(|c| matches!(c, '.' | '!' | '?'))))
            .unwrap_or_else(|| "Primary goal: state what should be achieved in one sentence".to_string());

        let section = Section::new("Objective", ListStyle::Bullet)
            .item(goal)
            .item("Intended outcome: describe what should exist or behave differently when this is done")
            .item("Motivation: who benefits and why it matters now");

        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Clarity,
            "Made the primary objective and intended outcome explicit",
            Impact::High,
        ))
    }
}

// ==================== Ambiguity Detector ====================

/// Flags vague wording and asks for a concrete replacement
pub struct AmbiguityDetector;

static AMBIGUITY_DETECTOR: PatternDescriptor = PatternDescriptor {
    id: "ambiguity-detector",
    name: "Ambiguity Detector",
    description: "Flags vague terms and asks for measurable replacements",
    intents: ALL_INTENTS,
    scope: PatternScope::Both,
    priority: 9,
};

/// Vague term and the clarification it calls for
const AMBIGUOUS_TERMS: &[(&str, &str)] = &[
    ("something", "name the concrete thing that is meant"),
    ("stuff", "list the actual items"),
    ("things", "list the actual items"),
    ("etc", "spell out the remaining items"),
    ("some", "say how many or exactly which ones"),
    ("better", "define what improves and by how much"),
    ("fast", "give a target latency or time budget"),
    ("quickly", "give a target latency or time budget"),
    ("nice", "describe the expected look or behavior"),
    ("simple", "say which complexity to avoid"),
    ("properly", "describe the exact expected behavior"),
    ("modern", "name the framework, version or style"),
    ("user-friendly", "describe the interactions that must be easy"),
    ("scalable", "give expected load and growth figures"),
    ("robust", "name the failure modes to handle"),
    ("clean", "name the conventions to follow"),
];

impl Pattern for AmbiguityDetector {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &AMBIGUITY_DETECTOR
    }

    fn apply(&self, current: &str, _ctx: &PatternContext<'_>) -> Result<PatternResult> {
        if text::has_heading_about(current, &["ambiguous terms"]) {
            return Ok(PatternResult::unchanged(current, Dimension::Clarity, "Ambiguity already addressed"));
        }

        let lower = current.to_lowercase();
        let found: Vec<String> = AMBIGUOUS_TERMS
            .iter()
            .filter(|(term, _)| text::contains_word(&lower, term))
            .map(|(term, hint)| format!("\"{}\": {}", term, hint))
            .collect();
        if found.is_empty() {
            return Ok(PatternResult::unchanged(current, Dimension::Clarity, "No vague terms found"));
        }

        let impact = if found.len() >= 3 { Impact::High } else { Impact::Medium };
        let count = found.len();
        let mut section = Section::new("Clarify Ambiguous Terms", ListStyle::Bullet).items(found);
        for filler in [
            "Replace relative words with measurable targets",
            "Name the exact files, components or data involved",
        ] {
            if section.len() < text::MIN_SECTION_ITEMS {
                section = section.item(filler);
            }
        }

        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Clarity,
            format!("Flagged {} vague term(s) for clarification", count),
            impact,
        ))
    }
}

// ==================== Scope Definer ====================

/// Draws scope boundaries around open-ended requests
pub struct ScopeDefiner;

static SCOPE_DEFINER: PatternDescriptor = PatternDescriptor {
    id: "scope-definer",
    name: "Scope Definer",
    description: "Sets in-scope and out-of-scope boundaries for open-ended requests",
    intents: &[
        Intent::CodeGeneration,
        Intent::Planning,
        Intent::Refinement,
        Intent::PrdGeneration,
        Intent::Migration,
    ],
    scope: PatternScope::Both,
    priority: 9,
};

const SCOPE_MARKERS: &[&str] = &["in scope", "out of scope", "scope:", "non-goals", "not in scope"];

impl Pattern for ScopeDefiner {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &SCOPE_DEFINER
    }

    fn is_applicable(&self, ctx: &PatternContext<'_>) -> bool {
        default_applicable(self.descriptor(), ctx) && ctx.intent.characteristics.is_open_ended
    }

    fn apply(&self, current: &str, _ctx: &PatternContext<'_>) -> Result<PatternResult> {
        let lower = current.to_lowercase();
        if text::has_heading_about(current, &["scope"]) || text::contains_any(&lower, SCOPE_MARKERS) {
            return Ok(PatternResult::unchanged(current, Dimension::Completeness, "Scope already defined"));
        }

        let section = Section::new("Scope", ListStyle::Bullet)
            .item("In scope: the minimum needed to deliver the stated request")
            .item("Out of scope: unrelated refactors, new dependencies and speculative features unless requested")
            .item("Boundaries: list the files, services or screens that may change")
            .item("Ask before expanding beyond these boundaries");

        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Completeness,
            "Defined scope boundaries for an open-ended request",
            Impact::Medium,
        ))
    }
}

// ==================== Technical Context Enricher ====================

/// Asks for the technical environment when the prompt names none
pub struct TechnicalContextEnricher;

static TECHNICAL_CONTEXT_ENRICHER: PatternDescriptor = PatternDescriptor {
    id: "technical-context-enricher",
    name: "Technical Context Enricher",
    description: "Requests stack, versions and conventions when they are missing",
    intents: &[
        Intent::CodeGeneration,
        Intent::Refinement,
        Intent::Debugging,
        Intent::Migration,
        Intent::Testing,
    ],
    scope: PatternScope::Both,
    priority: 8,
};

impl Pattern for TechnicalContextEnricher {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &TECHNICAL_CONTEXT_ENRICHER
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        let lower = current.to_lowercase();
        if text::has_heading_about(current, &["technical context", "tech stack", "environment"])
            || crate::intent::detector::technical_term_count(&lower) >= 2
        {
            return Ok(PatternResult::unchanged(current, Dimension::Specificity, "Technical context present"));
        }

        let mut section = Section::new("Technical Context", ListStyle::Bullet)
            .item("Language, framework and versions in use")
            .item("Relevant files, modules or components")
            .item("Conventions to follow (naming, error handling, formatting)")
            .item("Runtime environment (browser, server, CLI, mobile)");
        if ctx.intent.characteristics.has_code_context {
            section = section.item("Treat the code references above as the starting point");
        }
        section = match ctx.intent.primary_intent {
            Intent::Debugging => section.item("Versions where the problem does and does not occur"),
            Intent::Migration => section.item("Source and target versions"),
            Intent::Testing => section.item("Test framework and runner"),
            _ => section,
        };

        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Specificity,
            "Requested missing technical context",
            Impact::Medium,
        ))
    }
}

// ==================== Error Tolerance Enhancer ====================

/// Adds error-handling expectations to build requests
pub struct ErrorToleranceEnhancer;

static ERROR_TOLERANCE_ENHANCER: PatternDescriptor = PatternDescriptor {
    id: "error-tolerance-enhancer",
    name: "Error Tolerance Enhancer",
    description: "Adds error-handling considerations the prompt does not mention",
    intents: &[Intent::CodeGeneration, Intent::Refinement, Intent::Migration],
    scope: PatternScope::Both,
    priority: 7,
};

const ERROR_MARKERS: &[&str] = &[
    "error handling", "handle errors", "handle failures", "exceptions", "fallback", "retry",
    "retries", "error states", "error messages",
];

impl Pattern for ErrorToleranceEnhancer {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &ERROR_TOLERANCE_ENHANCER
    }

    fn apply(&self, current: &str, _ctx: &PatternContext<'_>) -> Result<PatternResult> {
        let lower = current.to_lowercase();
        if text::has_heading_about(current, &["error handling"]) || text::contains_any(&lower, ERROR_MARKERS) {
            return Ok(PatternResult::unchanged(current, Dimension::Completeness, "Error handling already discussed"));
        }

        let mut section = Section::new("Error Handling", ListStyle::Bullet)
            .item("Validate inputs and reject invalid data with a clear message")
            .item("Handle failures of external calls (network, disk, services)")
            .item("Decide what the user sees when an operation fails")
            .item("Log failures with enough context to diagnose them");
        if text::contains_any(&lower, &["api", "endpoint", "http", "request"]) {
            section = section.item("Return consistent error responses and status codes");
        }
        if text::contains_any(&lower, &["database", "db", "sql", "save", "saves", "store", "stores", "persist"]) {
            section = section.item("Keep data consistent when a write fails partway");
        }

        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Completeness,
            "Added error-handling considerations",
            Impact::High,
        ))
    }
}

// ==================== Success Criteria Enforcer ====================

/// Adds a checkbox list of acceptance criteria
pub struct SuccessCriteriaEnforcer;

static SUCCESS_CRITERIA_ENFORCER: PatternDescriptor = PatternDescriptor {
    id: "success-criteria-enforcer",
    name: "Success Criteria Enforcer",
    description: "Adds verifiable acceptance criteria in fast mode",
    intents: &[
        Intent::CodeGeneration,
        Intent::Planning,
        Intent::Refinement,
        Intent::Debugging,
        Intent::Testing,
        Intent::Migration,
        Intent::Documentation,
    ],
    scope: PatternScope::Fast,
    priority: 7,
};

const SUCCESS_MARKERS: &[&str] = &["acceptance criteria", "success criteria", "done when", "definition of done"];

impl Pattern for SuccessCriteriaEnforcer {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &SUCCESS_CRITERIA_ENFORCER
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        let lower = current.to_lowercase();
        if text::has_heading_about(current, &["success criteria", "acceptance", "done"])
            || text::contains_any(&lower, SUCCESS_MARKERS)
        {
            return Ok(PatternResult::unchanged(current, Dimension::Actionability, "Success criteria present"));
        }

        let criteria: [&str; 3] = match ctx.intent.primary_intent {
            Intent::Debugging => [
                "The original failure no longer reproduces",
                "A regression test covers the failure",
                "No new warnings or errors appear",
            ],
            Intent::Refinement => [
                "Behavior is unchanged for existing callers",
                "The targeted quality (readability, speed, size) measurably improves",
                "Existing tests still pass",
            ],
            Intent::Testing => [
                "New tests fail when the code under test is broken",
                "Tests are deterministic and isolated",
                "Coverage of the target area increases",
            ],
            Intent::Migration => [
                "All features work on the target version",
                "Data is intact after the migration",
                "A rollback path has been verified",
            ],
            Intent::Planning => [
                "Each phase has a clear deliverable",
                "Risks have owners and mitigations",
                "The plan fits the stated constraints",
            ],
            Intent::Documentation => [
                "A new reader can follow it without outside help",
                "Examples run as written",
                "It matches current behavior",
            ],
            _ => [
                "The main user flow works end to end",
                "Invalid input is rejected with a clear message",
                "Existing behavior elsewhere is unchanged",
            ],
        };
        let section = Section::new("Success Criteria", ListStyle::Checkbox).items(criteria);

        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Actionability,
            "Added verifiable success criteria",
            Impact::High,
        ))
    }
}

// ==================== Step Decomposer ====================

/// Breaks long or planning requests into ordered steps
pub struct StepDecomposer;

static STEP_DECOMPOSER: PatternDescriptor = PatternDescriptor {
    id: "step-decomposer",
    name: "Step Decomposer",
    description: "Breaks the request into ordered, reviewable steps",
    intents: &[Intent::CodeGeneration, Intent::Planning, Intent::Migration, Intent::Learning],
    scope: PatternScope::Both,
    priority: 6,
};

impl Pattern for StepDecomposer {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &STEP_DECOMPOSER
    }

    fn is_applicable(&self, ctx: &PatternContext<'_>) -> bool {
        default_applicable(self.descriptor(), ctx)
            && (ctx.intent.characteristics.needs_structure || ctx.intent.primary_intent == Intent::Planning)
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        let numbered = current
            .lines()
            .filter(|l| {
                let l = l.trim_start();
                l.chars().next().map_or(false, |c| c.is_ascii_digit()) && l.contains(". ")
            })
            .count();
        if text::has_heading_about(current, &["steps", "phases", "approach"]) || numbered >= 3 {
            return Ok(PatternResult::unchanged(current, Dimension::Structure, "Steps already laid out"));
        }

        let steps: &[&str] = match ctx.intent.primary_intent {
            Intent::Planning => &[
                "Confirm goals and constraints",
                "Identify components and their responsibilities",
                "Sequence the work into phases with deliverables",
                "Flag risks and dependencies between phases",
                "Define how progress will be reviewed",
            ],
            Intent::Migration => &[
                "Inventory everything that depends on the current version",
                "Upgrade on a branch and resolve breaking changes",
                "Migrate data with a verified backup in place",
                "Run the full test suite against the target version",
                "Roll out gradually and monitor",
            ],
            Intent::Learning => &[
                "Start with the core idea in plain language",
                "Walk through a minimal example",
                "Show a common mistake and why it fails",
                "Finish with a short exercise",
            ],
            _ => &[
                "Review the existing code this touches",
                "Define the interfaces and data shapes",
                "Implement the core behavior",
                "Handle errors and edge cases",
                "Add or update tests",
            ],
        };
        let section = Section::new("Suggested Steps", ListStyle::Numbered).items(steps.iter().copied());

        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Structure,
            format!("Decomposed the request into {} ordered steps", section.len()),
            Impact::Medium,
        ))
    }
}

// ==================== Output Format Enforcer ====================

/// States what the response should contain and how it should look
pub struct OutputFormatEnforcer;

static OUTPUT_FORMAT_ENFORCER: PatternDescriptor = PatternDescriptor {
    id: "output-format-enforcer",
    name: "Output Format Enforcer",
    description: "Specifies the expected shape of the response",
    intents: &[
        Intent::CodeGeneration,
        Intent::Planning,
        Intent::Refinement,
        Intent::Debugging,
        Intent::Documentation,
        Intent::Testing,
        Intent::Migration,
        Intent::SecurityReview,
        Intent::Learning,
        Intent::Summarization,
    ],
    scope: PatternScope::Both,
    priority: 5,
};

const FORMAT_MARKERS: &[&str] = &[
    "output format", "respond with", "return a", "format:", "as a table", "in json", "in markdown",
    "bullet points",
];

impl Pattern for OutputFormatEnforcer {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &OUTPUT_FORMAT_ENFORCER
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        let lower = current.to_lowercase();
        if text::contains_any(&lower, FORMAT_MARKERS)
            || text::has_heading_about(current, &["expected output", "output format", "response format"]) {
            return Ok(PatternResult::unchanged(current, Dimension::Structure, "Output format already specified"));
        }

        let items: [&str; 3] = match ctx.intent.primary_intent {
            Intent::Debugging => [
                "Root cause in one or two sentences",
                "The fix as a code change",
                "How to verify the fix",
            ],
            Intent::Planning => [
                "A phased plan with deliverables",
                "Key risks and mitigations",
                "Open questions that need answers",
            ],
            Intent::Documentation => [
                "Markdown with clear headings",
                "At least one usage example",
                "Notes on prerequisites",
            ],
            Intent::Testing => [
                "Test code ready to run",
                "A list of the scenarios covered",
                "Any fixtures or mocks required",
            ],
            Intent::SecurityReview => [
                "Findings ranked by severity",
                "Affected code locations",
                "A concrete remediation for each finding",
            ],
            Intent::Learning => [
                "A plain-language explanation",
                "A worked example",
                "A short recap of the key ideas",
            ],
            Intent::Summarization => [
                "A one-line headline",
                "Main takeaways as bullets",
                "Decisions and open items",
            ],
            _ => [
                "Complete code for each changed file, with its path",
                "A short explanation of key decisions",
                "Notes on anything left incomplete",
            ],
        };
        let section = Section::new("Expected Output", ListStyle::Bullet).items(items);

        Ok(PatternResult::appended(
            current,
            &section,
            Dimension::Structure,
            "Specified the expected output format",
            Impact::Medium,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Characteristics;
    use crate::patterns::test_support::*;
    use crate::patterns::Mode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_objective_uses_first_sentence_of_original() {
        let intent = analysis(Intent::CodeGeneration);
        let result = run(&ObjectiveClarifier, "Create a login page. Use React.", &intent, Mode::Fast);
        assert!(result.applied);
        assert!(result.enhanced_prompt.contains("- Primary goal: Create a login page\n"));
    }

    #[test]
    fn test_objective_skips_stated_goal() {
        let intent = analysis(Intent::CodeGeneration);
        let prompt = "Add caching so that the dashboard loads faster";
        let result = run(&ObjectiveClarifier, prompt, &intent, Mode::Fast);
        assert!(!result.applied);
        assert_eq!(result.enhanced_prompt, prompt);
    }

    #[test]
    fn test_ambiguity_lists_found_terms() {
        let intent = analysis(Intent::CodeGeneration);
        let result = run(&AmbiguityDetector, "Make the page fast and nice", &intent, Mode::Fast);
        assert!(result.applied);
        assert!(result.enhanced_prompt.contains("\"fast\": give a target latency"));
        assert!(result.enhanced_prompt.contains("\"nice\": describe"));
        assert_eq!(result.improvement.impact, Impact::Medium);
    }

    #[test]
    fn test_ambiguity_skips_precise_prompt() {
        let intent = analysis(Intent::CodeGeneration);
        let result = run(&AmbiguityDetector, "Return HTTP 404 for unknown ids", &intent, Mode::Fast);
        assert!(!result.applied);
    }

    #[test]
    fn test_scope_definer_requires_open_ended() {
        let closed = analysis(Intent::CodeGeneration);
        let open = analysis_with(
            Intent::CodeGeneration,
            Characteristics {
                is_open_ended: true,
                ..Characteristics::default()
            },
        );
        assert!(!ScopeDefiner.is_applicable(&ctx(Mode::Fast, "", &closed)));
        assert!(ScopeDefiner.is_applicable(&ctx(Mode::Fast, "", &open)));
    }

    #[test]
    fn test_technical_context_skips_when_stack_named() {
        let intent = analysis(Intent::CodeGeneration);
        let result = run(&TechnicalContextEnricher, "Add a Redis cache to the Django API", &intent, Mode::Fast);
        assert!(!result.applied);
    }

    #[test]
    fn test_technical_context_adds_intent_item() {
        let intent = analysis(Intent::Migration);
        let result = run(&TechnicalContextEnricher, "Move the app to the new version", &intent, Mode::Fast);
        assert!(result.applied);
        assert!(result.enhanced_prompt.contains("- Source and target versions"));
    }

    #[test]
    fn test_error_tolerance_mentions_api_failures() {
        let intent = analysis(Intent::CodeGeneration);
        let result = run(&ErrorToleranceEnhancer, "Build an endpoint that saves orders", &intent, Mode::Fast);
        assert!(result.applied);
        assert!(result.enhanced_prompt.contains("status codes"));
        assert!(result.enhanced_prompt.contains("write fails partway"));
    }

    #[test]
    fn test_error_tolerance_skips_when_discussed() {
        let intent = analysis(Intent::CodeGeneration);
        let result = run(&ErrorToleranceEnhancer, "Build it with retry on timeouts", &intent, Mode::Fast);
        assert!(!result.applied);
    }

    #[test]
    fn test_success_criteria_are_checkboxes() {
        let intent = analysis(Intent::Debugging);
        let result = run(&SuccessCriteriaEnforcer, "Fix the crash", &intent, Mode::Fast);
        assert!(result.applied);
        assert!(result.enhanced_prompt.contains("- [ ] The original failure no longer reproduces"));
    }

    #[test]
    fn test_success_criteria_is_fast_only() {
        let intent = analysis(Intent::CodeGeneration);
        assert!(SuccessCriteriaEnforcer.is_applicable(&ctx(Mode::Fast, "", &intent)));
        assert!(!SuccessCriteriaEnforcer.is_applicable(&ctx(Mode::Deep, "", &intent)));
    }

    #[test]
    fn test_step_decomposer_skips_numbered_prompt() {
        let intent = analysis(Intent::Planning);
        let prompt = "Plan it:\n1. a thing\n2. another\n3. last";
        let result = run(&StepDecomposer, prompt, &intent, Mode::Fast);
        assert!(!result.applied);
    }

    #[test]
    fn test_step_decomposer_gate() {
        let planning = analysis(Intent::Planning);
        let short_code = analysis(Intent::CodeGeneration);
        assert!(StepDecomposer.is_applicable(&ctx(Mode::Fast, "", &planning)));
        assert!(!StepDecomposer.is_applicable(&ctx(Mode::Fast, "", &short_code)));
    }

    #[test]
    fn test_output_format_per_intent() {
        let intent = analysis(Intent::SecurityReview);
        let result = run(&OutputFormatEnforcer, "Audit the login flow", &intent, Mode::Fast);
        assert!(result.enhanced_prompt.contains("- Findings ranked by severity"));

        let stated = run(&OutputFormatEnforcer, "Audit it and respond with a table", &intent, Mode::Fast);
        assert!(!stated.applied);
    }
}
