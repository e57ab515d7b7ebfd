//! Patterns tied to a single intent
//!
//! Each one carries a checklist of concerns for its intent and appends only
//! the concerns the prompt does not already cover.

use super::{uncovered, Check, Impact, Pattern, PatternContext, PatternDescriptor, PatternResult, PatternScope};
use crate::intent::Intent;
use crate::quality::Dimension;
use crate::utils::text::{self, ListStyle, Section, MIN_SECTION_ITEMS};
use crate::utils::Result;

pub(super) fn patterns() -> Vec<Box<dyn Pattern>> {
    vec![
        Box::new(DebuggingContextCollector),
        Box::new(MigrationSafeguard),
        Box::new(SecurityFocus),
        Box::new(TestStrategyEnhancer),
        Box::new(DocumentationAudience),
        Box::new(LearningLevelCalibrator),
        Box::new(SummaryShaper),
        Box::new(RefinementBaseline),
    ]
}

/// Shared body for checklist patterns: skip when the heading exists in the
/// current text or the request leaves fewer than [`MIN_SECTION_ITEMS`]
/// concerns uncovered.
fn checklist(
    current: &str,
    request: &str,
    heading: &str,
    style: ListStyle,
    checks: &[Check],
    dimension: Dimension,
    impact: Impact,
) -> PatternResult {
    if text::has_heading_about(current, &[heading.to_lowercase().as_str()]) {
        return PatternResult::unchanged(current, dimension, format!("{} already present", heading));
    }

    let missing = uncovered(&request.to_lowercase(), checks);
    if missing.len() < MIN_SECTION_ITEMS {
        return PatternResult::unchanged(current, dimension, format!("{} mostly covered", heading));
    }

    let count = missing.len();
    let section = Section::new(heading, style).items(missing);
    PatternResult::appended(
        current,
        &section,
        dimension,
        format!("{}: added {} uncovered item(s)", heading, count),
        impact,
    )
}

// ==================== Debugging Context Collector ====================

/// Requests the diagnostic facts a bug report is missing
pub struct DebuggingContextCollector;

static DEBUGGING_CONTEXT_COLLECTOR: PatternDescriptor = PatternDescriptor {
    id: "debugging-context-collector",
    name: "Debugging Context Collector",
    description: "Asks for error output, expected vs actual behavior and reproduction steps",
    intents: &[Intent::Debugging],
    scope: PatternScope::Both,
    priority: 9,
};

const DEBUGGING_CHECKS: &[Check] = &[
    (&["error message", "stack trace", "traceback", "exception", "log output"], "The exact error message or stack trace"),
    (&["expected", "should"], "Expected behavior"),
    (&["actual", "instead", "but it"], "Actual behavior"),
    (&["steps", "reproduce", "repro", "when i"], "Steps to reproduce"),
    (&["version", "browser", "environment", "os"], "Environment and versions"),
    (&["recently", "after updating", "since", "changed"], "Recent changes before the problem appeared"),
    (&["tried", "attempted"], "What has already been tried"),
];

impl Pattern for DebuggingContextCollector {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &DEBUGGING_CONTEXT_COLLECTOR
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        Ok(checklist(
            current,
            ctx.original_prompt,
            "Diagnostic Information",
            ListStyle::Bullet,
            DEBUGGING_CHECKS,
            Dimension::Completeness,
            Impact::High,
        ))
    }
}

// ==================== Migration Safeguard ====================

/// Adds backup, rollback and compatibility safeguards to migrations
pub struct MigrationSafeguard;

static MIGRATION_SAFEGUARD: PatternDescriptor = PatternDescriptor {
    id: "migration-safeguard",
    name: "Migration Safeguard",
    description: "Adds backup, rollback and compatibility safeguards",
    intents: &[Intent::Migration],
    scope: PatternScope::Both,
    priority: 9,
};

const MIGRATION_CHECKS: &[Check] = &[
    (&["backup", "back up", "snapshot"], "Back up data and configuration before starting"),
    (&["rollback", "roll back", "revert"], "Define a rollback plan and rehearse it"),
    (&["breaking change", "breaking changes", "changelog"], "List breaking changes between source and target"),
    (&["side by side", "feature flag", "dual"], "Run old and new paths side by side where possible"),
    (&["integrity", "validate data", "verify data"], "Verify data integrity after each step"),
    (&["incremental", "incrementally", "gradual", "phased"], "Migrate incrementally instead of one cutover"),
];

impl Pattern for MigrationSafeguard {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &MIGRATION_SAFEGUARD
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        Ok(checklist(
            current,
            ctx.original_prompt,
            "Migration Safeguards",
            ListStyle::Checkbox,
            MIGRATION_CHECKS,
            Dimension::Completeness,
            Impact::High,
        ))
    }
}

// ==================== Security Focus ====================

/// Lists the review areas a security audit should cover
pub struct SecurityFocus;

static SECURITY_FOCUS: PatternDescriptor = PatternDescriptor {
    id: "security-focus",
    name: "Security Focus",
    description: "Lists the security areas the review must cover",
    intents: &[Intent::SecurityReview],
    scope: PatternScope::Both,
    priority: 9,
};

const SECURITY_CHECKS: &[Check] = &[
    (&["input validation", "sanitize", "sanitization", "output encoding"], "Input validation and output encoding"),
    (&["authentication", "session", "sessions"], "Authentication and session handling"),
    (&["authorization", "permission", "permissions", "access control", "roles"], "Authorization checks on every protected action"),
    (&["secret", "secrets", "credentials", "api key", "api keys"], "Storage of secrets and credentials"),
    (&["injection", "sql injection"], "Injection risks (SQL, command, template)"),
    (&["xss", "csrf", "cross-site"], "Cross-site scripting and request forgery"),
    (&["dependency", "dependencies", "cve", "cves"], "Known vulnerabilities in dependencies"),
    (&["audit log", "security logging"], "Security logging that does not leak sensitive data"),
];

impl Pattern for SecurityFocus {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &SECURITY_FOCUS
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        Ok(checklist(
            current,
            ctx.original_prompt,
            "Security Review Focus",
            ListStyle::Checkbox,
            SECURITY_CHECKS,
            Dimension::Completeness,
            Impact::High,
        ))
    }
}

// ==================== Test Strategy Enhancer ====================

/// Spells out test levels, edge cases and fixtures
pub struct TestStrategyEnhancer;

static TEST_STRATEGY_ENHANCER: PatternDescriptor = PatternDescriptor {
    id: "test-strategy-enhancer",
    name: "Test Strategy Enhancer",
    description: "Spells out test levels, edge cases and fixtures",
    intents: &[Intent::Testing],
    scope: PatternScope::Both,
    priority: 8,
};

const TEST_CHECKS: &[Check] = &[
    (&["unit"], "Unit tests for individual functions"),
    (&["integration"], "Integration tests across module boundaries"),
    (&["edge case", "edge cases", "boundary"], "Edge cases: empty, maximum and malformed input"),
    (&["failure", "failures", "error path", "error paths"], "Failure paths and their error messages"),
    (&["mock", "mocks", "fixture", "fixtures", "stub"], "Mocks or fixtures for external dependencies"),
    (&["deterministic", "flaky"], "Deterministic tests with no timing or ordering dependence"),
    (&["coverage"], "A coverage target for the changed code"),
];

impl Pattern for TestStrategyEnhancer {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &TEST_STRATEGY_ENHANCER
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        Ok(checklist(
            current,
            ctx.original_prompt,
            "Test Coverage Plan",
            ListStyle::Bullet,
            TEST_CHECKS,
            Dimension::Completeness,
            Impact::High,
        ))
    }
}

// ==================== Documentation Audience ====================

/// Pins down audience, examples and format for documentation
pub struct DocumentationAudience;

static DOCUMENTATION_AUDIENCE: PatternDescriptor = PatternDescriptor {
    id: "documentation-audience",
    name: "Documentation Audience",
    description: "Pins down audience, examples and format for documentation",
    intents: &[Intent::Documentation],
    scope: PatternScope::Both,
    priority: 8,
};

const DOCUMENTATION_CHECKS: &[Check] = &[
    (&["audience", "reader", "readers", "for developers", "for users"], "Audience: who reads this and what they already know"),
    (&["example", "examples"], "Examples: at least one runnable usage example"),
    (&["format", "markdown", "section", "sections"], "Format: headings, length and where the document lives"),
    (&["prerequisite", "prerequisites", "install", "setup"], "Prerequisites and setup steps"),
    (&["limitation", "limitations", "caveat", "known issue"], "Limitations and known issues"),
];

impl Pattern for DocumentationAudience {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &DOCUMENTATION_AUDIENCE
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        Ok(checklist(
            current,
            ctx.original_prompt,
            "Documentation Requirements",
            ListStyle::Bullet,
            DOCUMENTATION_CHECKS,
            Dimension::Completeness,
            Impact::Medium,
        ))
    }
}

// ==================== Learning Level Calibrator ====================

/// Asks for the learner's level and preferred depth
pub struct LearningLevelCalibrator;

static LEARNING_LEVEL_CALIBRATOR: PatternDescriptor = PatternDescriptor {
    id: "learning-level-calibrator",
    name: "Learning Level Calibrator",
    description: "Calibrates explanation depth to the learner's level",
    intents: &[Intent::Learning],
    scope: PatternScope::Both,
    priority: 8,
};

const LEARNING_CHECKS: &[Check] = &[
    (&["beginner", "intermediate", "advanced", "experience", "new to", "level"], "Current level with this topic"),
    (&["example", "examples"], "Whether worked examples would help"),
    (&["analogy", "analogies"], "Whether analogies to familiar concepts are useful"),
    (&["depth", "in depth", "detail", "detailed", "briefly"], "How deep the explanation should go"),
    (&["exercise", "exercises", "practice"], "Whether to include a practice exercise"),
];

impl Pattern for LearningLevelCalibrator {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &LEARNING_LEVEL_CALIBRATOR
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        Ok(checklist(
            current,
            ctx.original_prompt,
            "Learning Preferences",
            ListStyle::Bullet,
            LEARNING_CHECKS,
            Dimension::Clarity,
            Impact::Medium,
        ))
    }
}

// ==================== Summary Shaper ====================

/// Sets length, audience and focus for summaries
pub struct SummaryShaper;

static SUMMARY_SHAPER: PatternDescriptor = PatternDescriptor {
    id: "summary-shaper",
    name: "Summary Shaper",
    description: "Sets length, audience and focus for a summary",
    intents: &[Intent::Summarization],
    scope: PatternScope::Both,
    priority: 8,
};

const SUMMARY_CHECKS: &[Check] = &[
    (&["words", "sentences", "length", "short", "brief", "paragraph"], "Target length, for example five bullets or 100 words"),
    (&["audience", "for the team", "for executives", "for managers"], "Audience and what they need to decide"),
    (&["key points", "focus", "decisions", "action items"], "Focus: decisions, action items or open questions"),
    (&["format", "bullets", "bullet points", "table", "prose"], "Format: bullets, prose or a table"),
    (&["omit", "exclude", "skip", "ignore"], "What to leave out"),
];

impl Pattern for SummaryShaper {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &SUMMARY_SHAPER
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        Ok(checklist(
            current,
            ctx.original_prompt,
            "Summary Requirements",
            ListStyle::Bullet,
            SUMMARY_CHECKS,
            Dimension::Specificity,
            Impact::Medium,
        ))
    }
}

// ==================== Refinement Baseline ====================

/// Records current state, target and constraints for a refinement
pub struct RefinementBaseline;

static REFINEMENT_BASELINE: PatternDescriptor = PatternDescriptor {
    id: "refinement-baseline",
    name: "Refinement Baseline",
    description: "Records the current state, target and invariants of a refinement",
    intents: &[Intent::Refinement],
    scope: PatternScope::Both,
    priority: 8,
};

const REFINEMENT_CHECKS: &[Check] = &[
    (&["current", "currently", "existing", "today"], "Current state: what the code or text does now"),
    (&["goal", "target", "faster", "simpler", "more readable"], "Target: what improved means here, measurably if possible"),
    (&["preserve", "keep", "unchanged", "backward compatible"], "Invariants: behavior and interfaces that must not change"),
    (&["test", "tests", "verify"], "Verification: how to confirm nothing regressed"),
];

impl Pattern for RefinementBaseline {
    fn descriptor(&self) -> &'static PatternDescriptor {
        &REFINEMENT_BASELINE
    }

    fn apply(&self, current: &str, ctx: &PatternContext<'_>) -> Result<PatternResult> {
        Ok(checklist(
            current,
            ctx.original_prompt,
            "Refinement Baseline",
            ListStyle::Bullet,
            REFINEMENT_CHECKS,
            Dimension::Clarity,
            Impact::Medium,
        ))
    }
}
