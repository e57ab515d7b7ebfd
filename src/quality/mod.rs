//! Quality Assessment
//!
//! Scores prompt text along six independent dimensions:
//! - clarity, efficiency, structure, completeness, actionability (the base five)
//! - specificity (reported, not aggregated)
//!
//! Every dimension is a pure function of the enhanced text's lexical and
//! structural features, weighted by intent where the criteria differ.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::intent::{Intent, IntentAnalysis};
use crate::utils::text;

// ==================== Overall Weights ====================

/// Weight of each base dimension in `overall`; sums to 1.0
pub const CLARITY_WEIGHT: f64 = 0.25;
pub const EFFICIENCY_WEIGHT: f64 = 0.10;
pub const STRUCTURE_WEIGHT: f64 = 0.20;
pub const COMPLETENESS_WEIGHT: f64 = 0.25;
pub const ACTIONABILITY_WEIGHT: f64 = 0.20;

// ==================== Vocabulary ====================

const VAGUE_TERMS: &[&str] = &[
    "something", "stuff", "things", "somehow", "etc", "nice", "good", "better", "properly",
    "various", "whatever", "kind of", "sort of", "a bit", "some", "maybe",
];

const FILLER_PHRASES: &[&str] = &[
    "please", "could you", "would you", "can you", "i was wondering", "kindly", "just",
    "basically", "actually", "really", "very", "thanks", "thank you", "if possible", "i think",
    "i guess",
];

pub(crate) const ACTION_VERBS: &[&str] = &[
    "create", "build", "implement", "write", "add", "generate", "make", "develop", "design",
    "plan", "refactor", "improve", "optimize", "fix", "debug", "document", "test", "migrate",
    "upgrade", "audit", "review", "explain", "summarize", "list", "update", "remove", "replace",
    "validate", "verify", "define", "identify", "describe", "compare", "analyze", "provide",
    "return", "include", "ensure", "check", "confirm",
];

const DELIVERABLES: &[&str] = &[
    "file", "function", "endpoint", "component", "page", "report", "document", "test", "tests",
    "script", "module", "class", "table", "diagram", "checklist", "summary", "schema",
];

const OBJECTIVE_MARKERS: &[&str] = &["goal", "objective", "so that", "in order to", "purpose"];

const CONSTRAINT_MARKERS: &[&str] = &[
    "must", "should", "only", "exactly", "at least", "at most", "within", "using", "without",
    "constraint", "constraints", "limit", "require", "requires",
];

const OUTCOME_MARKERS: &[&str] = &[
    "expected", "output", "success", "criteria", "return", "returns", "result", "deliverable",
    "done when", "format",
];

const CONTEXT_MARKERS: &[&str] = &["context", "background", "currently", "existing", "our", "we use"];

/// A named completeness criterion satisfied by any of its terms
type Criterion = (&'static str, &'static [&'static str]);

/// Extra completeness criteria per intent
fn intent_criteria(intent: Intent) -> &'static [Criterion] {
    match intent {
        Intent::CodeGeneration => &[("robustness", &["error", "errors", "edge case", "edge cases", "validation", "test", "tests"])],
        Intent::Planning => &[
            ("milestones", &["milestone", "milestones", "phase", "phases", "timeline"]),
            ("risks", &["risk", "risks", "dependency", "dependencies"]),
            ("deliverables", &["deliverable", "deliverables", "outcome", "outcomes"]),
        ],
        Intent::Refinement => &[
            ("current state", &["current", "currently", "existing"]),
            ("target", &["goal", "improve", "target", "faster", "simpler"]),
            ("preservation", &["preserve", "keep", "behavior", "behaviour", "unchanged"]),
        ],
        Intent::Debugging => &[
            ("error message", &["error", "exception", "stack trace", "traceback", "message"]),
            ("expected behavior", &["expected", "should"]),
            ("actual behavior", &["actual", "instead", "but", "actually"]),
            ("reproduction", &["steps", "reproduce", "when", "repro"]),
        ],
        Intent::Documentation => &[
            ("audience", &["audience", "reader", "readers", "developers", "users"]),
            ("examples", &["example", "examples", "sample"]),
            ("format", &["format", "markdown", "section", "sections"]),
        ],
        Intent::PrdGeneration => &[
            ("users", &["user", "users", "persona", "personas", "customer", "customers"]),
            ("requirements", &["requirement", "requirements", "must", "feature", "features"]),
            ("metrics", &["metric", "metrics", "kpi", "kpis", "success"]),
            ("scope", &["scope", "out of scope", "non-goal", "non-goals"]),
        ],
        Intent::Testing => &[
            ("test levels", &["unit", "integration", "e2e", "end-to-end"]),
            ("edge cases", &["edge case", "edge cases", "boundary", "boundaries"]),
            ("fixtures", &["mock", "mocks", "fixture", "fixtures", "stub"]),
        ],
        Intent::Migration => &[
            ("rollback", &["rollback", "roll back", "backup", "revert"]),
            ("compatibility", &["compatibility", "compatible", "backward", "breaking"]),
            ("data", &["data", "schema", "records"]),
        ],
        Intent::SecurityReview => &[
            ("access control", &["authentication", "authorization", "auth", "permissions"]),
            ("input handling", &["input validation", "sanitize", "injection", "validation"]),
            ("secrets", &["secrets", "credentials", "encryption", "tokens"]),
        ],
        Intent::Learning => &[
            ("level", &["level", "beginner", "intermediate", "advanced", "experience"]),
            ("examples", &["example", "examples", "analogy"]),
        ],
        Intent::Summarization => &[
            ("length", &["length", "words", "sentences", "brief", "short", "paragraph"]),
            ("audience", &["audience", "for", "reader"]),
            ("focus", &["key points", "focus", "decisions", "action items"]),
        ],
    }
}

/// Names of the intent's completeness criteria the lowercase text misses
pub(crate) fn missing_criteria(lower: &str, intent: Intent) -> Vec<&'static str> {
    intent_criteria(intent)
        .iter()
        .filter(|(_, terms)| !text::contains_any(lower, terms))
        .map(|(name, _)| *name)
        .collect()
}

// ==================== Score Types ====================

/// A scored aspect of prompt quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Clarity,
    Efficiency,
    Structure,
    Completeness,
    Actionability,
    Specificity,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Clarity => "clarity",
            Dimension::Efficiency => "efficiency",
            Dimension::Structure => "structure",
            Dimension::Completeness => "completeness",
            Dimension::Actionability => "actionability",
            Dimension::Specificity => "specificity",
        };
        f.write_str(name)
    }
}

/// Per-dimension scores, each in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityScore {
    pub clarity: u8,
    pub efficiency: u8,
    pub structure: u8,
    pub completeness: u8,
    pub actionability: u8,
    pub specificity: u8,
    /// Weighted mean of the base five; see the `*_WEIGHT` constants
    pub overall: u8,
}

impl QualityScore {
    /// Build a score from the six dimensions, deriving `overall`
    pub fn from_dimensions(
        clarity: u8,
        efficiency: u8,
        structure: u8,
        completeness: u8,
        actionability: u8,
        specificity: u8,
    ) -> Self {
        let clarity = clarity.min(100);
        let efficiency = efficiency.min(100);
        let structure = structure.min(100);
        let completeness = completeness.min(100);
        let actionability = actionability.min(100);
        let overall = clarity as f64 * CLARITY_WEIGHT
            + efficiency as f64 * EFFICIENCY_WEIGHT
            + structure as f64 * STRUCTURE_WEIGHT
            + completeness as f64 * COMPLETENESS_WEIGHT
            + actionability as f64 * ACTIONABILITY_WEIGHT;

        Self {
            clarity,
            efficiency,
            structure,
            completeness,
            actionability,
            specificity: specificity.min(100),
            overall: clamp_score(overall),
        }
    }

    /// Score of a single dimension
    pub fn get(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Clarity => self.clarity,
            Dimension::Efficiency => self.efficiency,
            Dimension::Structure => self.structure,
            Dimension::Completeness => self.completeness,
            Dimension::Actionability => self.actionability,
            Dimension::Specificity => self.specificity,
        }
    }

    pub fn grade(&self) -> Grade {
        match self.overall {
            85..=u8::MAX => Grade::Excellent,
            70..=84 => Grade::Good,
            50..=69 => Grade::Fair,
            _ => Grade::Poor,
        }
    }

    /// The lowest-scoring base dimension (first wins ties)
    pub fn weakest(&self) -> Dimension {
        [
            Dimension::Clarity,
            Dimension::Efficiency,
            Dimension::Structure,
            Dimension::Completeness,
            Dimension::Actionability,
        ]
        .into_iter()
        .fold(Dimension::Clarity, |acc, d| if self.get(d) < self.get(acc) { d } else { acc })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Grade::Excellent => "excellent",
            Grade::Good => "good",
            Grade::Fair => "fair",
            Grade::Poor => "poor",
        };
        f.write_str(name)
    }
}

fn clamp_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

// ==================== Assessor ====================

/// Scores prompt text; stateless and shareable across threads
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityAssessor;

impl QualityAssessor {
    pub fn new() -> Self {
        Self
    }

    /// Score the enhanced prompt. `original` is accepted so callers can pass
    /// both sides of a run; the scores depend only on `enhanced` and the intent.
    pub fn assess(&self, _original: &str, enhanced: &str, intent: &IntentAnalysis) -> QualityScore {
        self.assess_text(enhanced, intent.primary_intent)
    }

    /// Score a single text for a given intent
    pub fn assess_text(&self, text: &str, intent: Intent) -> QualityScore {
        if text.trim().is_empty() {
            return QualityScore::from_dimensions(0, 0, 0, 0, 0, 0);
        }
        let lower = text.to_lowercase();

        QualityScore::from_dimensions(
            self.clarity(text, &lower),
            self.efficiency(text, &lower),
            self.structure(text),
            self.completeness(text, &lower, intent),
            self.actionability(text, &lower),
            self.specificity(text, &lower),
        )
    }

    fn clarity(&self, text: &str, lower: &str) -> u8 {
        let mut score = 100.0;

        let vague = text::count_matches(lower, VAGUE_TERMS) as f64;
        score -= (vague * 8.0).min(40.0);

        let avg = text::average_sentence_length(text);
        if avg > 25.0 {
            score -= (avg - 25.0).min(20.0);
        }
        if !text::contains_any(lower, ACTION_VERBS) {
            score -= 15.0;
        }
        if text::word_count(text) < 5 {
            score -= 20.0;
        }
        if text::contains_any(lower, OBJECTIVE_MARKERS) {
            score += 5.0;
        }
        clamp_score(score)
    }

    fn efficiency(&self, text: &str, lower: &str) -> u8 {
        let mut score = 100.0;

        let filler = text::count_matches(lower, FILLER_PHRASES) as f64;
        score -= (filler * 5.0).min(30.0);

        let repetition = text::repetition_ratio(text);
        if repetition > 0.3 {
            score -= ((repetition - 0.3) * 100.0).min(30.0);
        }

        let words = text::word_count(text);
        if words > 1200 {
            score -= 20.0;
        } else if words > 600 {
            score -= 10.0;
        }
        clamp_score(score)
    }

    fn structure(&self, text: &str) -> u8 {
        let words = text::word_count(text);
        let sentences = text::sentences(text).len();
        let headings = text::count_headings(text);
        let items = text::count_list_items(text);

        // a one-line request is reasonably structured as is
        let mut score = if words < 15 && sentences <= 1 { 50.0 } else { 30.0 };
        score += (headings as f64 * 10.0).min(30.0);
        score += (items as f64 * 5.0).min(25.0);
        if text::count_paragraphs(text) >= 2 {
            score += 10.0;
        }
        if text::has_code_fence(text) {
            score += 5.0;
        }
        clamp_score(score)
    }

    fn completeness(&self, text: &str, lower: &str, intent: Intent) -> u8 {
        let has_context = text::contains_any(lower, CONTEXT_MARKERS)
            || text::has_identifier(text)
            || text::has_file_reference(text)
            || text::has_code_fence(text);

        let mut satisfied = 0usize;
        let mut total = 4usize;

        if text::contains_any(lower, ACTION_VERBS) || text::contains_any(lower, OBJECTIVE_MARKERS) {
            satisfied += 1;
        }
        if has_context {
            satisfied += 1;
        }
        if text::contains_any(lower, CONSTRAINT_MARKERS) || text::count_numbers(text) > 0 {
            satisfied += 1;
        }
        if text::contains_any(lower, OUTCOME_MARKERS) {
            satisfied += 1;
        }

        for (_, terms) in intent_criteria(intent) {
            total += 1;
            if text::contains_any(lower, terms) {
                satisfied += 1;
            }
        }
        clamp_score(satisfied as f64 / total as f64 * 100.0)
    }

    fn actionability(&self, text: &str, lower: &str) -> u8 {
        let mut score = 20.0;

        let opens_with_verb = text::sentences(text).iter().any(|s| {
            text::leading_word(s).map_or(false, |w| ACTION_VERBS.contains(&w.as_str()))
        });
        if opens_with_verb {
            score += 25.0;
        }

        let verbs = text::count_matches(lower, ACTION_VERBS) as f64;
        score += (verbs * 5.0).min(20.0);

        if text.contains("- [ ]") || text.contains("- [x]") {
            score += 15.0;
        }
        let numbered = text
            .lines()
            .filter(|l| {
                let l = l.trim_start();
                l.chars().next().map_or(false, |c| c.is_ascii_digit()) && l.contains(". ")
            })
            .count();
        if numbered > 0 {
            score += 10.0;
        }

        let deliverables = text::count_matches(lower, DELIVERABLES) as f64;
        score += (deliverables * 5.0).min(10.0);
        clamp_score(score)
    }

    fn specificity(&self, text: &str, lower: &str) -> u8 {
        let mut score = 20.0;

        score += (text::count_numbers(text) as f64 * 8.0).min(24.0);
        if text::has_identifier(text) || text::has_inline_code(text) || text::has_code_fence(text) {
            score += 15.0;
        }
        if text::has_file_reference(text) {
            score += 10.0;
        }
        score += (text::count_quoted(text) as f64 * 5.0).min(10.0);

        let vague = text::count_matches(lower, VAGUE_TERMS) as f64;
        score -= (vague * 5.0).min(20.0);

        let technical = crate::intent::detector::technical_term_count(lower) as f64;
        score += (technical * 5.0).min(20.0);
        clamp_score(score)
    }
}
