//! Intent detection over lexical and structural surface features
//!
//! Each intent owns a keyword table. Single words score 1, multi-word
//! phrases score 2, and a leading imperative verb adds a bonus. Anchor terms
//! name the artifact being asked for ("a PRD", "the README") and score extra;
//! an anchor for one intent also cancels another intent's leading-verb bonus,
//! so "Write a PRD" is a PRD request rather than a code request. The highest
//! score wins; ties go to the intent listed first in [`INTENT_KEYWORDS`].

use super::{Characteristics, Intent, IntentAnalysis};
use crate::utils::text;

/// Confidence reported for empty input
const MIN_CONFIDENCE: u8 = 10;
/// Confidence reported when nothing in the prompt matched
const NO_SIGNAL_CONFIDENCE: u8 = 25;
const MAX_CONFIDENCE: u8 = 95;

const LEADING_VERB_BONUS: u32 = 2;
/// Added on top of the keyword score for each anchor term
const ANCHOR_BONUS: u32 = 2;

/// Word count at or above which a prompt without headings or lists needs structure
const STRUCTURE_WORDS: usize = 40;
/// Sentence count at or above which a prompt without headings or lists needs structure
const STRUCTURE_SENTENCES: usize = 3;
/// Prompts at most this long with no constraints count as open-ended
const OPEN_ENDED_MAX_WORDS: usize = 25;

/// Keyword tables, in tie-break order
const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::CodeGeneration,
        &[
            "create", "build", "implement", "write", "add", "generate", "make", "develop", "code",
            "function", "component", "page", "endpoint", "class", "script",
            "write a function",
        ],
    ),
    (
        Intent::Planning,
        &[
            "plan", "design", "architect", "architecture", "roadmap", "strategy", "approach",
            "organize", "outline", "breakdown", "milestone", "milestones", "phases", "how should",
            "break down", "system design",
        ],
    ),
    (
        Intent::Refinement,
        &[
            "refactor", "improve", "optimize", "clean", "simplify", "enhance", "rewrite",
            "restructure", "polish", "tweak", "readability", "performance", "clean up",
            "make it better",
        ],
    ),
    (
        Intent::Debugging,
        &[
            "fix", "bug", "bugs", "error", "crash", "crashes", "broken", "issue", "debug",
            "failing", "fails", "exception", "undefined", "null", "not working", "stack trace",
            "traceback", "doesn't work", "throws",
        ],
    ),
    (
        Intent::Documentation,
        &[
            "document", "documentation", "docs", "readme", "docstring", "docstrings", "jsdoc",
            "changelog", "comments", "api reference", "usage guide", "write docs",
        ],
    ),
    (
        Intent::PrdGeneration,
        &[
            "prd", "requirements", "spec", "specification", "stakeholders", "mvp", "product",
            "product requirements", "user stories", "user story", "acceptance criteria",
            "feature request",
        ],
    ),
    (
        Intent::Testing,
        &[
            "test", "tests", "testing", "coverage", "mock", "mocks", "assertion", "assertions",
            "tdd", "jest", "pytest", "vitest", "unit test", "unit tests", "integration test",
            "integration tests", "e2e", "test cases",
        ],
    ),
    (
        Intent::Migration,
        &[
            "migrate", "migration", "upgrade", "port", "convert", "transition", "legacy",
            "deprecate", "deprecated", "move from", "switch from", "migrate from", "upgrade to",
        ],
    ),
    (
        Intent::SecurityReview,
        &[
            "security", "vulnerability", "vulnerabilities", "audit", "exploit", "xss", "csrf",
            "owasp", "cve", "sanitize", "secure", "sql injection", "threat model",
            "penetration test", "security review",
        ],
    ),
    (
        Intent::Learning,
        &[
            "learn", "understand", "explain", "teach", "tutorial", "concept", "concepts",
            "beginner", "what is", "how does", "why does", "difference between", "help me understand",
        ],
    ),
    (
        Intent::Summarization,
        &[
            "summarize", "summary", "tldr", "recap", "condense", "digest", "overview",
            "key points", "tl;dr", "sum up",
        ],
    ),
];

/// Artifact nouns that identify an intent regardless of the verb in front of them
const ANCHOR_TERMS: &[(Intent, &[&str])] = &[
    (
        Intent::PrdGeneration,
        &["prd", "spec", "specification", "product requirements", "user stories", "user story"],
    ),
    (Intent::Documentation, &["readme", "docstring", "docstrings", "jsdoc", "changelog"]),
    (Intent::SecurityReview, &["owasp", "xss", "csrf", "sql injection", "threat model"]),
    (Intent::Summarization, &["tldr", "tl;dr"]),
];

/// Imperative verbs that strongly signal an intent when they open the prompt
const LEADING_VERBS: &[(&str, Intent)] = &[
    ("create", Intent::CodeGeneration),
    ("build", Intent::CodeGeneration),
    ("implement", Intent::CodeGeneration),
    ("write", Intent::CodeGeneration),
    ("add", Intent::CodeGeneration),
    ("generate", Intent::CodeGeneration),
    ("make", Intent::CodeGeneration),
    ("plan", Intent::Planning),
    ("design", Intent::Planning),
    ("outline", Intent::Planning),
    ("architect", Intent::Planning),
    ("refactor", Intent::Refinement),
    ("improve", Intent::Refinement),
    ("optimize", Intent::Refinement),
    ("simplify", Intent::Refinement),
    ("clean", Intent::Refinement),
    ("fix", Intent::Debugging),
    ("debug", Intent::Debugging),
    ("document", Intent::Documentation),
    ("test", Intent::Testing),
    ("migrate", Intent::Migration),
    ("upgrade", Intent::Migration),
    ("port", Intent::Migration),
    ("convert", Intent::Migration),
    ("audit", Intent::SecurityReview),
    ("secure", Intent::SecurityReview),
    ("explain", Intent::Learning),
    ("teach", Intent::Learning),
    ("summarize", Intent::Summarization),
    ("recap", Intent::Summarization),
    ("condense", Intent::Summarization),
];

/// Technology vocabulary for `has_technical_terms`
const TECHNICAL_TERMS: &[&str] = &[
    "api", "rest", "graphql", "grpc", "http", "https", "websocket", "database", "sql", "postgres",
    "postgresql", "mysql", "sqlite", "mongodb", "redis", "react", "vue", "angular", "svelte",
    "next.js", "nextjs", "node", "node.js", "express", "django", "flask", "fastapi", "spring",
    "rails", "python", "rust", "typescript", "javascript", "java", "kotlin", "swift", "golang",
    "docker", "kubernetes", "k8s", "aws", "gcp", "azure", "lambda", "oauth", "jwt", "css", "html",
    "tailwind", "frontend", "backend", "server", "microservice", "microservices", "cache",
    "queue", "kafka", "cli", "git", "ci", "json", "yaml", "schema", "orm", "async", "thread",
    "webpack", "vite", "npm", "cargo",
];

/// Phrases that mark a prompt as exploratory
const OPEN_PHRASES: &[&str] = &[
    "how should", "how can i", "how do i", "what's the best", "what is the best", "best way",
    "ideas", "explore", "brainstorm", "maybe", "suggest", "options", "alternatives",
    "any thoughts", "not sure", "should i", "something like",
];

/// Words that signal a concrete constraint
const CONSTRAINT_WORDS: &[&str] = &[
    "must", "should", "only", "exactly", "at least", "at most", "within", "using", "without",
    "must not", "require", "requires", "limit", "no more than",
];

/// Classifies prompts into an [`IntentAnalysis`]
///
/// Stateless; a single instance can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentDetector;

impl IntentDetector {
    pub fn new() -> Self {
        Self
    }

    /// Analyze a prompt. Never fails; empty input yields the default intent
    /// at minimum confidence.
    pub fn analyze(&self, text: &str) -> IntentAnalysis {
        let characteristics = self.characteristics(text);
        let lower = text.to_lowercase();

        if lower.trim().is_empty() {
            return IntentAnalysis::new(Intent::CodeGeneration, MIN_CONFIDENCE, characteristics);
        }

        let scores = self.score(&lower, text);
        let (primary, top) = best(&scores, None);
        if top == 0 {
            return IntentAnalysis::new(Intent::CodeGeneration, NO_SIGNAL_CONFIDENCE, characteristics);
        }

        let (runner_up, second) = best(&scores, Some(primary));
        let margin = top - second;
        let confidence = (30 + top * 10 + margin * 5).clamp(MIN_CONFIDENCE as u32, MAX_CONFIDENCE as u32);

        let mut analysis = IntentAnalysis::new(primary, confidence as u8, characteristics);
        if second > 0 {
            analysis.secondary_intent = Some(runner_up);
        }
        analysis
    }

    /// Score every intent; order follows [`INTENT_KEYWORDS`]
    fn score(&self, lower: &str, text: &str) -> Vec<(Intent, u32)> {
        let leading = text::leading_word(text);
        let anchored: Vec<Intent> = ANCHOR_TERMS
            .iter()
            .filter(|(_, terms)| text::contains_any(lower, terms))
            .map(|(intent, _)| *intent)
            .collect();

        INTENT_KEYWORDS
            .iter()
            .map(|(intent, keywords)| {
                let mut score: u32 = keywords
                    .iter()
                    .filter(|k| text::contains_word(lower, k))
                    .map(|k| if k.contains(' ') { 2 } else { 1 })
                    .sum();
                score += anchor_score(lower, *intent);

                let verb_matches = leading
                    .as_deref()
                    .is_some_and(|verb| LEADING_VERBS.iter().any(|(v, i)| *v == verb && i == intent));
                if verb_matches && anchored.iter().all(|a| a == intent) {
                    score += LEADING_VERB_BONUS;
                }
                (*intent, score)
            })
            .collect()
    }

    /// Compute characteristics from surface features only
    pub fn characteristics(&self, text: &str) -> Characteristics {
        let lower = text.to_lowercase();
        let words = text::word_count(text);

        let has_code_context = text::has_code_fence(text)
            || text::has_inline_code(text)
            || text::has_identifier(text)
            || text::has_file_reference(text);

        let has_technical_terms = text::contains_any(&lower, TECHNICAL_TERMS);

        let has_constraints = text::count_numbers(text) > 0
            || text::count_quoted(text) > 0
            || has_code_context
            || text::contains_any(&lower, CONSTRAINT_WORDS);
        let is_open_ended = text::contains_any(&lower, OPEN_PHRASES)
            || (words <= OPEN_ENDED_MAX_WORDS && !has_constraints);

        let is_long = words >= STRUCTURE_WORDS || text::sentences(text).len() >= STRUCTURE_SENTENCES;
        let needs_structure =
            is_long && text::count_headings(text) == 0 && text::count_list_items(text) == 0;

        Characteristics {
            has_code_context,
            has_technical_terms,
            is_open_ended,
            needs_structure,
        }
    }
}

/// Number of distinct technology terms in lowercase text
pub(crate) fn technical_term_count(lower: &str) -> usize {
    text::count_matches(lower, TECHNICAL_TERMS)
}

/// Anchor bonus for `intent`; anchors also count as ordinary keywords
fn anchor_score(lower: &str, intent: Intent) -> u32 {
    ANCHOR_TERMS
        .iter()
        .filter(|(i, _)| *i == intent)
        .flat_map(|(_, terms)| terms.iter())
        .filter(|t| text::contains_word(lower, t))
        .count() as u32
        * ANCHOR_BONUS
}

/// Highest-scoring intent, skipping `exclude`; first entry wins ties
fn best(scores: &[(Intent, u32)], exclude: Option<Intent>) -> (Intent, u32) {
    let mut winner = (Intent::CodeGeneration, 0);
    let mut seen = false;
    for &(intent, score) in scores {
        if Some(intent) == exclude {
            continue;
        }
        if !seen || score > winner.1 {
            winner = (intent, score);
            seen = true;
        }
    }
    winner
}
