//! Prompt patterns
//!
//! A pattern is a self-contained rule that may append one section of
//! missing information to a prompt (error handling, edge cases, output
//! format, ...). Patterns never rewrite text: when a pattern applies, its
//! input is an unmodified prefix of its output.
//!
//! Every pattern carries a static [`PatternDescriptor`] consulted at
//! selection time, a cheap static gate ([`Pattern::is_applicable`]) and the
//! transformation itself ([`Pattern::apply`]), which first checks whether
//! the current text already covers its concern.
//!
//! Two kinds of coverage are checked. Whether a section is already present
//! is judged on the current text, so a pattern sees what earlier ones
//! appended. Whether the user already stated a fact (an expected behavior,
//! a target audience, a risky input) is judged on
//! [`PatternContext::original_prompt`]: text appended by earlier patterns
//! never counts as information from the user.

pub mod library;

mod core;
mod deep;
mod prd;
mod specialized;

pub use library::{PatternLibrary, PatternStatistics};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::intent::{Intent, IntentAnalysis};
use crate::quality::Dimension;
use crate::utils::text::{self, Section};
use crate::utils::{Error, Result};

// ==================== Modes ====================

/// Which pattern subset a run may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Quick triage pass
    Fast,
    /// Comprehensive pass
    Deep,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Fast => f.write_str("fast"),
            Mode::Deep => f.write_str("deep"),
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(Mode::Fast),
            "deep" => Ok(Mode::Deep),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

/// The modes a pattern runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternScope {
    Fast,
    Deep,
    Both,
}

impl PatternScope {
    pub fn includes(&self, mode: Mode) -> bool {
        matches!(
            (self, mode),
            (PatternScope::Both, _) | (PatternScope::Fast, Mode::Fast) | (PatternScope::Deep, Mode::Deep)
        )
    }
}

// ==================== Pattern Contract ====================

/// Static eligibility data for a pattern
#[derive(Debug)]
pub struct PatternDescriptor {
    /// Globally unique, kebab-case
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub intents: &'static [Intent],
    pub scope: PatternScope,
    /// Higher runs earlier
    pub priority: i32,
}

/// Per-run context, identical for every pattern invocation within a run
#[derive(Debug, Clone, Copy)]
pub struct PatternContext<'a> {
    pub mode: Mode,
    /// The caller's prompt, never the progressively enhanced text
    pub original_prompt: &'a str,
    pub intent: &'a IntentAnalysis,
}

/// Impact of an applied improvement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

/// What a pattern contributed (or why it did not)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Improvement {
    pub dimension: Dimension,
    pub description: String,
    pub impact: Impact,
}

/// Outcome of [`Pattern::apply`]
///
/// Built through [`PatternResult::unchanged`] or [`PatternResult::appended`]
/// so that `applied == false` always carries the input verbatim and
/// `applied == true` always extends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternResult {
    pub enhanced_prompt: String,
    pub improvement: Improvement,
    pub applied: bool,
}

impl PatternResult {
    /// The pattern's concern is already covered; text passes through
    pub fn unchanged(text: &str, dimension: Dimension, reason: impl Into<String>) -> Self {
        Self {
            enhanced_prompt: text.to_string(),
            improvement: Improvement {
                dimension,
                description: reason.into(),
                impact: Impact::Low,
            },
            applied: false,
        }
    }

    /// Append `section` to `text`
    pub fn appended(
        text: &str,
        section: &Section,
        dimension: Dimension,
        description: impl Into<String>,
        impact: Impact,
    ) -> Self {
        Self {
            enhanced_prompt: text::append_section(text, section),
            improvement: Improvement {
                dimension,
                description: description.into(),
                impact,
            },
            applied: true,
        }
    }
}

/// A prompt transformation rule
pub trait Pattern: Send + Sync {
    fn descriptor(&self) -> &'static PatternDescriptor;

    fn id(&self) -> &'static str {
        self.descriptor().id
    }

    fn name(&self) -> &'static str {
        self.descriptor().name
    }

    fn description(&self) -> &'static str {
        self.descriptor().description
    }

    fn applicable_intents(&self) -> &'static [Intent] {
        self.descriptor().intents
    }

    fn scope(&self) -> PatternScope {
        self.descriptor().scope
    }

    fn priority(&self) -> i32 {
        self.descriptor().priority
    }

    /// Static gate; must not look at prompt text
    fn is_applicable(&self, ctx: &PatternContext<'_>) -> bool {
        default_applicable(self.descriptor(), ctx)
    }

    /// Transform the current text. An `Err` is treated as "not applied".
    fn apply(&self, text: &str, ctx: &PatternContext<'_>) -> Result<PatternResult>;
}

/// Intent is listed and the scope covers the mode
pub fn default_applicable(descriptor: &PatternDescriptor, ctx: &PatternContext<'_>) -> bool {
    descriptor.intents.contains(&ctx.intent.primary_intent) && descriptor.scope.includes(ctx.mode)
}

/// Every built-in pattern, in registration order
pub fn builtin_patterns() -> Vec<Box<dyn Pattern>> {
    let mut patterns: Vec<Box<dyn Pattern>> = Vec::new();
    patterns.extend(core::patterns());
    patterns.extend(specialized::patterns());
    patterns.extend(prd::patterns());
    patterns.extend(deep::patterns());
    patterns
}

// ==================== Shared Helpers ====================

/// A checklist entry: emitted only when none of its keywords occur
pub(crate) type Check = (&'static [&'static str], &'static str);

/// Items whose keywords are absent from the lowercase text
pub(crate) fn uncovered(lower: &str, checks: &[Check]) -> Vec<&'static str> {
    checks
        .iter()
        .filter(|(keywords, _)| !text::contains_any(lower, keywords))
        .map(|(_, item)| *item)
        .collect()
}

/// Every intent; for patterns that apply universally
pub(crate) const ALL_INTENTS: &[Intent] = &Intent::ALL;

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::intent::Characteristics;

    pub fn analysis(intent: Intent) -> IntentAnalysis {
        IntentAnalysis::new(intent, 80, Characteristics::default())
    }

    pub fn analysis_with(intent: Intent, characteristics: Characteristics) -> IntentAnalysis {
        IntentAnalysis::new(intent, 80, characteristics)
    }

    pub fn ctx<'a>(mode: Mode, prompt: &'a str, intent: &'a IntentAnalysis) -> PatternContext<'a> {
        PatternContext {
            mode,
            original_prompt: prompt,
            intent,
        }
    }

    /// Apply a pattern directly to `prompt`, panicking on error
    pub fn run(pattern: &dyn Pattern, prompt: &str, intent: &IntentAnalysis, mode: Mode) -> PatternResult {
        let context = ctx(mode, prompt, intent);
        match pattern.apply(prompt, &context) {
            Ok(result) => result,
            Err(e) => panic!("{} failed: {}", pattern.id(), e),
        }
    }
}
