//! Optimization pipeline
//!
//! Detect intent, select patterns, apply them one after another to a single
//! progressively enhanced text, then score the result. A failing pattern is
//! logged and skipped; it never aborts the run.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::intent::{Intent, IntentAnalysis, IntentDetector};
use crate::patterns::{Improvement, Mode, PatternContext, PatternLibrary, PatternStatistics};
use crate::quality::{QualityAssessor, QualityScore};

/// Overall score at or above which a closed, well-formed prompt needs no deep pass
pub const SKIP_DEEP_THRESHOLD: u8 = 90;
/// Overall score below which deep mode is always suggested
pub const LOW_QUALITY_THRESHOLD: u8 = 65;
/// Overall score below which an open-ended prompt gets deep mode
pub const OPEN_ENDED_THRESHOLD: u8 = 80;
/// Overall score below which the prompt should be rephrased
pub const REPHRASE_THRESHOLD: u8 = 50;

/// A pattern that changed the text during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPattern {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Everything a single `optimize` call produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// The caller's text, verbatim
    pub original: String,
    /// `original` followed by every appended section
    pub enhanced: String,
    pub mode: Mode,
    pub intent: IntentAnalysis,
    pub quality: QualityScore,
    /// One entry per applied pattern, in application order
    pub improvements: Vec<Improvement>,
    pub applied_patterns: Vec<AppliedPattern>,
    pub processing_time_ms: u64,
}

/// The pipeline orchestrator
///
/// Construct one and share it by reference; it holds no per-call state and
/// is safe to use from several threads at once.
pub struct PromptOptimizer {
    detector: IntentDetector,
    library: PatternLibrary,
    assessor: QualityAssessor,
}

impl PromptOptimizer {
    /// Orchestrator over the built-in pattern set
    pub fn new() -> Self {
        Self::with_library(PatternLibrary::new())
    }

    pub fn with_library(library: PatternLibrary) -> Self {
        Self {
            detector: IntentDetector::new(),
            library,
            assessor: QualityAssessor::new(),
        }
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    pub fn statistics(&self) -> PatternStatistics {
        self.library.statistics()
    }

    /// Run the full pipeline over `text`
    pub fn optimize(&self, text: &str, mode: Mode) -> OptimizationResult {
        let start = Instant::now();

        let intent = self.detector.analyze(text);
        let ctx = PatternContext {
            mode,
            original_prompt: text,
            intent: &intent,
        };
        let patterns = self.library.select_for(&ctx);
        debug!(
            "intent {} ({}%), {} pattern(s) selected for {} mode",
            intent.primary_intent,
            intent.confidence,
            patterns.len(),
            mode
        );

        let mut current = text.to_string();
        let mut improvements = Vec::new();
        let mut applied_patterns = Vec::new();

        for pattern in patterns {
            let result = match pattern.apply(&current, &ctx) {
                Ok(result) => result,
                Err(e) => {
                    debug!("pattern {} failed: {}", pattern.id(), e);
                    continue;
                }
            };
            if !result.applied {
                trace!("pattern {} skipped: {}", pattern.id(), result.improvement.description);
                continue;
            }

            debug_assert!(
                result.enhanced_prompt.starts_with(current.as_str()),
                "pattern {} rewrote its input",
                pattern.id()
            );
            current = result.enhanced_prompt;
            improvements.push(result.improvement);
            applied_patterns.push(AppliedPattern {
                id: pattern.id().to_string(),
                name: pattern.name().to_string(),
                description: pattern.description().to_string(),
            });
        }

        let quality = self.assessor.assess(text, &current, &intent);
        let processing_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(
            "applied {} pattern(s), overall quality {} in {}ms",
            applied_patterns.len(),
            quality.overall,
            processing_time_ms
        );

        OptimizationResult {
            original: text.to_string(),
            enhanced: current,
            mode,
            intent,
            quality,
            improvements,
            applied_patterns,
            processing_time_ms,
        }
    }

    /// Whether a deeper pass is likely to pay off
    ///
    /// Rules are evaluated in order; the first that matches decides.
    pub fn should_recommend_deep_mode(&self, result: &OptimizationResult) -> bool {
        let chars = &result.intent.characteristics;
        let overall = result.quality.overall;

        if result.intent.primary_intent == Intent::Planning && chars.is_open_ended && chars.needs_structure {
            return true;
        }
        if !chars.is_open_ended && !chars.needs_structure && overall >= SKIP_DEEP_THRESHOLD {
            return false;
        }
        if overall < LOW_QUALITY_THRESHOLD {
            return true;
        }
        if chars.is_open_ended && overall < OPEN_ENDED_THRESHOLD {
            return true;
        }
        result.intent.primary_intent == Intent::PrdGeneration && result.mode == Mode::Fast
    }

    /// A short follow-up suggestion, if any
    pub fn recommendation(&self, result: &OptimizationResult) -> Option<String> {
        if result.mode == Mode::Fast && self.should_recommend_deep_mode(result) {
            return Some(format!(
                "Run again in deep mode for a more thorough {} prompt (overall quality {}/100)",
                result.intent.primary_intent, result.quality.overall
            ));
        }
        if result.quality.overall < REPHRASE_THRESHOLD {
            let weakest = result.quality.weakest();
            return Some(format!(
                "Quality is low ({}/100); rephrase the request to improve {} first",
                result.quality.overall, weakest
            ));
        }
        None
    }
}

impl Default for PromptOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Characteristics;
    use crate::patterns::{Pattern, PatternDescriptor, PatternResult, PatternScope};
    use crate::utils::{Error, Result};
    use pretty_assertions::assert_eq;

    struct AlwaysFails;

    static ALWAYS_FAILS: PatternDescriptor = PatternDescriptor {
        id: "always-fails",
        name: "Always Fails",
        description: "Errors on every input",
        intents: &Intent::ALL,
        scope: PatternScope::Both,
        priority: 100,
    };

    impl Pattern for AlwaysFails {
        fn descriptor(&self) -> &'static PatternDescriptor {
            &ALWAYS_FAILS
        }

        fn apply(&self, _text: &str, _ctx: &PatternContext<'_>) -> Result<PatternResult> {
            Err(Error::pattern(self.id(), "boom"))
        }
    }

    fn ids(result: &OptimizationResult) -> Vec<&str> {
        result.applied_patterns.iter().map(|p| p.id.as_str()).collect()
    }

    fn synthetic(intent: Intent, chars: Characteristics, overall: u8, mode: Mode) -> OptimizationResult {
        OptimizationResult {
            original: String::new(),
            enhanced: String::new(),
            mode,
            intent: IntentAnalysis::new(intent, 80, chars),
            quality: QualityScore {
                clarity: overall,
                efficiency: overall,
                structure: overall,
                completeness: overall,
                actionability: overall,
                specificity: overall,
                overall,
            },
            improvements: Vec::new(),
            applied_patterns: Vec::new(),
            processing_time_ms: 0,
        }
    }

    fn open_structured() -> Characteristics {
        Characteristics {
            is_open_ended: true,
            needs_structure: true,
            ..Characteristics::default()
        }
    }

    #[test]
    fn test_login_page_scenario() {
        let optimizer = PromptOptimizer::new();
        let result = optimizer.optimize("Create a login page", Mode::Fast);
        assert_eq!(result.intent.primary_intent, Intent::CodeGeneration);
        assert_eq!(result.original, "Create a login page");
        assert!(result.enhanced.starts_with("Create a login page"));
        assert!(result.quality.overall <= 100);
        assert_eq!(result.improvements.len(), result.applied_patterns.len());
    }

    #[test]
    fn test_enhanced_extends_original_in_every_mode() {
        let optimizer = PromptOptimizer::new();
        for prompt in [
            "Fix the crash in `parse_config` when the file is empty",
            "Write a PRD for a subscription billing product",
            "Explain how async works in Rust",
        ] {
            for mode in [Mode::Fast, Mode::Deep] {
                let result = optimizer.optimize(prompt, mode);
                assert_eq!(result.original, prompt);
                if result.applied_patterns.is_empty() {
                    assert_eq!(result.enhanced, prompt);
                } else {
                    assert!(result.enhanced.starts_with(prompt));
                    assert!(result.enhanced.len() > prompt.len());
                }
            }
        }
    }

    #[test]
    fn test_prd_prompts_run_the_prd_patterns() {
        let optimizer = PromptOptimizer::new();
        for prompt in [
            "Write a PRD for a subscription billing product",
            "Create a PRD for a task management app",
            "Generate product requirements for a mobile app",
        ] {
            let fast = optimizer.optimize(prompt, Mode::Fast);
            assert_eq!(fast.intent.primary_intent, Intent::PrdGeneration, "prompt: {prompt}");
            assert!(!ids(&fast).contains(&"prd-structure-enforcer"));

            let deep = optimizer.optimize(prompt, Mode::Deep);
            assert_eq!(deep.intent.primary_intent, Intent::PrdGeneration, "prompt: {prompt}");
            assert!(ids(&deep).contains(&"prd-structure-enforcer"), "prompt: {prompt}");
            assert!(deep.enhanced.contains("## PRD Structure"));
        }
    }

    #[test]
    fn test_debugging_checklist_not_masked_by_earlier_sections() {
        let optimizer = PromptOptimizer::new();
        let result = optimizer.optimize("Fix the crash in the parser", Mode::Fast);
        assert_eq!(result.intent.primary_intent, Intent::Debugging);
        assert!(ids(&result).contains(&"debugging-context-collector"));
        assert!(result.enhanced.contains("- Expected behavior"));
        assert!(result.enhanced.contains("- Actual behavior"));
        assert!(result.enhanced.contains("- Steps to reproduce"));
    }

    #[test]
    fn test_applied_patterns_follow_priority_order() {
        let optimizer = PromptOptimizer::new();
        let result = optimizer.optimize("Build a REST API for orders", Mode::Deep);
        let priorities: Vec<i32> = result
            .applied_patterns
            .iter()
            .filter_map(|p| optimizer.library().get(&p.id))
            .map(|p| p.priority())
            .collect();
        assert_eq!(priorities.len(), result.applied_patterns.len());
        assert!(priorities.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_failing_pattern_is_isolated() {
        let plain = PromptOptimizer::new();
        let mut library = PatternLibrary::new();
        assert!(library.register(Box::new(AlwaysFails)).is_ok());
        let with_failure = PromptOptimizer::with_library(library);

        let prompt = "Create a login page";
        let expected = plain.optimize(prompt, Mode::Deep);
        let result = with_failure.optimize(prompt, Mode::Deep);
        assert_eq!(result.enhanced, expected.enhanced);
        assert_eq!(ids(&result), ids(&expected));
        assert!(!ids(&result).contains(&"always-fails"));
        assert!(!result.applied_patterns.is_empty());
    }

    #[test]
    fn test_only_failures_leave_text_untouched() {
        let mut library = PatternLibrary::empty();
        assert!(library.register(Box::new(AlwaysFails)).is_ok());
        let optimizer = PromptOptimizer::with_library(library);
        let result = optimizer.optimize("Create a login page", Mode::Fast);
        assert_eq!(result.enhanced, "Create a login page");
        assert!(result.applied_patterns.is_empty());
        assert!(result.improvements.is_empty());
    }

    #[test]
    fn test_empty_library_and_empty_prompt() {
        let optimizer = PromptOptimizer::with_library(PatternLibrary::empty());
        let result = optimizer.optimize("", Mode::Deep);
        assert_eq!(result.enhanced, "");
        assert_eq!(result.intent.primary_intent, Intent::CodeGeneration);
        assert_eq!(result.quality.overall, 0);
    }

    #[test]
    fn test_optimize_is_deterministic() {
        let optimizer = PromptOptimizer::new();
        let prompt = "Plan the architecture for a realtime chat app with payments and a dashboard";
        let a = optimizer.optimize(prompt, Mode::Deep);
        let b = optimizer.optimize(prompt, Mode::Deep);
        assert_eq!(a.enhanced, b.enhanced);
        assert_eq!(a.intent, b.intent);
        assert_eq!(a.quality, b.quality);
        assert_eq!(a.improvements, b.improvements);
    }

    #[test]
    fn test_concurrent_runs_do_not_mix() {
        let optimizer = PromptOptimizer::new();
        let first = "Fix the crash in `parse_config` when the file is empty";
        let second = "Write a PRD for a subscription billing product";
        let solo_first = optimizer.optimize(first, Mode::Deep);
        let solo_second = optimizer.optimize(second, Mode::Deep);

        let (a, b) = std::thread::scope(|s| {
            let ha = s.spawn(|| optimizer.optimize(first, Mode::Deep));
            let hb = s.spawn(|| optimizer.optimize(second, Mode::Deep));
            (ha.join(), hb.join())
        });
        let a = a.unwrap_or_else(|_| panic!("first run panicked"));
        let b = b.unwrap_or_else(|_| panic!("second run panicked"));
        assert_eq!(a.enhanced, solo_first.enhanced);
        assert_eq!(b.enhanced, solo_second.enhanced);
        assert!(a.enhanced.starts_with(first));
        assert!(b.enhanced.starts_with(second));
    }

    #[test]
    fn test_deep_mode_anchors() {
        let optimizer = PromptOptimizer::new();
        let planning = synthetic(Intent::Planning, open_structured(), 95, Mode::Fast);
        assert!(optimizer.should_recommend_deep_mode(&planning));

        let polished = synthetic(Intent::CodeGeneration, Characteristics::default(), 90, Mode::Fast);
        assert!(!optimizer.should_recommend_deep_mode(&polished));
    }

    #[test]
    fn test_deep_mode_thresholds() {
        let optimizer = PromptOptimizer::new();
        let closed = Characteristics::default();
        let open = Characteristics {
            is_open_ended: true,
            ..Characteristics::default()
        };

        assert!(optimizer.should_recommend_deep_mode(&synthetic(Intent::CodeGeneration, closed, 64, Mode::Fast)));
        assert!(!optimizer.should_recommend_deep_mode(&synthetic(Intent::CodeGeneration, closed, 65, Mode::Fast)));
        assert!(optimizer.should_recommend_deep_mode(&synthetic(Intent::Learning, open, 79, Mode::Fast)));
        assert!(!optimizer.should_recommend_deep_mode(&synthetic(Intent::Learning, open, 80, Mode::Fast)));
        assert!(optimizer.should_recommend_deep_mode(&synthetic(Intent::PrdGeneration, closed, 85, Mode::Fast)));
        assert!(!optimizer.should_recommend_deep_mode(&synthetic(Intent::PrdGeneration, closed, 85, Mode::Deep)));
        assert!(!optimizer.should_recommend_deep_mode(&synthetic(Intent::PrdGeneration, closed, 92, Mode::Fast)));
    }

    #[test]
    fn test_recommendation_messages() {
        let optimizer = PromptOptimizer::new();

        let escalate = synthetic(Intent::Planning, open_structured(), 70, Mode::Fast);
        let message = optimizer.recommendation(&escalate);
        assert!(message.is_some_and(|m| m.contains("deep mode")));

        let weak_deep = synthetic(Intent::CodeGeneration, Characteristics::default(), 40, Mode::Deep);
        let message = optimizer.recommendation(&weak_deep);
        assert!(message.is_some_and(|m| m.starts_with("Quality is low (40/100)")));

        let fine = synthetic(Intent::CodeGeneration, Characteristics::default(), 92, Mode::Fast);
        assert_eq!(optimizer.recommendation(&fine), None);

        let fine_deep = synthetic(Intent::Planning, open_structured(), 70, Mode::Deep);
        assert_eq!(optimizer.recommendation(&fine_deep), None);
    }

    #[test]
    fn test_statistics_passthrough() {
        let optimizer = PromptOptimizer::new();
        assert_eq!(optimizer.statistics(), optimizer.library().statistics());
        assert_eq!(optimizer.statistics().total, 27);
    }
}
