//! Pattern registry and selection

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{builtin_patterns, Mode, Pattern, PatternContext, PatternScope};
use crate::intent::{Intent, IntentAnalysis};
use crate::utils::{Error, Result};

/// Owns the registered patterns and decides which ones run
pub struct PatternLibrary {
    patterns: Vec<Box<dyn Pattern>>,
}

impl PatternLibrary {
    /// Library preloaded with every built-in pattern
    pub fn new() -> Self {
        let mut library = Self::empty();
        for pattern in builtin_patterns() {
            if let Err(e) = library.register(pattern) {
                log::warn!("skipping built-in pattern: {}", e);
            }
        }
        library
    }

    pub fn empty() -> Self {
        Self { patterns: Vec::new() }
    }

    /// Library holding exactly `patterns`, in order; fails on the first duplicate id
    pub fn from_patterns<I>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = Box<dyn Pattern>>,
    {
        let mut library = Self::empty();
        for pattern in patterns {
            library.register(pattern)?;
        }
        Ok(library)
    }

    /// Register a pattern; ids must be unique
    pub fn register(&mut self, pattern: Box<dyn Pattern>) -> Result<()> {
        if self.get(pattern.id()).is_some() {
            return Err(Error::DuplicatePattern(pattern.id().to_string()));
        }
        log::trace!("registered pattern {}", pattern.id());
        self.patterns.push(pattern);
        Ok(())
    }

    /// Patterns eligible for this intent and mode, highest priority first
    ///
    /// Selection only consults static descriptor data and intent
    /// characteristics, never the prompt text.
    pub fn select_patterns(&self, intent: &IntentAnalysis, mode: Mode) -> Vec<&dyn Pattern> {
        let ctx = PatternContext {
            mode,
            original_prompt: "",
            intent,
        };
        self.select_for(&ctx)
    }

    pub fn select_for(&self, ctx: &PatternContext<'_>) -> Vec<&dyn Pattern> {
        let mut selected: Vec<&dyn Pattern> = self
            .patterns
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| p.scope().includes(ctx.mode))
            .filter(|p| p.applicable_intents().contains(&ctx.intent.primary_intent))
            .filter(|p| p.is_applicable(ctx))
            .collect();
        // Stable: equal priorities keep registration order
        selected.sort_by(|a, b| b.priority().cmp(&a.priority()));
        selected
    }

    pub fn get(&self, id: &str) -> Option<&dyn Pattern> {
        self.patterns.iter().find(|p| p.id() == id).map(|p| p.as_ref())
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Patterns that may run in `mode`, in registration order
    pub fn patterns_by_scope(&self, mode: Mode) -> Vec<&dyn Pattern> {
        self.patterns
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| p.scope().includes(mode))
            .collect()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &dyn Pattern> {
        self.patterns.iter().map(|p| p.as_ref())
    }

    pub fn statistics(&self) -> PatternStatistics {
        let mut stats = PatternStatistics {
            total: self.patterns.len(),
            ..PatternStatistics::default()
        };
        for pattern in &self.patterns {
            match pattern.scope() {
                PatternScope::Fast => stats.fast_only += 1,
                PatternScope::Deep => stats.deep_only += 1,
                PatternScope::Both => stats.both += 1,
            }
            for intent in pattern.applicable_intents() {
                *stats.by_intent.entry(*intent).or_insert(0) += 1;
            }
        }
        stats.fast = stats.fast_only + stats.both;
        stats.deep = stats.deep_only + stats.both;
        stats
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry counts, by scope and by intent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternStatistics {
    pub total: usize,
    /// Patterns that may run in fast mode
    pub fast: usize,
    /// Patterns that may run in deep mode
    pub deep: usize,
    pub fast_only: usize,
    pub deep_only: usize,
    pub both: usize,
    pub by_intent: BTreeMap<Intent, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Characteristics;
    use crate::patterns::test_support::*;
    use crate::patterns::{PatternDescriptor, PatternResult};
    use crate::quality::Dimension;
    use pretty_assertions::assert_eq;

    struct Dummy;

    static DUMMY: PatternDescriptor = PatternDescriptor {
        id: "objective-clarifier",
        name: "Dummy",
        description: "Collides with a built-in id",
        intents: &[Intent::CodeGeneration],
        scope: PatternScope::Both,
        priority: 0,
    };

    impl Pattern for Dummy {
        fn descriptor(&self) -> &'static PatternDescriptor {
            &DUMMY
        }

        fn apply(&self, text: &str, _ctx: &PatternContext<'_>) -> Result<PatternResult> {
            Ok(PatternResult::unchanged(text, Dimension::Clarity, "noop"))
        }
    }

    fn ids(patterns: &[&dyn Pattern]) -> Vec<&'static str> {
        patterns.iter().map(|p| p.id()).collect()
    }

    #[test]
    fn test_new_loads_builtins() {
        let library = PatternLibrary::new();
        assert_eq!(library.pattern_count(), 27);
        assert!(library.get("validation-checklist").is_some());
        assert!(library.get("no-such-pattern").is_none());
        assert_eq!(PatternLibrary::empty().pattern_count(), 0);
    }

    #[test]
    fn test_builtins_pass_through_register() {
        let library = PatternLibrary::from_patterns(builtin_patterns());
        assert_eq!(library.map(|l| l.pattern_count()).ok(), Some(27));

        let mut with_clash = builtin_patterns();
        with_clash.push(Box::new(Dummy));
        let err = PatternLibrary::from_patterns(with_clash).err();
        assert_eq!(err, Some(Error::DuplicatePattern("objective-clarifier".to_string())));

        let mut library = PatternLibrary::new();
        for pattern in builtin_patterns() {
            let id = pattern.id().to_string();
            assert_eq!(library.register(pattern), Err(Error::DuplicatePattern(id)));
        }
        assert_eq!(library.pattern_count(), 27);
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut library = PatternLibrary::new();
        let err = library.register(Box::new(Dummy));
        assert_eq!(err, Err(Error::DuplicatePattern("objective-clarifier".to_string())));
        assert_eq!(library.pattern_count(), 27);

        let mut empty = PatternLibrary::empty();
        assert!(empty.register(Box::new(Dummy)).is_ok());
        assert_eq!(empty.pattern_count(), 1);
    }

    #[test]
    fn test_selection_is_ordered_and_idempotent() {
        let library = PatternLibrary::new();
        for intent in Intent::ALL {
            let analysis = analysis(intent);
            for mode in [Mode::Fast, Mode::Deep] {
                let first = library.select_patterns(&analysis, mode);
                let second = library.select_patterns(&analysis, mode);
                assert_eq!(ids(&first), ids(&second));
                for pair in first.windows(2) {
                    assert!(pair[0].priority() >= pair[1].priority());
                }
                for pattern in &first {
                    assert!(pattern.scope().includes(mode));
                    assert!(pattern.applicable_intents().contains(&intent));
                }
            }
        }
    }

    #[test]
    fn test_prd_fast_mode_excludes_deep_patterns() {
        let library = PatternLibrary::new();
        let analysis = analysis(Intent::PrdGeneration);
        let fast = ids(&library.select_patterns(&analysis, Mode::Fast));
        let deep = ids(&library.select_patterns(&analysis, Mode::Deep));
        assert!(!fast.contains(&"prd-structure-enforcer"));
        assert_eq!(deep.first(), Some(&"prd-structure-enforcer"));
    }

    #[test]
    fn test_fast_only_pattern_is_skipped_in_deep_mode() {
        let library = PatternLibrary::new();
        let analysis = analysis(Intent::CodeGeneration);
        assert!(ids(&library.select_patterns(&analysis, Mode::Fast)).contains(&"success-criteria-enforcer"));
        assert!(!ids(&library.select_patterns(&analysis, Mode::Deep)).contains(&"success-criteria-enforcer"));
    }

    #[test]
    fn test_characteristics_gate_selection() {
        let library = PatternLibrary::new();
        let closed = analysis(Intent::CodeGeneration);
        let open = analysis_with(
            Intent::CodeGeneration,
            Characteristics {
                is_open_ended: true,
                needs_structure: true,
                ..Characteristics::default()
            },
        );
        let closed_ids = ids(&library.select_patterns(&closed, Mode::Deep));
        let open_ids = ids(&library.select_patterns(&open, Mode::Deep));
        for gated in ["scope-definer", "step-decomposer", "alternative-approaches"] {
            assert!(!closed_ids.contains(&gated), "{gated}");
            assert!(open_ids.contains(&gated), "{gated}");
        }
    }

    #[test]
    fn test_statistics_agree_with_scopes() {
        let library = PatternLibrary::new();
        let stats = library.statistics();
        assert_eq!(stats.total, 27);
        assert_eq!(stats.fast, library.patterns_by_scope(Mode::Fast).len());
        assert_eq!(stats.deep, library.patterns_by_scope(Mode::Deep).len());
        assert_eq!(stats.fast_only + stats.deep_only + stats.both, stats.total);
        assert_eq!(stats.by_intent.get(&Intent::Summarization), Some(&5));
    }
}
