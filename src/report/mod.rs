//! Structured Report Module
//!
//! Machine-readable output of an optimization run:
//! - JSON report with quality scores and applied patterns
//! - Plain-text summary for terminals
//! - Run statistics

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::intent::Intent;
use crate::optimizer::{AppliedPattern, OptimizationResult, PromptOptimizer};
use crate::patterns::{Improvement, Mode};
use crate::quality::{Grade, QualityScore};
use crate::utils::text;

// ==================== Optimization Report ====================

/// A complete report of one optimization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// Detected intent
    pub intent: Intent,

    /// Detection confidence (0 - 100)
    pub confidence: u8,

    pub mode: Mode,

    /// Scores of the enhanced prompt
    pub quality: QualityScore,

    pub grade: Grade,

    /// Patterns that changed the text, in order
    pub applied_patterns: Vec<AppliedPattern>,

    pub improvements: Vec<Improvement>,

    /// Whether a deep pass is suggested
    pub deep_mode_recommended: bool,

    /// Follow-up suggestion, if any
    pub recommendation: Option<String>,

    pub stats: RunStats,

    /// The enhanced prompt
    pub enhanced: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Wall time of the run
    pub processing_time_ms: u64,

    pub patterns_applied: usize,

    /// Word count before enhancement
    pub original_words: usize,

    /// Word count after enhancement
    pub enhanced_words: usize,
}

impl OptimizationReport {
    /// Build a report, consulting the optimizer for its recommendations
    pub fn from_result(result: &OptimizationResult, optimizer: &PromptOptimizer) -> Self {
        Self {
            intent: result.intent.primary_intent,
            confidence: result.intent.confidence,
            mode: result.mode,
            quality: result.quality,
            grade: result.quality.grade(),
            applied_patterns: result.applied_patterns.clone(),
            improvements: result.improvements.clone(),
            deep_mode_recommended: optimizer.should_recommend_deep_mode(result),
            recommendation: optimizer.recommendation(result),
            stats: RunStats {
                processing_time_ms: result.processing_time_ms,
                patterns_applied: result.applied_patterns.len(),
                original_words: text::word_count(&result.original),
                enhanced_words: text::word_count(&result.enhanced),
            },
            enhanced: result.enhanced.clone(),
        }
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Output as compact JSON (single line)
    pub fn to_json_compact(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Human-readable summary followed by the enhanced prompt
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let q = &self.quality;

        let _ = writeln!(out, "Intent:  {} ({}% confidence)", self.intent, self.confidence);
        let _ = writeln!(out, "Mode:    {}", self.mode);
        let _ = writeln!(out, "Quality: {}/100 ({})", q.overall, self.grade);
        let _ = writeln!(
            out,
            "  clarity {} | efficiency {} | structure {} | completeness {} | actionability {} | specificity {}",
            q.clarity, q.efficiency, q.structure, q.completeness, q.actionability, q.specificity
        );

        if self.applied_patterns.is_empty() {
            let _ = writeln!(out, "Patterns: none applied");
        } else {
            let _ = writeln!(out, "Patterns ({}):", self.applied_patterns.len());
            for (pattern, improvement) in self.applied_patterns.iter().zip(&self.improvements) {
                let _ = writeln!(out, "  [✓] {}: {}", pattern.name, improvement.description);
            }
        }

        let _ = writeln!(
            out,
            "Words:   {} -> {} in {}ms",
            self.stats.original_words, self.stats.enhanced_words, self.stats.processing_time_ms
        );
        if let Some(recommendation) = &self.recommendation {
            let _ = writeln!(out, "Tip:     {}", recommendation);
        }

        let _ = writeln!(out, "\n{}", self.enhanced);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report(prompt: &str, mode: Mode) -> OptimizationReport {
        let optimizer = PromptOptimizer::new();
        let result = optimizer.optimize(prompt, mode);
        OptimizationReport::from_result(&result, &optimizer)
    }

    #[test]
    fn test_report_mirrors_result() {
        let optimizer = PromptOptimizer::new();
        let result = optimizer.optimize("Create a login page", Mode::Fast);
        let report = OptimizationReport::from_result(&result, &optimizer);

        assert_eq!(report.intent, result.intent.primary_intent);
        assert_eq!(report.quality, result.quality);
        assert_eq!(report.grade, result.quality.grade());
        assert_eq!(report.stats.patterns_applied, result.applied_patterns.len());
        assert_eq!(report.stats.original_words, 4);
        assert!(report.stats.enhanced_words >= report.stats.original_words);
        assert_eq!(report.deep_mode_recommended, optimizer.should_recommend_deep_mode(&result));
        assert_eq!(report.recommendation, optimizer.recommendation(&result));
        assert_eq!(report.enhanced, result.enhanced);
    }

    #[test]
    fn test_json_uses_wire_names() {
        let report = report("Write a PRD with user stories for a subscription billing product", Mode::Deep);
        let value: serde_json::Value = match serde_json::from_str(&report.to_json()) {
            Ok(v) => v,
            Err(e) => panic!("invalid json: {}", e),
        };
        assert_eq!(value["intent"], "prd-generation");
        assert_eq!(value["mode"], "deep");
        assert!(value["quality"]["overall"].is_u64());
        assert!(value["applied_patterns"].is_array());
        assert!(value["stats"]["processing_time_ms"].is_u64());
    }

    #[test]
    fn test_compact_json_is_single_line() {
        let report = report("Fix the crash", Mode::Fast);
        let compact = report.to_json_compact();
        assert!(!compact.contains('\n'));
        let parsed: std::result::Result<OptimizationReport, _> = serde_json::from_str(&compact);
        assert_eq!(parsed.ok(), Some(report));
    }

    #[test]
    fn test_render_text_lists_patterns_and_prompt() {
        let report = report("Create a login page", Mode::Deep);
        let text = report.render_text();
        assert!(text.starts_with("Intent:  code-generation"));
        assert!(text.contains("Mode:    deep"));
        for pattern in &report.applied_patterns {
            assert!(text.contains(&pattern.name), "{}", pattern.name);
        }
        assert!(text.ends_with(&format!("{}\n", report.enhanced)));
    }
}
