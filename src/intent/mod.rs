//! Intent Layer: what a prompt is trying to accomplish
//!
//! The intent layer classifies a raw prompt into one of a closed set of
//! intents and records a few structural characteristics. Everything
//! downstream (pattern selection, completeness scoring, escalation) reads
//! the resulting [`IntentAnalysis`] and never recomputes it.

pub mod detector;

pub use detector::IntentDetector;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::Error;

/// Categories of prompt intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    /// Write new code or features
    CodeGeneration,
    /// Design, architecture, roadmaps
    Planning,
    /// Improve existing code or text
    Refinement,
    /// Diagnose and fix a defect
    Debugging,
    /// Write or update documentation
    Documentation,
    /// Produce a product requirements document
    PrdGeneration,
    /// Write or extend tests
    Testing,
    /// Move between versions, frameworks or platforms
    Migration,
    /// Audit for vulnerabilities
    SecurityReview,
    /// Understand a concept or codebase
    Learning,
    /// Condense material
    Summarization,
}

impl Intent {
    /// Every intent, in declaration order
    pub const ALL: [Intent; 11] = [
        Intent::CodeGeneration,
        Intent::Planning,
        Intent::Refinement,
        Intent::Debugging,
        Intent::Documentation,
        Intent::PrdGeneration,
        Intent::Testing,
        Intent::Migration,
        Intent::SecurityReview,
        Intent::Learning,
        Intent::Summarization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::CodeGeneration => "code-generation",
            Intent::Planning => "planning",
            Intent::Refinement => "refinement",
            Intent::Debugging => "debugging",
            Intent::Documentation => "documentation",
            Intent::PrdGeneration => "prd-generation",
            Intent::Testing => "testing",
            Intent::Migration => "migration",
            Intent::SecurityReview => "security-review",
            Intent::Learning => "learning",
            Intent::Summarization => "summarization",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Intent::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == wanted)
            .ok_or(Error::InvalidIntent(s.to_string()))
    }
}

/// Structural characteristics of a prompt, independent of its intent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristics {
    /// Code fences, inline code, identifiers or file names are present
    pub has_code_context: bool,
    /// Technology vocabulary is present
    pub has_technical_terms: bool,
    /// Open phrasing or no concrete constraints
    pub is_open_ended: bool,
    /// Long or heterogeneous text without headings or lists
    pub needs_structure: bool,
}

/// Result of intent detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub primary_intent: Intent,

    /// Coarse confidence (0 - 100); compare against bands only
    pub confidence: u8,

    pub characteristics: Characteristics,

    /// Runner-up intent, when one scored at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_intent: Option<Intent>,
}

impl IntentAnalysis {
    pub fn new(primary_intent: Intent, confidence: u8, characteristics: Characteristics) -> Self {
        Self {
            primary_intent,
            confidence: confidence.min(100),
            characteristics,
            secondary_intent: None,
        }
    }

    /// Coarse confidence band
    pub fn confidence_band(&self) -> ConfidenceBand {
        match self.confidence {
            0..=39 => ConfidenceBand::Low,
            40..=69 => ConfidenceBand::Medium,
            _ => ConfidenceBand::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}
