//! Promptsmith
//!
//! Deterministic prompt optimization for AI coding assistants. A prompt is
//! classified into an [`Intent`], a priority-ordered set of [`patterns`]
//! appends the sections it is missing, and the result is scored across
//! several quality dimensions.
//!
//! ```no_run
//! use promptsmith::{Mode, PromptOptimizer};
//!
//! let optimizer = PromptOptimizer::new();
//! let result = optimizer.optimize("Create a login page", Mode::Fast);
//! assert!(result.enhanced.starts_with("Create a login page"));
//! ```

pub mod intent;
pub mod optimizer;
pub mod patterns;
pub mod quality;
pub mod report;
pub mod utils;

pub use intent::{Intent, IntentAnalysis, IntentDetector};
pub use optimizer::{OptimizationResult, PromptOptimizer};
pub use patterns::{Mode, Pattern, PatternLibrary};
pub use quality::{QualityAssessor, QualityScore};
pub use report::OptimizationReport;
pub use utils::{Error, Result};
