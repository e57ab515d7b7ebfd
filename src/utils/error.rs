//! Error handling for Promptsmith

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ==================== Pattern Errors ====================

    #[error("Pattern {id} failed: {reason}")]
    PatternFailed { id: String, reason: String },

    #[error("Duplicate pattern id: {0}")]
    DuplicatePattern(String),

    // ==================== Input Errors ====================

    #[error("Invalid mode: {0} (expected 'fast' or 'deep')")]
    InvalidMode(String),

    #[error("Unknown intent: {0}")]
    InvalidIntent(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Build a pattern failure for the given pattern id
    pub fn pattern(id: &str, reason: impl Into<String>) -> Self {
        Self::PatternFailed {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Id of the pattern that produced this error, if any
    pub fn pattern_id(&self) -> Option<&str> {
        match self {
            Self::PatternFailed { id, .. } => Some(id),
            Self::DuplicatePattern(id) => Some(id),
            Self::InvalidMode(_) | Self::InvalidIntent(_) | Self::Io(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
