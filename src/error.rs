//! Error types for the product analyzer

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Crate-wide error taxonomy
///
/// Malformed model output is not represented here: the report pipeline
/// always degrades to a synthesized report instead of failing.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Missing credential or unusable configuration. Not retryable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The generative-text service failed at the transport or quota level
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Raised by the persistence collaborator and passed through unchanged
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalyzerError {
    /// Whether the failure happened while producing a report (shown to users as "please retry")
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Upstream(_))
    }

    /// Stable machine-readable code for API responses and metrics labels
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}
