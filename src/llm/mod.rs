//! Generative-text collaborator
//!
//! The report pipeline only depends on [`TextGenerator`]; [`LlmClient`] is the
//! production implementation against an OpenAI-compatible chat endpoint.

pub mod client;

pub use client::LlmClient;

use crate::error::AnalyzerError;
use async_trait::async_trait;

/// Single-shot text generation
///
/// One attempt per call; retries are the caller's business.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier recorded in report metadata
    fn model_name(&self) -> &str;
}

/// Generative-text errors
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("No API key configured for the generative-text service")]
    MissingApiKey,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<LlmError> for AnalyzerError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingApiKey => AnalyzerError::Configuration(err.to_string()),
            other => AnalyzerError::Upstream(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            AnalyzerError::from(LlmError::MissingApiKey),
            AnalyzerError::Configuration(_)
        ));
        assert!(matches!(
            AnalyzerError::from(LlmError::Timeout("45s".into())),
            AnalyzerError::Upstream(_)
        ));
    }
}
