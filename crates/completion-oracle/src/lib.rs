//! Completion Oracle - the external text-completion service behind a narrow interface
//!
//! This crate provides:
//! - The `CompletionOracle` trait every pipeline stage talks to
//! - `GroqClient`, an OpenAI-compatible chat-completions client
//! - Deterministic stubs for tests and offline runs
//!
//! Transport problems are `OracleError`s. Whether a response *means* something
//! (e.g. a rejection sentinel) is decided by the caller, never here.

pub mod config;
pub mod groq;
pub mod stub;

use async_trait::async_trait;
use thiserror::Error;

pub use config::OracleConfig;
pub use groq::GroqClient;

/// Errors raised while talking to the oracle
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OracleError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Oracle call timed out after {0}ms")]
    Timeout(u64),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Oracle rejected credentials")]
    Unauthorized,

    #[error("GROQ_API_KEY is not set")]
    MissingApiKey,
}

/// A single completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            temperature: 0.0,
            max_tokens: 8192,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Text-completion oracle: `complete(system, prompt, temperature, max_tokens) -> text`
#[async_trait]
pub trait CompletionOracle: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError>;

    /// Short identifier used in logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: CompletionOracle + ?Sized> CompletionOracle for std::sync::Arc<T> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        (**self).complete(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = CompletionRequest::new("sys", "user")
            .with_temperature(0.2)
            .with_max_tokens(512);
        assert_eq!(req.system, "sys");
        assert_eq!(req.prompt, "user");
        assert_eq!(req.temperature, 0.2);
        assert_eq!(req.max_tokens, 512);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            OracleError::Timeout(1500).to_string(),
            "Oracle call timed out after 1500ms"
        );
        assert_eq!(
            OracleError::Api(503, "busy".into()).to_string(),
            "API error 503: busy"
        );
    }
}
