//! Oracle connection settings
//!
//! Loaded from the environment the same way the rest of the workspace is configured.

use std::time::Duration;

use crate::OracleError;

/// Default model served by the Groq endpoint
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

/// Default OpenAI-compatible base URL
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Connection settings for `GroqClient`
#[derive(Debug, Clone, PartialEq)]
pub struct OracleConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub top_p: f32,
}

impl OracleConfig {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            top_p: 0.9,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables
    ///
    /// Expected variables:
    /// - GROQ_API_KEY: API key (required)
    /// - CONTRACTIQ_LLM_MODEL: Model name (default: "llama3-70b-8192")
    /// - CONTRACTIQ_LLM_BASE_URL: OpenAI-compatible base URL
    /// - CONTRACTIQ_LLM_TIMEOUT_SECS: Request timeout in seconds (default: 60)
    pub fn from_env() -> Result<Self, OracleError> {
        let api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(OracleError::MissingApiKey)?;

        let mut config = Self::new(&api_key);

        if let Ok(model) = std::env::var("CONTRACTIQ_LLM_MODEL") {
            config = config.with_model(&model);
        }
        if let Ok(base_url) = std::env::var("CONTRACTIQ_LLM_BASE_URL") {
            config = config.with_base_url(&base_url);
        }
        if let Some(secs) = std::env::var("CONTRACTIQ_LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Full chat-completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OracleConfig::new("key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(
            config.completions_url(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = OracleConfig::new("key").with_base_url("http://localhost:8080/v1/");
        assert_eq!(
            config.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }
}
