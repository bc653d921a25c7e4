//! Groq chat-completions client
//!
//! Speaks the OpenAI-compatible `/chat/completions` protocol, so any server
//! exposing that endpoint works with `CONTRACTIQ_LLM_BASE_URL`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{CompletionOracle, CompletionRequest, OracleConfig, OracleError};

const USER_AGENT: &str = concat!("contractiq/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// HTTP oracle backed by the Groq API
pub struct GroqClient {
    http_client: reqwest::Client,
    config: OracleConfig,
}

impl GroqClient {
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        if config.api_key.trim().is_empty() {
            return Err(OracleError::MissingApiKey);
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| OracleError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Build a client from `GROQ_API_KEY` and friends
    pub fn from_env() -> Result<Self, OracleError> {
        Self::new(OracleConfig::from_env()?)
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }
}

#[async_trait]
impl CompletionOracle for GroqClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: self.config.top_p,
            stream: false,
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_chars = request.prompt.len(),
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    OracleError::Network(e.to_string())
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(OracleError::Unauthorized);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OracleError::Api(status.as_u16(), error_text));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        extract_content(chat)
    }

    fn name(&self) -> &str {
        "groq"
    }
}

fn extract_content(chat: ChatResponse) -> Result<String, OracleError> {
    chat.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| OracleError::MalformedResponse("no choices[0].message.content".to_string()))
}
