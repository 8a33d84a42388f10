//! Anthropic Messages API adapter.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    build_http_client, require_user_message, ChatMessage, GenerationBackend, LlmError, MAX_TOKENS,
    TEMPERATURE,
};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const CLAUDE_MODEL: &str = "claude-3-opus-20240229";

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

impl AnthropicResponse {
    /// Extracts the text of the first text block.
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Backend adapter for Anthropic's Messages API.
pub struct ClaudeBackend {
    client: Client,
    api_key: String,
    model: String,
}

impl ClaudeBackend {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, CLAUDE_MODEL)
    }

    pub fn with_model(api_key: String, model: impl Into<String>) -> Self {
        ClaudeBackend {
            client: build_http_client(),
            api_key,
            model: model.into(),
        }
    }
}

#[async_trait]
impl GenerationBackend for ClaudeBackend {
    fn name(&self) -> &'static str {
        "claude"
    }

    /// Makes exactly one call to the Messages API. Any transport or provider
    /// failure is returned to the caller unretried.
    async fn generate(
        &self,
        system_prompt: &str,
        conversation: &[ChatMessage],
    ) -> Result<String, LlmError> {
        require_user_message(conversation)?;

        let body = AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system: system_prompt,
            messages: conversation,
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Prefer the provider's own message when the error body parses.
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: AnthropicResponse = response.json().await?;
        let text = parsed.text().ok_or(LlmError::EmptyContent)?;

        debug!(model = %self.model, chars = text.len(), "claude completion received");
        Ok(text.to_string())
    }
}
