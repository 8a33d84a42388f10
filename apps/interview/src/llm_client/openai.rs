//! OpenAI Chat Completions adapter.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{
    build_http_client, require_user_message, ChatMessage, GenerationBackend, LlmError, MAX_TOKENS,
    TEMPERATURE,
};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const GPT_MODEL: &str = "gpt-4o";

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// Backend adapter for OpenAI's Chat Completions API.
///
/// The system instruction travels as a leading `system`-role message; the
/// rest of the conversation is forwarded as-is.
pub struct GptBackend {
    client: Client,
    api_key: String,
    model: String,
}

impl GptBackend {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, GPT_MODEL)
    }

    pub fn with_model(api_key: String, model: impl Into<String>) -> Self {
        GptBackend {
            client: build_http_client(),
            api_key,
            model: model.into(),
        }
    }

    fn build_messages(system_prompt: &str, conversation: &[ChatMessage]) -> Vec<serde_json::Value> {
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(json!({ "role": "system", "content": system_prompt }));
        for msg in conversation {
            messages.push(json!({ "role": msg.role, "content": msg.content }));
        }
        messages
    }
}

#[async_trait]
impl GenerationBackend for GptBackend {
    fn name(&self) -> &'static str {
        "gpt"
    }

    /// Makes exactly one call to the Chat Completions API. Any transport or
    /// provider failure is returned to the caller unretried.
    async fn generate(
        &self,
        system_prompt: &str,
        conversation: &[ChatMessage],
    ) -> Result<String, LlmError> {
        require_user_message(conversation)?;

        let body = OpenAiRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: Self::build_messages(system_prompt, conversation),
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: OpenAiResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyContent)?;

        debug!(model = %self.model, chars = text.len(), "gpt completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_messages_leads_with_system_role() {
        let conversation = vec![ChatMessage::user("generate questions")];
        let messages = GptBackend::build_messages("You are an interviewer.", &conversation);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "You are an interviewer.");
        assert_eq!(messages[1]["role"], "user");
    }
}
