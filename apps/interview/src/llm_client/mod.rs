//! LLM client — the single point of entry for all model backend calls.
//!
//! ARCHITECTURAL RULE: no other module may talk to a provider API directly.
//! The aggregator sees only the `GenerationBackend` trait; the concrete
//! adapters live in `claude` and `openai` behind the `BackendKind` enum.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{BackendKind, Config};
use crate::errors::InterviewError;

pub mod claude;
pub mod openai;

pub use claude::ClaudeBackend;
pub use openai::GptBackend;

/// Token ceiling shared by both adapters.
pub const MAX_TOKENS: u32 = 4096;
/// Temperature is pinned to 0 to maximize reproducibility of the structured
/// output contract. Backends still do not guarantee byte-identical replies.
pub const TEMPERATURE: f32 = 0.0;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("backend returned empty content")]
    EmptyContent,

    #[error("conversation must contain at least one user message")]
    EmptyConversation,
}

/// Message role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One role-tagged message in the conversation sent to a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Capability interface every backend adapter implements: accept a system
/// instruction plus a message list, return one text completion. One outbound
/// network call per invocation, no retries — a transport or provider failure
/// is surfaced as-is and is fatal to the caller's current round.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(
        &self,
        system_prompt: &str,
        conversation: &[ChatMessage],
    ) -> Result<String, LlmError>;
}

/// Builds the adapter for the configured backend.
/// Fails fast with a configuration error if the matching API key is missing;
/// no network I/O happens here.
pub fn backend_for(config: &Config) -> Result<Box<dyn GenerationBackend>, InterviewError> {
    match config.backend {
        BackendKind::Claude => {
            let key = config.anthropic_api_key.clone().ok_or_else(|| {
                InterviewError::Configuration(
                    "engine 'claude' requires an Anthropic API key".to_string(),
                )
            })?;
            Ok(Box::new(ClaudeBackend::new(key)))
        }
        BackendKind::Gpt => {
            let key = config.openai_api_key.clone().ok_or_else(|| {
                InterviewError::Configuration(
                    "engine 'gpt' requires an OpenAI API key".to_string(),
                )
            })?;
            Ok(Box::new(GptBackend::new(key)))
        }
    }
}

/// Checks the one conversation precondition the adapters enforce: at least
/// one user-role message. Ordering beyond that is not validated.
pub(crate) fn require_user_message(conversation: &[ChatMessage]) -> Result<(), LlmError> {
    if conversation.iter().any(|m| m.role == Role::User) {
        Ok(())
    } else {
        Err(LlmError::EmptyConversation)
    }
}

/// Builds the shared HTTP client used by all adapters in this crate.
pub(crate) fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .expect("failed to build HTTP client")
}
