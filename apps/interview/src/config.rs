use std::str::FromStr;

use crate::errors::InterviewError;

/// The closed set of supported generation backends.
/// Adding a provider means adding a variant here and an adapter in
/// `llm_client` — never string-branching at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Claude,
    Gpt,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Claude => "claude",
            BackendKind::Gpt => "gpt",
        }
    }
}

impl FromStr for BackendKind {
    type Err = InterviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "claude" => Ok(BackendKind::Claude),
            "gpt" => Ok(BackendKind::Gpt),
            other => Err(InterviewError::Configuration(format!(
                "unsupported engine '{other}': choose 'claude' or 'gpt'"
            ))),
        }
    }
}

/// Explicit configuration handed to the manager and adapter constructors.
/// There is no ambient credential state anywhere in the crate.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendKind,
    /// Required when `backend` is Claude.
    pub anthropic_api_key: Option<String>,
    /// Required when `backend` is Gpt, and for voice synthesis.
    pub openai_api_key: Option<String>,
    pub rust_log: String,
}

impl Config {
    /// Loads configuration from the environment (and `.env` if present).
    /// The key for the selected backend is required; the other is optional.
    pub fn from_env(backend: BackendKind) -> Result<Self, InterviewError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        match backend {
            BackendKind::Claude if anthropic_api_key.is_none() => {
                return Err(require_failed("ANTHROPIC_API_KEY", backend));
            }
            BackendKind::Gpt if openai_api_key.is_none() => {
                return Err(require_failed("OPENAI_API_KEY", backend));
            }
            _ => {}
        }

        Ok(Config {
            backend,
            anthropic_api_key,
            openai_api_key,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_failed(key: &str, backend: BackendKind) -> InterviewError {
    InterviewError::Configuration(format!(
        "required environment variable '{key}' is not set for engine '{}'",
        backend.as_str()
    ))
}
