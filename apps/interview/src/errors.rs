use std::path::PathBuf;

use thiserror::Error;

/// Crate-level error type.
///
/// Configuration and content-load failures surface before any network I/O.
/// A backend failure mid-run aborts the whole aggregation run; the cached
/// round artifacts already on disk are the recovery surface.
#[derive(Debug, Error)]
pub enum InterviewError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to load content from {path}: {reason}")]
    ContentLoad { path: PathBuf, reason: String },

    #[error("generation backend error: {0}")]
    Backend(String),

    #[error("document export failed: {0}")]
    Document(String),

    #[error("audio export failed: {0}")]
    Audio(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<crate::llm_client::LlmError> for InterviewError {
    fn from(e: crate::llm_client::LlmError) -> Self {
        InterviewError::Backend(e.to_string())
    }
}
