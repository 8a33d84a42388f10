//! Mock-interview Q&A generation from a job description and a candidate
//! resume, driven by an LLM backend, with document and voice export.
//!
//! The core is the generation-and-aggregation pipeline: repeated
//! prompt/response rounds against a backend, each round parsed into an
//! identifier-keyed mapping, persisted as an audit artifact, and merged
//! last-write-wins into one Result Mapping that both exporters consume.

pub mod config;
pub mod content;
pub mod errors;
pub mod export;
pub mod generation;
pub mod llm_client;
pub mod manager;

pub use config::{BackendKind, Config};
pub use errors::InterviewError;
pub use export::document::export_document;
pub use export::voice::{save_qa_audio, OpenAiSpeech, SpeechSynthesizer};
pub use generation::aggregator::QaAggregator;
pub use generation::parser::{parse_response, ResultMapping};
pub use generation::prompts::{
    build_system_prompt, build_task_prompt, InterviewType, PromptInputs, TaskKind,
};
pub use llm_client::{ChatMessage, GenerationBackend, LlmError, Role};
pub use manager::{InterviewManager, InterviewRequest};
