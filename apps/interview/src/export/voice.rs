//! Audio Exporter — synthesizes each mapping entry into a per-identifier
//! directory of MP3 files, plus a thin speech-to-text wrapper.
//!
//! The exporter walks entries independently, not per pair: an unpaired
//! `Q_` entry yields a directory holding only `question.mp3`. Pairing is
//! never verified here.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::errors::InterviewError;
use crate::generation::parser::ResultMapping;

const OPENAI_SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";
const OPENAI_TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const SPEECH_MODEL: &str = "tts-1";
const TRANSCRIPTION_MODEL: &str = "whisper-1";
const VOICE: &str = "alloy";

const QUESTION_FILE: &str = "question.mp3";
const ANSWER_FILE: &str = "answer.mp3";

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Seam over the text-to-speech service so the exporter is testable without
/// network access.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizes `text` and returns the MP3 bytes.
    async fn synthesize(&self, text: &str) -> Result<Bytes, SpeechError>;
}

/// OpenAI speech adapter (TTS and transcription endpoints).
pub struct OpenAiSpeech {
    client: Client,
    api_key: String,
}

impl OpenAiSpeech {
    pub fn new(api_key: String) -> Self {
        OpenAiSpeech {
            client: crate::llm_client::build_http_client(),
            api_key,
        }
    }

    /// Transcribes an audio file to text (speech-to-text counterpart of the
    /// exporter; not part of the core pipeline).
    pub async fn transcribe(&self, audio_path: &Path) -> Result<String, InterviewError> {
        let bytes = std::fs::read(audio_path)?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.mp3".to_string());

        let form = reqwest::multipart::Form::new()
            .text("model", TRANSCRIPTION_MODEL)
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );

        let response = self
            .client
            .post(OPENAI_TRANSCRIPTION_URL)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| InterviewError::Audio(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(InterviewError::Audio(format!(
                "transcription failed (status {status}): {message}"
            )));
        }

        #[derive(Deserialize)]
        struct Transcription {
            text: String,
        }
        let parsed: Transcription = response
            .json()
            .await
            .map_err(|e| InterviewError::Audio(e.to_string()))?;
        Ok(parsed.text)
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str) -> Result<Bytes, SpeechError> {
        let response = self
            .client
            .post(OPENAI_SPEECH_URL)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": SPEECH_MODEL,
                "voice": VOICE,
                "input": text,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SpeechError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes().await?)
    }
}

/// Synthesizes every mapping entry into
/// `<voice_dir>/<identifier>/question.mp3` or `.../answer.mp3`.
///
/// The identifier is the suffix after the last underscore; the key's leading
/// `Q` or `A` selects the filename. Entries sharing an identifier land in the
/// same directory.
pub async fn save_qa_audio(
    synthesizer: &dyn SpeechSynthesizer,
    mapping: &ResultMapping,
    voice_dir: &Path,
) -> Result<(), InterviewError> {
    for (key, text) in mapping {
        let identifier = key.rsplit('_').next().unwrap_or(key);
        let file_name = if key.starts_with('Q') {
            QUESTION_FILE
        } else {
            ANSWER_FILE
        };

        let entry_dir = voice_dir.join(identifier);
        std::fs::create_dir_all(&entry_dir)?;

        let audio = synthesizer
            .synthesize(text)
            .await
            .map_err(|e| InterviewError::Audio(e.to_string()))?;
        std::fs::write(entry_dir.join(file_name), audio)?;
    }

    info!(entries = mapping.len(), dir = %voice_dir.display(), "audio exported");
    Ok(())
}
