//! Interview Manager — the top-level entry point tying the pipeline together:
//! prompts → aggregation → document export → audio export.

use std::path::PathBuf;

use tracing::info;

use crate::config::Config;
use crate::errors::InterviewError;
use crate::export::document::export_document;
use crate::export::voice::{save_qa_audio, OpenAiSpeech, SpeechSynthesizer};
use crate::generation::aggregator::QaAggregator;
use crate::generation::parser::ResultMapping;
use crate::generation::prompts::{build_system_prompt, InterviewType, PromptInputs, TaskKind};
use crate::llm_client::{backend_for, GenerationBackend};

/// Subdirectories of `output_dir` owned by the three artifact trees.
const QA_DIR: &str = "generated_qa";
const DOCUMENT_DIR: &str = "document";
const VOICE_DIR: &str = "voice";

/// Parameters for one interview generation session.
///
/// `jd` and `resume` may be literal text or `.txt`/`.pdf` paths. The optional
/// prompt overrides bypass the prompt builder entirely when supplied.
#[derive(Debug, Clone)]
pub struct InterviewRequest {
    pub jd: String,
    pub resume: String,
    pub position: String,
    pub interview_type: InterviewType,
    pub language: String,
    pub max_sentence: u32,
    pub output_dir: PathBuf,
    pub iteration: u32,
    pub interviewer_resume: Option<String>,
    pub custom_instructions: Option<String>,
    pub system_prompt_override: Option<String>,
    pub task_prompt_override: Option<String>,
}

impl InterviewRequest {
    pub fn new(
        jd: impl Into<String>,
        resume: impl Into<String>,
        position: impl Into<String>,
        interview_type: InterviewType,
    ) -> Self {
        InterviewRequest {
            jd: jd.into(),
            resume: resume.into(),
            position: position.into(),
            interview_type,
            language: "English".to_string(),
            max_sentence: 6,
            output_dir: PathBuf::from("output"),
            iteration: 1,
            interviewer_resume: None,
            custom_instructions: None,
            system_prompt_override: None,
            task_prompt_override: None,
        }
    }
}

/// Owns the backend adapter and speech synthesizer for the session and runs
/// the full pipeline. All credentials arrive through `Config`; nothing here
/// reads ambient state.
pub struct InterviewManager {
    backend: Box<dyn GenerationBackend>,
    synthesizer: Box<dyn SpeechSynthesizer>,
}

impl InterviewManager {
    /// Builds the manager for the configured backend. Fails fast with a
    /// configuration error before any network I/O.
    pub fn new(config: &Config) -> Result<Self, InterviewError> {
        let backend = backend_for(config)?;
        let speech_key = config.openai_api_key.clone().ok_or_else(|| {
            InterviewError::Configuration(
                "voice export requires an OpenAI API key".to_string(),
            )
        })?;
        Ok(InterviewManager {
            backend,
            synthesizer: Box::new(OpenAiSpeech::new(speech_key)),
        })
    }

    /// Assembles a manager from explicit collaborators. This is the seam the
    /// integration tests use to script backend and synthesizer behavior.
    pub fn from_parts(
        backend: Box<dyn GenerationBackend>,
        synthesizer: Box<dyn SpeechSynthesizer>,
    ) -> Self {
        InterviewManager {
            backend,
            synthesizer,
        }
    }

    /// Runs the full pipeline and returns the merged Result Mapping.
    ///
    /// Side effects, all under `request.output_dir`:
    /// - `generated_qa/cached/batch_output_<i>_<ts>.json` per round
    /// - `document/OpenInterview_<ts>.docx`
    /// - `voice/<identifier>/{question,answer}.mp3`
    ///
    /// The two exports run after aggregation completes and consume the same
    /// read-only mapping; a failure in either leaves the cache artifacts and
    /// any already-written export files in place.
    pub async fn generate_interview(
        &self,
        request: InterviewRequest,
    ) -> Result<ResultMapping, InterviewError> {
        let system_prompt = match &request.system_prompt_override {
            Some(prompt) => prompt.clone(),
            None => build_system_prompt(&PromptInputs {
                position: request.position.clone(),
                jd: request.jd.clone(),
                candidate_resume: request.resume.clone(),
                interview_type: request.interview_type,
                language: request.language.clone(),
                max_sentence: request.max_sentence,
                interviewer_resume: request.interviewer_resume.clone(),
                custom_instructions: request.custom_instructions.clone(),
            })?,
        };
        let task_prompt = request
            .task_prompt_override
            .clone()
            .unwrap_or_else(|| TaskKind::GenerateQuestionsAndAnswers.instruction());

        info!(
            position = %request.position,
            iteration = request.iteration,
            backend = self.backend.name(),
            "starting interview generation"
        );

        let aggregator = QaAggregator::new(self.backend.as_ref());
        let mapping = aggregator
            .run(
                &system_prompt,
                &task_prompt,
                request.iteration,
                &request.output_dir.join(QA_DIR),
            )
            .await?;

        let document_path =
            export_document(&mapping, &request.output_dir.join(DOCUMENT_DIR))?;
        info!(path = %document_path.display(), "interview document written");

        save_qa_audio(
            self.synthesizer.as_ref(),
            &mapping,
            &request.output_dir.join(VOICE_DIR),
        )
        .await?;

        Ok(mapping)
    }
}
