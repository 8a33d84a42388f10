//! End-to-end pipeline tests over the manager, with scripted backend and
//! synthesizer collaborators.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use open_interview::export::voice::{SpeechSynthesizer, SpeechError};
use open_interview::generation::prompts::InterviewType;
use open_interview::llm_client::{ChatMessage, GenerationBackend, LlmError};
use open_interview::{InterviewError, InterviewManager, InterviewRequest};

/// Backend that replays a fixed script of responses, one per round.
struct ScriptedBackend {
    responses: Mutex<Vec<Result<String, String>>>,
}

impl ScriptedBackend {
    fn new(responses: Vec<Result<String, String>>) -> Self {
        ScriptedBackend {
            responses: Mutex::new(responses),
        }
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(
        &self,
        _system_prompt: &str,
        _conversation: &[ChatMessage],
    ) -> Result<String, LlmError> {
        let mut responses = self.responses.lock().unwrap();
        match responses.remove(0) {
            Ok(text) => Ok(text),
            Err(message) => Err(LlmError::Api {
                status: 500,
                message,
            }),
        }
    }
}

struct SilentSynthesizer;

#[async_trait]
impl SpeechSynthesizer for SilentSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<Bytes, SpeechError> {
        Ok(Bytes::from_static(&[0xff, 0xfb]))
    }
}

fn manager_with(responses: Vec<Result<String, String>>) -> InterviewManager {
    InterviewManager::from_parts(
        Box::new(ScriptedBackend::new(responses)),
        Box::new(SilentSynthesizer),
    )
}

fn request(output_dir: &Path, iteration: u32) -> InterviewRequest {
    let mut request = InterviewRequest::new(
        "Build LLM-backed services in Rust.",
        "Five years of backend Rust, tokio and reqwest.",
        "Senior Rust Engineer",
        InterviewType::General,
    );
    request.output_dir = output_dir.to_path_buf();
    request.iteration = iteration;
    request
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

#[tokio::test]
async fn two_round_run_produces_all_three_artifact_trees() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_with(vec![
        Ok(r#"{"Q_00000001": "Qa", "A_00000001": "Aa"}"#.to_string()),
        Ok(r#"{"Q_00000002": "Qb", "A_00000002": "Ab"}"#.to_string()),
    ]);

    let mapping = manager
        .generate_interview(request(dir.path(), 2))
        .await
        .unwrap();

    // Merged mapping: two full pairs.
    assert_eq!(mapping.len(), 4);
    assert_eq!(mapping["Q_00000001"], "Qa");
    assert_eq!(mapping["A_00000002"], "Ab");

    // One cache artifact per round.
    assert_eq!(count_files(&dir.path().join("generated_qa/cached")), 2);

    // One document.
    assert_eq!(count_files(&dir.path().join("document")), 1);

    // Two audio directories with two files each.
    for id in ["00000001", "00000002"] {
        let entry_dir = dir.path().join("voice").join(id);
        assert!(entry_dir.join("question.mp3").exists());
        assert!(entry_dir.join("answer.mp3").exists());
        assert_eq!(count_files(&entry_dir), 2);
    }
}

#[tokio::test]
async fn backend_failure_mid_run_aborts_with_only_prior_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_with(vec![
        Ok(r#"{"Q_00000001": "Qa", "A_00000001": "Aa"}"#.to_string()),
        Err("upstream unavailable".to_string()),
        Ok(r#"{"Q_00000003": "unreached"}"#.to_string()),
    ]);

    let err = manager
        .generate_interview(request(dir.path(), 3))
        .await
        .unwrap_err();

    assert!(matches!(err, InterviewError::Backend(_)));
    assert!(err.to_string().contains("upstream unavailable"));

    // The completed round survives on disk; nothing was exported.
    assert_eq!(count_files(&dir.path().join("generated_qa/cached")), 1);
    assert!(!dir.path().join("document").exists());
    assert!(!dir.path().join("voice").exists());
}

#[tokio::test]
async fn unparsable_round_flows_through_to_exports() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_with(vec![Ok("no mapping here, sorry".to_string())]);

    let mapping = manager
        .generate_interview(request(dir.path(), 1))
        .await
        .unwrap();

    // The salvage entry is the whole result; it reaches the audio exporter
    // (directory named after the synthetic key) but not the document tables.
    assert_eq!(mapping.len(), 1);
    let key = mapping.keys().next().unwrap();
    assert!(key.starts_with("UnparsedPayload"));
    assert_eq!(count_files(&dir.path().join("document")), 1);
    assert_eq!(count_files(&dir.path().join("voice")), 1);
}

#[tokio::test]
async fn prompt_overrides_bypass_the_builder() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_with(vec![Ok(r#"{"Q_0000000a": "Qa"}"#.to_string())]);

    let mut req = request(dir.path(), 1);
    // A jd that would fail content loading if the builder ran.
    req.jd = "missing.pdf".to_string();
    req.system_prompt_override = Some("You are a terse interviewer.".to_string());
    req.task_prompt_override = Some("Produce one question.".to_string());

    let mapping = manager.generate_interview(req).await.unwrap();
    assert_eq!(mapping.len(), 1);
}
