//! QA Aggregator — drives the generation rounds and owns the Result Mapping.
//!
//! Flow per round: generate → parse → persist round artifact → merge.
//! Persisting ALWAYS happens before merging: a session against a paid,
//! rate-limited service must not lose completed rounds if a later round
//! fails, and the cached artifacts are the only recovery surface.
//!
//! Rounds run strictly one after another; nothing here is safe for
//! concurrent `run` calls against the same cache root.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::errors::InterviewError;
use crate::generation::parser::{parse_response, ResultMapping};
use crate::llm_client::{ChatMessage, GenerationBackend};

/// Subdirectory of the QA root holding the per-round artifacts.
const CACHE_DIR: &str = "cached";

/// Drives N generation rounds against one backend and merges the results.
pub struct QaAggregator<'a> {
    backend: &'a dyn GenerationBackend,
}

impl<'a> QaAggregator<'a> {
    pub fn new(backend: &'a dyn GenerationBackend) -> Self {
        QaAggregator { backend }
    }

    /// Runs `iteration` rounds and returns the merged Result Mapping.
    ///
    /// Each round is an independent single-turn request reusing the same
    /// system instruction; no conversation context is threaded between
    /// rounds. A backend failure aborts the whole run — rounds already
    /// persisted under `<qa_root>/cached/` stay on disk for manual recovery,
    /// but no partial mapping is returned. A parse failure is NOT a round
    /// failure; it merges as the fallback entry.
    pub async fn run(
        &self,
        system_prompt: &str,
        task_prompt: &str,
        iteration: u32,
        qa_root: &Path,
    ) -> Result<ResultMapping, InterviewError> {
        let cache_dir = qa_root.join(CACHE_DIR);
        std::fs::create_dir_all(&cache_dir)?;

        let mut merged = ResultMapping::new();
        for round in 0..iteration {
            info!(round, backend = self.backend.name(), "starting generation round");

            let conversation = [ChatMessage::user(task_prompt)];
            let response = self
                .backend
                .generate(system_prompt, &conversation)
                .await
                .map_err(InterviewError::from)?;

            let round_mapping = parse_response(&response);

            // Persist before merge — the artifact is the durable record of
            // this round even if anything after this point fails.
            let artifact = write_round_artifact(&cache_dir, round, &round_mapping)?;
            info!(round, entries = round_mapping.len(), artifact = %artifact.display(),
                "round cached");

            // Last-write-wins on key collision across rounds.
            merged.extend(round_mapping);
        }

        info!(rounds = iteration, entries = merged.len(), "aggregation complete");
        Ok(merged)
    }
}

/// Writes one immutable Cached Round Artifact; the name carries the round
/// index plus a microsecond timestamp so repeated runs never collide.
fn write_round_artifact(
    cache_dir: &Path,
    round: u32,
    mapping: &ResultMapping,
) -> Result<PathBuf, InterviewError> {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S%6f");
    let path = cache_dir.join(format!("batch_output_{round}_{timestamp}.json"));
    // serde_json leaves non-ASCII text unescaped, matching the artifact contract.
    let json = serde_json::to_string_pretty(mapping).map_err(std::io::Error::from)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend returning a scripted response per round; an empty script slot
    /// simulates a provider failure.
    struct ScriptedBackend {
        responses: Vec<Result<String, String>>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<String, String>>) -> Self {
            ScriptedBackend {
                responses,
                calls: AtomicUsize::new(0),
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
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.responses[call] {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(LlmError::Api {
                    status: 429,
                    message: message.clone(),
                }),
            }
        }
    }

    fn cached_artifacts(qa_root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(qa_root.join(CACHE_DIR))
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        files.sort();
        files
    }

    #[tokio::test]
    async fn test_run_writes_one_artifact_per_round() {
        let dir = tempfile::tempdir().unwrap();
        let backend = ScriptedBackend::new(vec![
            Ok(r#"{"Q_00000001": "Qa", "A_00000001": "Aa"}"#.to_string()),
            Ok(r#"{"Q_00000002": "Qb", "A_00000002": "Ab"}"#.to_string()),
        ]);

        let merged = QaAggregator::new(&backend)
            .run("system", "task", 2, dir.path())
            .await
            .unwrap();

        assert_eq!(merged.len(), 4);
        let artifacts = cached_artifacts(dir.path());
        assert_eq!(artifacts.len(), 2);

        // Each artifact independently parses back into the mapping it recorded.
        let first: ResultMapping =
            serde_json::from_str(&std::fs::read_to_string(&artifacts[0]).unwrap()).unwrap();
        assert_eq!(first["Q_00000001"], "Qa");
    }

    #[tokio::test]
    async fn test_merge_is_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let backend = ScriptedBackend::new(vec![
            Ok(r#"{"Q_abc123": "first version"}"#.to_string()),
            Ok(r#"{"Q_def456": "other"}"#.to_string()),
            Ok(r#"{"Q_abc123": "third version"}"#.to_string()),
        ]);

        let merged = QaAggregator::new(&backend)
            .run("system", "task", 3, dir.path())
            .await
            .unwrap();

        assert_eq!(merged["Q_abc123"], "third version");
        assert_eq!(merged.len(), 2);
    }

    #[tokio::test]
    async fn test_backend_failure_aborts_run_but_keeps_prior_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let backend = ScriptedBackend::new(vec![
            Ok(r#"{"Q_00000001": "Qa"}"#.to_string()),
            Err("rate limit exceeded".to_string()),
            Ok(r#"{"Q_00000003": "never reached"}"#.to_string()),
        ]);

        let err = QaAggregator::new(&backend)
            .run("system", "task", 3, dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, InterviewError::Backend(_)));
        assert!(err.to_string().contains("rate limit exceeded"));
        // Exactly the one completed round is on disk; no partial mapping
        // was returned.
        assert_eq!(cached_artifacts(dir.path()).len(), 1);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unparsable_round_still_counts_as_completed() {
        let dir = tempfile::tempdir().unwrap();
        let backend = ScriptedBackend::new(vec![
            Ok("I'm sorry, I can't produce a mapping.".to_string()),
            Ok(r#"{"Q_00000002": "Qb"}"#.to_string()),
        ]);

        let merged = QaAggregator::new(&backend)
            .run("system", "task", 2, dir.path())
            .await
            .unwrap();

        assert_eq!(cached_artifacts(dir.path()).len(), 2);
        assert_eq!(merged.len(), 2);
        assert!(merged
            .keys()
            .any(|k| k.starts_with(crate::generation::parser::UNPARSED_PAYLOAD_PREFIX)));
    }
}
