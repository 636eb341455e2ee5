use crate::engine_trait::Recognizer;
use crate::whisper_json::parse_whisper_json;
use async_trait::async_trait;
use dubsync_core::{EngineError, ExecutionContext, Transcript};
use std::path::{Path, PathBuf};

/// Replays a transcript saved as Whisper JSON.
///
/// With a `path` option the same file is used for every run; otherwise the
/// recognizer looks for a `.json` sidecar next to the audio track.
pub struct FileRecognizer {
    path: Option<PathBuf>,
}

impl FileRecognizer {
    pub fn new() -> Self {
        Self { path: None }
    }

    fn transcript_path(&self, audio_path: &Path) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| audio_path.with_extension("json"))
    }
}

impl Default for FileRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Recognizer for FileRecognizer {
    fn name(&self) -> &str {
        "file"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), EngineError> {
        self.path = config
            .get("path")
            .and_then(|v| v.as_str())
            .map(PathBuf::from);
        tracing::info!(path = ?self.path, "FileRecognizer initialized");
        Ok(())
    }

    async fn transcribe(
        &self,
        audio_path: &Path,
        ctx: &ExecutionContext,
    ) -> Result<Transcript, EngineError> {
        let path = self.transcript_path(audio_path);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            EngineError::ProcessingFailed(format!("cannot read {}: {e}", path.display()))
        })?;
        let transcript = parse_whisper_json(&content)?;
        tracing::debug!(
            run = ctx.short_id(),
            chunks = transcript.chunks.len(),
            "loaded transcript from {}",
            path.display()
        );
        Ok(transcript)
    }

    async fn shutdown(&self) -> Result<(), EngineError> {
        Ok(())
    }
}
