use dubsync_core::{EncodingMode, RenderConfig, RenderError};
use dubsync_media::{
    build_filter_graph, CleanupReport, EncoderProfile, MediaBackend, RenderJob, RunArena,
    SourceVideo, SyncFragment,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of one render attempt. Cleanup has already run when this is returned.
#[derive(Debug)]
pub struct RenderOutcome {
    pub output: PathBuf,
    /// Profile that produced the file, `None` on failure.
    pub encoder: Option<EncoderProfile>,
    pub error: Option<RenderError>,
    pub cleanup: CleanupReport,
}

impl RenderOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.encoder.is_some()
    }
}

#[derive(Clone)]
pub struct Renderer {
    backend: Arc<dyn MediaBackend>,
    config: RenderConfig,
}

impl Renderer {
    pub fn new(backend: Arc<dyn MediaBackend>, config: RenderConfig) -> Self {
        Self { backend, config }
    }

    /// Render `fragments` to `output`. Takes ownership of the fragments and
    /// the arena holding their audio; both are released before returning,
    /// whatever the outcome.
    pub fn render(
        &self,
        fragments: Vec<SyncFragment>,
        source: &SourceVideo,
        mut arena: RunArena,
        output: &Path,
        mode: EncodingMode,
    ) -> RenderOutcome {
        tracing::info!(
            fragments = fragments.len(),
            ?mode,
            output = %output.display(),
            "rendering"
        );
        let result = self.try_render(&fragments, source, &mut arena, output, mode);
        drop(fragments);
        let cleanup = arena.cleanup();
        if !cleanup.is_clean() {
            tracing::warn!(failed = cleanup.failed.len(), "some temporary assets could not be removed");
        }

        match result {
            Ok(encoder) => {
                tracing::info!(%encoder, output = %output.display(), "render finished");
                RenderOutcome {
                    output: output.to_path_buf(),
                    encoder: Some(encoder),
                    error: None,
                    cleanup,
                }
            }
            Err(e) => {
                tracing::error!("render failed: {e}");
                if matches!(e, RenderError::Encode(_)) {
                    remove_partial_output(output);
                }
                RenderOutcome {
                    output: output.to_path_buf(),
                    encoder: None,
                    error: Some(e),
                    cleanup,
                }
            }
        }
    }

    fn try_render(
        &self,
        fragments: &[SyncFragment],
        source: &SourceVideo,
        arena: &mut RunArena,
        output: &Path,
        mode: EncodingMode,
    ) -> Result<EncoderProfile, RenderError> {
        if fragments.is_empty() {
            return Err(RenderError::EmptyFragmentList);
        }

        let graph = build_filter_graph(fragments, self.config.default_fps);
        let script = arena.allocate("filter_graph.txt");
        std::fs::write(&script, &graph.script).map_err(dubsync_core::MediaError::from)?;
        tracing::debug!(
            inputs = graph.audio_inputs.len() + 1,
            fps = graph.fps,
            canvas = ?graph.canvas,
            "filter graph written"
        );

        let job = RenderJob {
            source: source.path.clone(),
            audio_inputs: graph.audio_inputs,
            filter_script: script,
            output: output.to_path_buf(),
            fps: graph.fps,
            audio_bitrate: self.config.audio_bitrate.clone(),
        };
        self.encode(&job, mode)
    }

    fn encode(&self, job: &RenderJob, mode: EncodingMode) -> Result<EncoderProfile, RenderError> {
        let first = match mode {
            EncodingMode::Fast => EncoderProfile::HardwareFast,
            EncodingMode::Quality => EncoderProfile::SoftwareQuality,
        };
        tracing::info!(encoder = %first, backend = self.backend.name(), "encoding");
        match self.backend.encode(job, first) {
            Ok(()) => Ok(first),
            Err(e) if first.is_hardware() => {
                tracing::warn!(encoder = %first, "hardware encode failed, retrying in software: {e}");
                remove_partial_output(&job.output);
                let fallback = EncoderProfile::SoftwareFallback;
                self.backend.encode(job, fallback)?;
                Ok(fallback)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn remove_partial_output(output: &Path) {
    match std::fs::remove_file(output) {
        Ok(()) => tracing::debug!(path = %output.display(), "removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %output.display(), "cannot remove partial output: {e}"),
    }
}
