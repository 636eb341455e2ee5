use crate::renderer::Renderer;
use crate::segmenter::Segmenter;
use crate::synchronizer::Synchronizer;
use dubsync_core::{
    write_srt, AnnotatedSegment, AppConfig, Caption, Device, EngineError, ExecutionContext,
    PipelineError, SynthesizedAudio,
};
use dubsync_engine::{
    synthesize_line, translate_or_keep, Recognizer, RecognizerRegistry, Synthesizer,
    SynthesizerRegistry, Translator, TranslatorRegistry,
};
use dubsync_media::{EncoderProfile, FfmpegBackend, MediaBackend, RunArena};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const ORIGINAL_SUBTITLES: &str = "subtitles_original.srt";
pub const TRANSLATED_SUBTITLES: &str = "subtitles_translated.srt";
pub const SYNCED_SUBTITLES: &str = "subtitles_synced.srt";

/// Summary of one run. `error` is `None` when the dubbed video was written.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: String,
    pub output: PathBuf,
    pub segments: usize,
    pub fragments: usize,
    pub silent_lines: usize,
    pub encoder: Option<EncoderProfile>,
    pub artifacts: Vec<PathBuf>,
    pub error: Option<PipelineError>,
}

impl RunReport {
    fn new(ctx: &ExecutionContext, output: &Path) -> Self {
        Self {
            run_id: ctx.run_id.clone(),
            output: output.to_path_buf(),
            segments: 0,
            fragments: 0,
            silent_lines: 0,
            encoder: None,
            artifacts: Vec::new(),
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

pub struct Pipeline {
    config: AppConfig,
    device: Device,
    backend: Arc<dyn MediaBackend>,
    recognizer: Box<dyn Recognizer>,
    translator: Box<dyn Translator>,
    synthesizer: Box<dyn Synthesizer>,
}

impl Pipeline {
    pub fn new(
        config: AppConfig,
        device: Device,
        backend: Arc<dyn MediaBackend>,
        recognizer: Box<dyn Recognizer>,
        translator: Box<dyn Translator>,
        synthesizer: Box<dyn Synthesizer>,
    ) -> Self {
        Self {
            config,
            device,
            backend,
            recognizer,
            translator,
            synthesizer,
        }
    }

    /// Build the ffmpeg backend and the configured engines, initialized.
    pub async fn from_config(config: AppConfig, device: Device) -> Result<Self, EngineError> {
        let backend: Arc<dyn MediaBackend> = Arc::new(FfmpegBackend::new(
            &config.render.ffmpeg,
            &config.render.ffprobe,
        ));

        let mut recognizer = RecognizerRegistry::new().create(&config.asr.engine)?;
        recognizer.initialize(config.asr.options.clone()).await?;
        let mut translator = TranslatorRegistry::new().create(&config.translation.engine)?;
        translator
            .initialize(config.translation.options.clone())
            .await?;
        let mut synthesizer = SynthesizerRegistry::new().create(&config.tts.engine)?;
        synthesizer.initialize(config.tts.options.clone()).await?;

        tracing::info!(
            asr = recognizer.name(),
            translation = translator.name(),
            tts = synthesizer.name(),
            backend = backend.name(),
            %device,
            "pipeline ready"
        );
        Ok(Self::new(
            config,
            device,
            backend,
            recognizer,
            translator,
            synthesizer,
        ))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.config.general.work_dir.join(name)
    }

    /// Dub `input` into `output`. Never panics or propagates; failures are
    /// reported in the returned [`RunReport`].
    pub async fn run(&self, input: &Path, output: &Path) -> RunReport {
        let ctx = ExecutionContext::new(
            self.device,
            &self.config.translation.source_lang,
            &self.config.translation.target_lang,
        );
        let mut report = RunReport::new(&ctx, output);
        tracing::info!(
            run_id = %ctx.run_id,
            input = %input.display(),
            output = %output.display(),
            mode = ?self.config.render.mode,
            "run started"
        );

        match self.execute(&ctx, input, output, &mut report).await {
            Ok(()) => tracing::info!(run_id = %ctx.run_id, "run finished"),
            Err(e) => {
                tracing::error!(run_id = %ctx.run_id, "run failed: {e}");
                report.error = Some(e);
            }
        }
        report
    }

    async fn execute(
        &self,
        ctx: &ExecutionContext,
        input: &Path,
        output: &Path,
        report: &mut RunReport,
    ) -> Result<(), PipelineError> {
        self.remove_previous(output);

        let render = &self.config.render;
        let mut arena = RunArena::create(&self.config.general.work_dir, ctx.short_id())
            .map_err(PipelineError::Workspace)?
            .with_retry(
                render.cleanup_attempts,
                Duration::from_millis(render.cleanup_backoff_ms),
            );

        tracing::info!("1. probing source and extracting audio");
        let backend = Arc::clone(&self.backend);
        let video = input.to_path_buf();
        let source = blocking(move || backend.probe(&video))
            .await?
            .map_err(PipelineError::Source)?;
        tracing::debug!(
            duration = source.duration,
            fps = ?source.fps,
            width = source.width,
            height = source.height,
            "source probed"
        );

        let audio_path = arena.allocate("audio_extracted.wav");
        let backend = Arc::clone(&self.backend);
        let video = input.to_path_buf();
        let wav = audio_path.clone();
        blocking(move || backend.extract_audio(&video, &wav))
            .await?
            .map_err(PipelineError::Extraction)?;

        tracing::info!(engine = self.recognizer.name(), "2. recognizing speech");
        let transcript = self
            .recognizer
            .transcribe(&audio_path, ctx)
            .await
            .map_err(PipelineError::Recognition)?;
        let segmenter = Segmenter::new(self.config.segmenter.clone());
        let segments: Vec<AnnotatedSegment> = segmenter
            .segment(&transcript.chunks, Some(transcript.text.as_str()))
            .into_iter()
            .map(AnnotatedSegment::from_tagged)
            .collect();
        if segments.is_empty() {
            return Err(PipelineError::NoDialogue);
        }
        report.segments = segments.len();
        self.persist(ORIGINAL_SUBTITLES, &segments, report)?;

        tracing::info!(
            engine = self.translator.name(),
            from = %ctx.source_lang,
            to = %ctx.target_lang,
            "3. translating {} segments",
            segments.len()
        );
        let mut translated = Vec::with_capacity(segments.len());
        for segment in &segments {
            let text = translate_or_keep(self.translator.as_ref(), segment.segment.text(), ctx).await;
            translated.push(AnnotatedSegment::new(
                segment.segment.with_text(text),
                segment.emotion,
            ));
        }
        self.persist(TRANSLATED_SUBTITLES, &translated, report)?;

        tracing::info!(engine = self.synthesizer.name(), "4. synthesizing speech");
        let mut audios: Vec<SynthesizedAudio> = Vec::with_capacity(translated.len());
        for (index, segment) in translated.iter().enumerate() {
            let audio = synthesize_line(self.synthesizer.as_ref(), segment.segment.text(), ctx).await;
            match audio.duration() {
                Some(seconds) => tracing::debug!(index, seconds, "line synthesized"),
                None => {
                    tracing::warn!(index, "line has no synthesized audio");
                    report.silent_lines += 1;
                }
            }
            audios.push(audio);
        }

        tracing::info!("5. synchronizing and rendering");
        let synchronizer = Synchronizer::new(self.config.sync.clone(), render.default_fps);
        let sync_source = source.clone();
        let (synced, arena) = blocking(move || {
            let result = synchronizer.synchronize(&translated, &audios, &sync_source, &mut arena);
            (result, arena)
        })
        .await?;
        let synced = synced.map_err(PipelineError::Synchronization)?;
        report.fragments = synced.fragments.len();

        let renderer = Renderer::new(Arc::clone(&self.backend), render.clone());
        let mode = render.mode;
        let destination = output.to_path_buf();
        let fragments = synced.fragments;
        let outcome = blocking(move || renderer.render(fragments, &source, arena, &destination, mode))
            .await?;
        report.encoder = outcome.encoder;
        if let Some(e) = outcome.error {
            return Err(PipelineError::Render(e));
        }

        self.persist(SYNCED_SUBTITLES, &synced.resynced, report)?;
        Ok(())
    }

    fn persist<C: Caption>(
        &self,
        name: &str,
        cues: &[C],
        report: &mut RunReport,
    ) -> Result<(), PipelineError> {
        let path = self.artifact_path(name);
        write_srt(&path, cues).map_err(|source| PipelineError::Artifact {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), cues = cues.len(), "subtitles written");
        report.artifacts.push(path);
        Ok(())
    }

    /// Delete the previous output and subtitle snapshots so a failed run
    /// never leaves stale results behind.
    fn remove_previous(&self, output: &Path) {
        let stale = [
            output.to_path_buf(),
            self.artifact_path(ORIGINAL_SUBTITLES),
            self.artifact_path(TRANSLATED_SUBTITLES),
            self.artifact_path(SYNCED_SUBTITLES),
        ];
        for path in stale {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed previous result"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(path = %path.display(), "cannot remove previous result: {e}"),
            }
        }
    }

    pub async fn shutdown(&self) {
        let results = [
            ("asr", self.recognizer.shutdown().await),
            ("translation", self.translator.shutdown().await),
            ("tts", self.synthesizer.shutdown().await),
        ];
        for (stage, result) in results {
            if let Err(e) = result {
                tracing::warn!(stage, "engine shutdown failed: {e}");
            }
        }
    }
}

/// Run blocking media work off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T, PipelineError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PipelineError::Worker(e.to_string()))
}
