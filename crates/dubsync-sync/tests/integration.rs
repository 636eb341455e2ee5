use async_trait::async_trait;
use dubsync_core::{
    AppConfig, Device, EncodingMode, EngineError, ExecutionContext, MediaError, PipelineError,
    RenderConfig, RenderError, Segment, SyncConfig, SynthesizedAudio,
};
use dubsync_engine::{FileRecognizer, IdentityTranslator, Recognizer, Synthesizer};
use dubsync_media::{EncoderProfile, MediaBackend, RenderJob, RunArena, SourceVideo};
use dubsync_sync::{Pipeline, Renderer, Segmenter, Synchronizer, SYNCED_SUBTITLES};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Backend without ffmpeg: fixed probe, silent extraction, encodes recorded.
struct FakeBackend {
    duration: f64,
    encodes: Mutex<Vec<EncoderProfile>>,
    hardware_works: bool,
}

impl FakeBackend {
    fn new(duration: f64, hardware_works: bool) -> Self {
        Self {
            duration,
            encodes: Mutex::new(Vec::new()),
            hardware_works,
        }
    }
}

impl MediaBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn probe(&self, path: &Path) -> Result<SourceVideo, MediaError> {
        if !path.exists() {
            return Err(MediaError::SourceOpen {
                path: path.display().to_string(),
                reason: "file not found".to_string(),
            });
        }
        Ok(SourceVideo {
            path: path.to_path_buf(),
            duration: self.duration,
            fps: Some(30.0),
            width: 1280,
            height: 720,
        })
    }

    fn extract_audio(&self, _video: &Path, wav_out: &Path) -> Result<(), MediaError> {
        dubsync_media::write_padded_wav(wav_out, &[], 16000, 1.0)
    }

    fn encode(&self, job: &RenderJob, profile: EncoderProfile) -> Result<(), MediaError> {
        self.encodes.lock().unwrap().push(profile);
        if profile.is_hardware() && !self.hardware_works {
            return Err(MediaError::ToolFailed {
                tool: "ffmpeg".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "No NVENC capable devices found".to_string(),
            });
        }
        std::fs::write(&job.output, b"mp4")?;
        Ok(())
    }
}

/// Speaks every line at a fixed rate of 0.1 s per character.
struct PacedSynthesizer;

#[async_trait]
impl Synthesizer for PacedSynthesizer {
    fn name(&self) -> &str {
        "paced"
    }

    async fn initialize(&mut self, _config: toml::Value) -> Result<(), EngineError> {
        Ok(())
    }

    async fn synthesize(
        &self,
        text: &str,
        _ctx: &ExecutionContext,
    ) -> Result<SynthesizedAudio, EngineError> {
        let samples = vec![0.05f32; text.chars().count() * 1600];
        Ok(SynthesizedAudio::new(samples, 16000))
    }

    async fn shutdown(&self) -> Result<(), EngineError> {
        Ok(())
    }
}

const TRANSCRIPT: &str = r#"{
  "text": " Good morning everyone. <|HAPPY|> Welcome back to the show. Today we talk about rust.",
  "chunks": [
    {"text": " Good", "timestamp": [0.0, 0.3]},
    {"text": " morning", "timestamp": [0.3, 0.7]},
    {"text": " everyone.", "timestamp": [0.7, 1.3]},
    {"text": " <|HAPPY|> Welcome", "timestamp": [1.5, 1.9]},
    {"text": " back", "timestamp": [1.9, 2.1]},
    {"text": " to", "timestamp": [2.1, 2.2]},
    {"text": " the", "timestamp": [2.2, null]},
    {"text": " show.", "timestamp": [null, 2.9]},
    {"text": " Today", "timestamp": [4.0, 4.3]},
    {"text": " we", "timestamp": [4.3, 4.4]},
    {"text": " talk", "timestamp": [4.4, 4.7]},
    {"text": " about", "timestamp": [4.7, 5.0]},
    {"text": " rust.", "timestamp": [5.0, 5.6]}
  ]
}"#;

async fn file_recognizer(json: &Path) -> Box<dyn Recognizer> {
    let mut recognizer = FileRecognizer::new();
    let mut options = toml::map::Map::new();
    options.insert(
        "path".to_string(),
        toml::Value::String(json.to_string_lossy().to_string()),
    );
    recognizer
        .initialize(toml::Value::Table(options))
        .await
        .unwrap();
    Box::new(recognizer)
}

#[tokio::test]
async fn test_full_run_produces_contiguous_synced_subtitles() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("talk.mp4");
    std::fs::write(&input, b"source").unwrap();
    let json = dir.path().join("talk.json");
    std::fs::write(&json, TRANSCRIPT).unwrap();
    let output = dir.path().join("talk_dubbed.mp4");

    let mut config = AppConfig::default();
    config.general.work_dir = dir.path().join("work");
    config.render.cleanup_backoff_ms = 1;
    let backend = Arc::new(FakeBackend::new(60.0, false));

    let pipeline = Pipeline::new(
        config,
        Device::Cpu,
        backend.clone(),
        file_recognizer(&json).await,
        Box::new(IdentityTranslator::new()),
        Box::new(PacedSynthesizer),
    );
    let report = pipeline.run(&input, &output).await;
    assert!(report.is_success(), "{:?}", report.error);
    assert_eq!(report.segments, 3);
    assert_eq!(report.fragments, 3);
    assert_eq!(report.silent_lines, 0);
    assert_eq!(report.encoder, Some(EncoderProfile::SoftwareFallback));
    assert_eq!(
        *backend.encodes.lock().unwrap(),
        vec![EncoderProfile::HardwareFast, EncoderProfile::SoftwareFallback]
    );
    assert!(output.exists());

    let original =
        std::fs::read_to_string(dir.path().join("work").join("subtitles_original.srt")).unwrap();
    assert!(original.contains("[HAPPY] Welcome back to the show."));

    // Lines last 0.1 s per spoken character: 22, 25 and 25 characters
    let synced = std::fs::read_to_string(dir.path().join("work").join(SYNCED_SUBTITLES)).unwrap();
    assert_eq!(
        synced,
        "1\n00:00:00,000 --> 00:00:02,200\nGood morning everyone.\n\n\
         2\n00:00:02,200 --> 00:00:04,700\nWelcome back to the show.\n\n\
         3\n00:00:04,700 --> 00:00:07,200\nToday we talk about rust.\n\n"
    );

    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("work"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("dubsync-"))
        .collect();
    assert!(leftovers.is_empty(), "arena left behind: {leftovers:?}");
    pipeline.shutdown().await;
}

#[tokio::test]
async fn test_missing_source_is_fatal_before_any_fragment() {
    let dir = tempfile::tempdir().unwrap();
    let json = dir.path().join("t.json");
    std::fs::write(&json, TRANSCRIPT).unwrap();
    let mut config = AppConfig::default();
    config.general.work_dir = dir.path().to_path_buf();
    let backend = Arc::new(FakeBackend::new(60.0, true));

    let pipeline = Pipeline::new(
        config,
        Device::Cpu,
        backend.clone(),
        file_recognizer(&json).await,
        Box::new(IdentityTranslator::new()),
        Box::new(PacedSynthesizer),
    );
    let report = pipeline
        .run(&dir.path().join("missing.mp4"), &dir.path().join("out.mp4"))
        .await;
    assert!(matches!(report.error, Some(PipelineError::Source(_))));
    assert_eq!(report.fragments, 0);
    assert!(backend.encodes.lock().unwrap().is_empty());
    assert!(report.artifacts.is_empty());
}

#[test]
fn test_segmenter_to_synchronizer_to_renderer() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("clip.mp4");
    std::fs::write(&video, b"clip").unwrap();
    let source = SourceVideo {
        path: video,
        duration: 4.0,
        fps: None,
        width: 640,
        height: 480,
    };

    let chunks = vec![
        dubsync_core::TimedChunk::timed("Hello", 0.0, 0.5),
        dubsync_core::TimedChunk::timed(" world", 0.5, 0.9),
        dubsync_core::TimedChunk::timed(" today", 2.0, 2.4),
    ];
    let segments: Vec<Segment> = Segmenter::default().segment(&chunks, None);
    assert_eq!(segments.len(), 2);

    let audios = vec![
        SynthesizedAudio::new(vec![0.0; 1800], 1000),
        SynthesizedAudio::failed(),
    ];
    let mut arena = RunArena::create(&dir.path().join("work"), "e2e").unwrap();
    let synced = Synchronizer::new(SyncConfig::default(), 24.0)
        .synchronize(&segments, &audios, &source, &mut arena)
        .unwrap();
    assert!((synced.fragments[0].playback_ratio - 0.5).abs() < 1e-9);
    assert_eq!(synced.fragments[0].fps, Some(24.0));
    assert!(synced.fragments[1].is_silent());
    assert_eq!(synced.resynced[0].end(), synced.resynced[1].start());

    let backend = Arc::new(FakeBackend::new(4.0, true));
    let output = dir.path().join("out.mp4");
    let outcome = Renderer::new(backend, RenderConfig::default()).render(
        synced.fragments,
        &source,
        arena,
        &output,
        EncodingMode::Fast,
    );
    assert!(outcome.is_success());
    assert_eq!(outcome.encoder, Some(EncoderProfile::HardwareFast));
    assert_eq!(outcome.cleanup.removed, 2);
}

#[test]
fn test_renderer_rejects_empty_fragment_list() {
    let dir = tempfile::tempdir().unwrap();
    let arena = RunArena::create(dir.path(), "empty").unwrap();
    let source = SourceVideo {
        path: dir.path().join("x.mp4"),
        duration: 1.0,
        fps: Some(25.0),
        width: 2,
        height: 2,
    };
    let output = dir.path().join("out.mp4");
    let backend = Arc::new(FakeBackend::new(1.0, true));
    let outcome = Renderer::new(backend.clone(), RenderConfig::default()).render(
        Vec::new(),
        &source,
        arena,
        &output,
        EncodingMode::Quality,
    );
    assert!(!outcome.is_success());
    assert!(matches!(outcome.error, Some(RenderError::EmptyFragmentList)));
    assert!(!output.exists());
    assert!(backend.encodes.lock().unwrap().is_empty());
}
