use crate::command::CommandLine;
use crate::engine_trait::{Recognizer, Synthesizer, Translator};
use crate::whisper_json::parse_whisper_json;
use async_trait::async_trait;
use dubsync_core::{EngineError, ExecutionContext, SynthesizedAudio, Transcript};
use std::path::Path;

fn not_initialized(engine: &str) -> EngineError {
    EngineError::ProcessingFailed(format!("{engine} engine used before initialize"))
}

/// Recognizer backed by an external program that prints Whisper JSON.
///
/// Placeholders: `{input}` (audio path), `{device}`, `{source}`.
pub struct CommandRecognizer {
    command: Option<CommandLine>,
}

impl CommandRecognizer {
    pub fn new() -> Self {
        Self { command: None }
    }
}

impl Default for CommandRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Recognizer for CommandRecognizer {
    fn name(&self) -> &str {
        "command"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), EngineError> {
        let command = CommandLine::from_options(&config, "asr")?;
        tracing::info!(program = command.program(), "CommandRecognizer initialized");
        self.command = Some(command);
        Ok(())
    }

    async fn transcribe(
        &self,
        audio_path: &Path,
        ctx: &ExecutionContext,
    ) -> Result<Transcript, EngineError> {
        let command = self.command.as_ref().ok_or_else(|| not_initialized("asr"))?;
        let input = audio_path.to_string_lossy().into_owned();
        let device = ctx.device.to_string();
        let stdout = command
            .run(
                &[
                    ("input", input.as_str()),
                    ("device", device.as_str()),
                    ("source", ctx.source_lang.as_str()),
                ],
                None,
            )
            .await?;
        parse_whisper_json(&stdout)
    }

    async fn shutdown(&self) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Translator that pipes each line through an external program.
///
/// Placeholders: `{source}`, `{target}`, `{device}`.
pub struct CommandTranslator {
    command: Option<CommandLine>,
}

impl CommandTranslator {
    pub fn new() -> Self {
        Self { command: None }
    }
}

impl Default for CommandTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for CommandTranslator {
    fn name(&self) -> &str {
        "command"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), EngineError> {
        let command = CommandLine::from_options(&config, "translation")?;
        tracing::info!(program = command.program(), "CommandTranslator initialized");
        self.command = Some(command);
        Ok(())
    }

    async fn translate(&self, text: &str, ctx: &ExecutionContext) -> Result<String, EngineError> {
        let command = self
            .command
            .as_ref()
            .ok_or_else(|| not_initialized("translation"))?;
        let device = ctx.device.to_string();
        let stdout = command
            .run(
                &[
                    ("source", ctx.source_lang.as_str()),
                    ("target", ctx.target_lang.as_str()),
                    ("device", device.as_str()),
                ],
                Some(text),
            )
            .await?;
        let translated = stdout.trim();
        if translated.is_empty() {
            return Err(EngineError::ProcessingFailed(
                "translator produced no output".to_string(),
            ));
        }
        Ok(translated.to_string())
    }

    async fn shutdown(&self) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Synthesizer that runs an external program writing a WAV file.
///
/// Text is sent on stdin. Placeholders: `{output}` (WAV path to write),
/// `{target}`, `{device}`.
pub struct CommandSynthesizer {
    command: Option<CommandLine>,
}

impl CommandSynthesizer {
    pub fn new() -> Self {
        Self { command: None }
    }
}

impl Default for CommandSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Synthesizer for CommandSynthesizer {
    fn name(&self) -> &str {
        "command"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), EngineError> {
        let command = CommandLine::from_options(&config, "tts")?;
        tracing::info!(program = command.program(), "CommandSynthesizer initialized");
        self.command = Some(command);
        Ok(())
    }

    async fn synthesize(
        &self,
        text: &str,
        ctx: &ExecutionContext,
    ) -> Result<SynthesizedAudio, EngineError> {
        let command = self.command.as_ref().ok_or_else(|| not_initialized("tts"))?;
        let wav = tempfile::Builder::new()
            .prefix(&format!("dubsync-tts-{}-", ctx.short_id()))
            .suffix(".wav")
            .tempfile()
            .map_err(|e| EngineError::ProcessingFailed(format!("temp file: {e}")))?
            .into_temp_path();
        let output = wav.to_string_lossy().into_owned();
        let device = ctx.device.to_string();
        command
            .run(
                &[
                    ("output", output.as_str()),
                    ("target", ctx.target_lang.as_str()),
                    ("device", device.as_str()),
                ],
                Some(text),
            )
            .await?;

        let (samples, sample_rate) = dubsync_media::read_wav_mono(&wav)
            .map_err(|e| EngineError::ProcessingFailed(e.to_string()))?;
        if samples.is_empty() {
            return Err(EngineError::ProcessingFailed(
                "synthesizer wrote an empty WAV".to_string(),
            ));
        }
        Ok(SynthesizedAudio::new(samples, sample_rate))
    }

    async fn shutdown(&self) -> Result<(), EngineError> {
        Ok(())
    }
}
