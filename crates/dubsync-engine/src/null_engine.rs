use crate::engine_trait::{Recognizer, Synthesizer, Translator};
use async_trait::async_trait;
use dubsync_core::{EngineError, ExecutionContext, SynthesizedAudio, Transcript};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Recognizer that never hears anything.
pub struct NullRecognizer;

impl NullRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Recognizer for NullRecognizer {
    fn name(&self) -> &str {
        "null"
    }

    async fn initialize(&mut self, _config: toml::Value) -> Result<(), EngineError> {
        Ok(())
    }

    async fn transcribe(
        &self,
        audio_path: &Path,
        ctx: &ExecutionContext,
    ) -> Result<Transcript, EngineError> {
        tracing::trace!(run = ctx.short_id(), path = %audio_path.display(), "NullRecognizer transcribe");
        Ok(Transcript::default())
    }

    async fn shutdown(&self) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Translator that returns its input unchanged.
pub struct IdentityTranslator {
    calls: AtomicUsize,
}

impl IdentityTranslator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Default for IdentityTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for IdentityTranslator {
    fn name(&self) -> &str {
        "identity"
    }

    async fn initialize(&mut self, _config: toml::Value) -> Result<(), EngineError> {
        Ok(())
    }

    async fn translate(&self, text: &str, _ctx: &ExecutionContext) -> Result<String, EngineError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(text.to_string())
    }

    async fn shutdown(&self) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Synthesizer that produces no audio, so every line renders silent.
pub struct NullSynthesizer {
    calls: AtomicUsize,
}

impl NullSynthesizer {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Default for NullSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Synthesizer for NullSynthesizer {
    fn name(&self) -> &str {
        "null"
    }

    async fn initialize(&mut self, _config: toml::Value) -> Result<(), EngineError> {
        Ok(())
    }

    async fn synthesize(
        &self,
        _text: &str,
        _ctx: &ExecutionContext,
    ) -> Result<SynthesizedAudio, EngineError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(SynthesizedAudio::failed())
    }

    async fn shutdown(&self) -> Result<(), EngineError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dubsync_core::Device;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(Device::Cpu, "eng_Latn", "por_Latn")
    }

    #[tokio::test]
    async fn test_null_recognizer_returns_empty_transcript() {
        let mut engine = NullRecognizer::new();
        engine
            .initialize(toml::Value::Table(Default::default()))
            .await
            .unwrap();
        let transcript = engine.transcribe(Path::new("a.wav"), &ctx()).await.unwrap();
        assert!(transcript.chunks.is_empty());
        assert!(transcript.text.is_empty());
        assert!(engine.shutdown().await.is_ok());
    }

    #[tokio::test]
    async fn test_identity_translator_echoes() {
        let engine = IdentityTranslator::new();
        assert_eq!(engine.translate("hello", &ctx()).await.unwrap(), "hello");
        assert_eq!(engine.call_count(), 1);
    }

    #[tokio::test]
    async fn test_null_synthesizer_yields_no_samples() {
        let engine = NullSynthesizer::new();
        let audio = engine.synthesize("ola", &ctx()).await.unwrap();
        assert!(audio.samples.is_none());
        assert!(audio.voiced().is_none());
        assert_eq!(engine.call_count(), 1);
    }

    #[test]
    fn test_null_engines_implement_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NullRecognizer>();
        assert_send_sync::<IdentityTranslator>();
        assert_send_sync::<NullSynthesizer>();
    }
}
