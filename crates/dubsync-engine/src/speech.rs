use crate::engine_trait::{Synthesizer, Translator};
use dubsync_core::{ExecutionContext, SynthesizedAudio};

/// Keep only characters speech engines handle reliably.
pub fn sanitize_for_speech(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || " ,.?!".contains(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Translate one line, falling back to the original text on failure.
pub async fn translate_or_keep(
    translator: &dyn Translator,
    text: &str,
    ctx: &ExecutionContext,
) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }
    match translator.translate(text, ctx).await {
        Ok(translated) => translated,
        Err(e) => {
            tracing::warn!(run = ctx.short_id(), "translation failed, keeping original: {e}");
            text.to_string()
        }
    }
}

/// Synthesize one line. Blank text and engine errors yield silent audio.
pub async fn synthesize_line(
    synthesizer: &dyn Synthesizer,
    text: &str,
    ctx: &ExecutionContext,
) -> SynthesizedAudio {
    let clean = sanitize_for_speech(text);
    if clean.is_empty() {
        tracing::debug!(run = ctx.short_id(), "nothing speakable in {text:?}");
        return SynthesizedAudio::failed();
    }
    match synthesizer.synthesize(&clean, ctx).await {
        Ok(audio) => audio,
        Err(e) => {
            tracing::warn!(run = ctx.short_id(), "synthesis failed, line will be silent: {e}");
            SynthesizedAudio::failed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::null_engine::{IdentityTranslator, NullSynthesizer};
    use async_trait::async_trait;
    use dubsync_core::{Device, EngineError};

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(Device::Cpu, "eng_Latn", "por_Latn")
    }

    struct FailingTranslator;

    #[async_trait]
    impl Translator for FailingTranslator {
        fn name(&self) -> &str {
            "failing"
        }
        async fn initialize(&mut self, _config: toml::Value) -> Result<(), EngineError> {
            Ok(())
        }
        async fn translate(&self, _text: &str, _ctx: &ExecutionContext) -> Result<String, EngineError> {
            Err(EngineError::ProcessingFailed("model crashed".to_string()))
        }
        async fn shutdown(&self) -> Result<(), EngineError> {
            Ok(())
        }
    }

    struct ToneSynthesizer;

    #[async_trait]
    impl Synthesizer for ToneSynthesizer {
        fn name(&self) -> &str {
            "tone"
        }
        async fn initialize(&mut self, _config: toml::Value) -> Result<(), EngineError> {
            Ok(())
        }
        async fn synthesize(&self, text: &str, _ctx: &ExecutionContext) -> Result<SynthesizedAudio, EngineError> {
            if text.contains("boom") {
                return Err(EngineError::ProcessingFailed("oom".to_string()));
            }
            Ok(SynthesizedAudio::new(vec![0.1; text.len() * 100], 1000))
        }
        async fn shutdown(&self) -> Result<(), EngineError> {
            Ok(())
        }
    }

    #[test]
    fn test_sanitize_for_speech() {
        assert_eq!(sanitize_for_speech("  Olá, mundo! (teste) #1?  "), "Olá, mundo! teste 1?");
        assert_eq!(sanitize_for_speech("♪ ♪"), "");
        assert_eq!(sanitize_for_speech("a-b"), "ab");
    }

    #[tokio::test]
    async fn test_translate_or_keep_falls_back() {
        assert_eq!(translate_or_keep(&FailingTranslator, "hello", &ctx()).await, "hello");
        let identity = IdentityTranslator::new();
        assert_eq!(translate_or_keep(&identity, "hello", &ctx()).await, "hello");
        assert_eq!(identity.call_count(), 1);
    }

    #[tokio::test]
    async fn test_translate_or_keep_skips_blank() {
        let identity = IdentityTranslator::new();
        assert_eq!(translate_or_keep(&identity, "  ", &ctx()).await, "  ");
        assert_eq!(identity.call_count(), 0);
    }

    #[tokio::test]
    async fn test_synthesize_line_blank_skips_engine() {
        let synth = NullSynthesizer::new();
        let audio = synthesize_line(&synth, "♪ ... ♪", &ctx()).await;
        assert!(audio.samples.is_none());
        // "..." survives sanitizing, so the engine is still called once
        assert_eq!(synth.call_count(), 1);

        let audio = synthesize_line(&synth, "♪♪", &ctx()).await;
        assert!(audio.samples.is_none());
        assert_eq!(synth.call_count(), 1);
    }

    #[tokio::test]
    async fn test_synthesize_line_degrades_errors() {
        let audio = synthesize_line(&ToneSynthesizer, "boom", &ctx()).await;
        assert!(audio.samples.is_none());
        let audio = synthesize_line(&ToneSynthesizer, "ok!", &ctx()).await;
        assert_eq!(audio.duration(), Some(0.3));
    }
}
