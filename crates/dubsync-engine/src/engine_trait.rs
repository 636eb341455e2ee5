use async_trait::async_trait;
use dubsync_core::{EngineError, ExecutionContext, SynthesizedAudio, Transcript};
use std::path::Path;

/// Speech recognizer producing timestamped chunks for a whole audio track.
#[async_trait]
pub trait Recognizer: Send + Sync {
    fn name(&self) -> &str;
    async fn initialize(&mut self, config: toml::Value) -> Result<(), EngineError>;
    async fn transcribe(
        &self,
        audio_path: &Path,
        ctx: &ExecutionContext,
    ) -> Result<Transcript, EngineError>;
    async fn shutdown(&self) -> Result<(), EngineError>;
}

/// Text translator between the context's source and target languages.
#[async_trait]
pub trait Translator: Send + Sync {
    fn name(&self) -> &str;
    async fn initialize(&mut self, config: toml::Value) -> Result<(), EngineError>;
    async fn translate(&self, text: &str, ctx: &ExecutionContext) -> Result<String, EngineError>;
    async fn shutdown(&self) -> Result<(), EngineError>;
}

/// Text-to-speech engine. Returns mono samples and their rate.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    fn name(&self) -> &str;
    async fn initialize(&mut self, config: toml::Value) -> Result<(), EngineError>;
    async fn synthesize(
        &self,
        text: &str,
        ctx: &ExecutionContext,
    ) -> Result<SynthesizedAudio, EngineError>;
    async fn shutdown(&self) -> Result<(), EngineError>;
}
