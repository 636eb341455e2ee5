pub mod config;
pub mod context;
pub mod emotion;
pub mod error;
pub mod srt;
pub mod types;

pub use config::{AppConfig, AsrConfig, EngineSection, RenderConfig, SegmenterConfig, SyncConfig, TranslationConfig};
pub use context::{Device, DeviceSetting, ExecutionContext};
pub use emotion::{strip_tags, AnnotatedSegment, Emotion};
pub use error::{ConfigError, EngineError, MediaError, PipelineError, RenderError};
pub use srt::{format_timestamp, to_srt, write_srt, Caption};
pub use types::{EncodingMode, ResyncedSegment, Segment, SynthesizedAudio, TimedChunk, Transcript};
