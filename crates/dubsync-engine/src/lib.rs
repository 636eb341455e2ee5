pub mod command;
pub mod command_engine;
pub mod engine_trait;
pub mod file_recognizer;
pub mod null_engine;
pub mod registry;
pub mod speech;
pub mod whisper_json;

pub use command::CommandLine;
pub use command_engine::{CommandRecognizer, CommandSynthesizer, CommandTranslator};
pub use engine_trait::{Recognizer, Synthesizer, Translator};
pub use file_recognizer::FileRecognizer;
pub use null_engine::{IdentityTranslator, NullRecognizer, NullSynthesizer};
pub use registry::{EngineRegistry, RecognizerRegistry, SynthesizerRegistry, TranslatorRegistry};
pub use speech::{sanitize_for_speech, synthesize_line, translate_or_keep};
pub use whisper_json::parse_whisper_json;
