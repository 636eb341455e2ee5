use crate::engine_trait::{Recognizer, Synthesizer, Translator};
use dubsync_core::EngineError;
use std::collections::HashMap;

/// Name-keyed engine factories for one collaborator kind.
pub struct EngineRegistry<E: ?Sized> {
    factories: HashMap<String, fn() -> Box<E>>,
}

pub type RecognizerRegistry = EngineRegistry<dyn Recognizer>;
pub type TranslatorRegistry = EngineRegistry<dyn Translator>;
pub type SynthesizerRegistry = EngineRegistry<dyn Synthesizer>;

impl<E: ?Sized> EngineRegistry<E> {
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<E>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<E>, EngineError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| EngineError::EngineNotFound(name.to_string()))
    }

    pub fn list_engines(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl EngineRegistry<dyn Recognizer> {
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("null", || Box::new(crate::null_engine::NullRecognizer::new()));
        registry.register("file", || Box::new(crate::file_recognizer::FileRecognizer::new()));
        registry.register("command", || Box::new(crate::command_engine::CommandRecognizer::new()));
        registry
    }
}

impl Default for EngineRegistry<dyn Recognizer> {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineRegistry<dyn Translator> {
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("identity", || {
            Box::new(crate::null_engine::IdentityTranslator::new())
        });
        registry.register("command", || Box::new(crate::command_engine::CommandTranslator::new()));
        registry
    }
}

impl Default for EngineRegistry<dyn Translator> {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineRegistry<dyn Synthesizer> {
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("null", || Box::new(crate::null_engine::NullSynthesizer::new()));
        registry.register("command", || {
            Box::new(crate::command_engine::CommandSynthesizer::new())
        });
        registry
    }
}

impl Default for EngineRegistry<dyn Synthesizer> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::null_engine::{NullRecognizer, NullSynthesizer};

    #[test]
    fn test_recognizer_registry_builtins() {
        let registry = RecognizerRegistry::new();
        assert_eq!(registry.list_engines(), vec!["command", "file", "null"]);
        assert_eq!(registry.create("null").unwrap().name(), "null");
        assert_eq!(registry.create("file").unwrap().name(), "file");
    }

    #[test]
    fn test_translator_registry_builtins() {
        let registry = TranslatorRegistry::new();
        assert_eq!(registry.create("identity").unwrap().name(), "identity");
        assert_eq!(registry.create("command").unwrap().name(), "command");
    }

    #[test]
    fn test_synthesizer_registry_builtins() {
        let registry = SynthesizerRegistry::default();
        assert_eq!(registry.list_engines(), vec!["command", "null"]);
    }

    #[test]
    fn test_registry_create_unknown_returns_error() {
        let registry = TranslatorRegistry::new();
        match registry.create("nllb") {
            Err(EngineError::EngineNotFound(name)) => assert_eq!(name, "nllb"),
            _ => panic!("expected EngineNotFound error"),
        }
    }

    #[test]
    fn test_registry_register_custom_engine() {
        let mut registry = RecognizerRegistry::empty();
        assert!(registry.create("null").is_err());
        registry.register("custom", || Box::new(NullRecognizer::new()));
        // The factory decides the engine, so the name is still "null"
        assert_eq!(registry.create("custom").unwrap().name(), "null");
    }

    #[test]
    fn test_registry_register_overwrites() {
        let mut registry = SynthesizerRegistry::new();
        registry.register("command", || Box::new(NullSynthesizer::new()));
        assert_eq!(registry.create("command").unwrap().name(), "null");
    }
}
