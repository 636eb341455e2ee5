use crate::context::DeviceSetting;
use crate::error::ConfigError;
use crate::types::EncodingMode;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub segmenter: SegmenterConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub asr: AsrConfig,

    #[serde(default = "default_translation_section")]
    pub translation: TranslationConfig,

    #[serde(default)]
    pub tts: EngineSection,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_device")]
    pub device: String,

    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            device: default_device(),
            work_dir: default_work_dir(),
        }
    }
}

impl GeneralConfig {
    pub fn device_setting(&self) -> Result<DeviceSetting, ConfigError> {
        DeviceSetting::parse(&self.device)
    }
}

/// Line-breaking policy for turning recognizer chunks into subtitle segments.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SegmenterConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    #[serde(default = "default_max_duration")]
    pub max_duration: f64,

    #[serde(default = "default_min_break_pause")]
    pub min_break_pause: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            max_duration: default_max_duration(),
            min_break_pause: default_min_break_pause(),
        }
    }
}

/// Duration-matching policy applied per segment.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SyncConfig {
    /// Spans at or below this length (seconds) are skipped.
    #[serde(default = "default_min_span")]
    pub min_span: f64,

    #[serde(default = "default_min_ratio")]
    pub min_ratio: f64,

    #[serde(default = "default_max_ratio")]
    pub max_ratio: f64,

    /// Ratios within `1.0 ± stretch_tolerance` leave playback unscaled.
    #[serde(default = "default_stretch_tolerance")]
    pub stretch_tolerance: f64,

    /// Trailing silence appended to every written audio asset (seconds).
    #[serde(default = "default_audio_pad")]
    pub audio_pad: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            min_span: default_min_span(),
            min_ratio: default_min_ratio(),
            max_ratio: default_max_ratio(),
            stretch_tolerance: default_stretch_tolerance(),
            audio_pad: default_audio_pad(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default)]
    pub mode: EncodingMode,

    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,

    #[serde(default = "default_fps")]
    pub default_fps: f64,

    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    #[serde(default = "default_cleanup_attempts")]
    pub cleanup_attempts: u32,

    #[serde(default = "default_cleanup_backoff_ms")]
    pub cleanup_backoff_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: EncodingMode::default(),
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
            default_fps: default_fps(),
            audio_bitrate: default_audio_bitrate(),
            cleanup_attempts: default_cleanup_attempts(),
            cleanup_backoff_ms: default_cleanup_backoff_ms(),
        }
    }
}

/// Engine name plus an engine-specific options table.
#[derive(Debug, Deserialize, Clone)]
pub struct EngineSection {
    #[serde(default = "default_engine")]
    pub engine: String,

    #[serde(default = "empty_table")]
    pub options: toml::Value,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            options: empty_table(),
        }
    }
}

/// Recognizer selection. Reads transcripts from files unless told otherwise.
#[derive(Debug, Deserialize, Clone)]
pub struct AsrConfig {
    #[serde(default = "default_recognizer")]
    pub engine: String,

    #[serde(default = "empty_table")]
    pub options: toml::Value,
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            engine: default_recognizer(),
            options: empty_table(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranslationConfig {
    #[serde(default = "default_translator")]
    pub engine: String,

    #[serde(default = "default_source_lang")]
    pub source_lang: String,

    #[serde(default = "default_target_lang")]
    pub target_lang: String,

    #[serde(default = "empty_table")]
    pub options: toml::Value,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        default_translation_section()
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_device() -> String {
    "auto".to_string()
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_max_chars() -> usize {
    80
}

fn default_max_duration() -> f64 {
    7.0
}

fn default_min_break_pause() -> f64 {
    0.5
}

fn default_min_span() -> f64 {
    0.1
}

fn default_min_ratio() -> f64 {
    0.1
}

fn default_max_ratio() -> f64 {
    10.0
}

fn default_stretch_tolerance() -> f64 {
    0.05
}

fn default_audio_pad() -> f64 {
    0.2
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_fps() -> f64 {
    24.0
}

fn default_audio_bitrate() -> String {
    "192k".to_string()
}

fn default_cleanup_attempts() -> u32 {
    3
}

fn default_cleanup_backoff_ms() -> u64 {
    500
}

fn default_engine() -> String {
    "null".to_string()
}

fn default_recognizer() -> String {
    "file".to_string()
}

fn default_translator() -> String {
    "identity".to_string()
}

fn default_source_lang() -> String {
    "eng_Latn".to_string()
}

fn default_target_lang() -> String {
    "por_Latn".to_string()
}

fn default_translation_section() -> TranslationConfig {
    TranslationConfig {
        engine: default_translator(),
        source_lang: default_source_lang(),
        target_lang: default_target_lang(),
        options: empty_table(),
    }
}

fn empty_table() -> toml::Value {
    toml::Value::Table(Default::default())
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::InvalidValue {
        key: "${...}".to_string(),
        reason: e.to_string(),
    })?;
    let mut result = input.to_string();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        let val = std::env::var(var_name)
            .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
        result = result.replace(&cap[0], &val);
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.general.device_setting()?;
        if self.segmenter.max_chars == 0 {
            return Err(invalid("segmenter.max_chars", "must be positive"));
        }
        if self.segmenter.max_duration <= 0.0 {
            return Err(invalid("segmenter.max_duration", "must be positive"));
        }
        if !(self.sync.min_ratio > 0.0 && self.sync.min_ratio <= self.sync.max_ratio) {
            return Err(invalid(
                "sync.min_ratio",
                "must be positive and not exceed sync.max_ratio",
            ));
        }
        if self.render.default_fps <= 0.0 {
            return Err(invalid("render.default_fps", "must be positive"));
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
