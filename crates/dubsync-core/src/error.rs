use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine initialization failed: {0}")]
    InitializationFailed(String),

    #[error("engine processing failed: {0}")]
    ProcessingFailed(String),

    #[error("engine not found: {0}")]
    EngineNotFound(String),
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("cannot open source video {path}: {reason}")]
    SourceOpen { path: String, reason: String },

    #[error("failed to launch {tool}: {source}")]
    ToolLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("malformed probe output: {0}")]
    Probe(String),

    #[error("WAV error: {0}")]
    Wav(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no fragments to render")]
    EmptyFragmentList,

    #[error("encoding failed: {0}")]
    Encode(#[from] MediaError),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot prepare working directory: {0}")]
    Workspace(MediaError),

    #[error("source video unavailable: {0}")]
    Source(MediaError),

    #[error("audio extraction failed: {0}")]
    Extraction(MediaError),

    #[error("recognition failed: {0}")]
    Recognition(EngineError),

    #[error("no dialogue detected")]
    NoDialogue,

    #[error("synchronization failed: {0}")]
    Synchronization(MediaError),

    #[error("render failed: {0}")]
    Render(RenderError),

    #[error("failed to write artifact {path}: {source}")]
    Artifact {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("worker task failed: {0}")]
    Worker(String),
}
