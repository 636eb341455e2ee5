use crate::error::ConfigError;
use std::fmt;

/// Inference device handed to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Cuda(u32),
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(index) => write!(f, "cuda:{index}"),
        }
    }
}

/// Device choice as written in the config: fixed, or probed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSetting {
    Auto,
    Fixed(Device),
}

impl DeviceSetting {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let value = value.trim().to_ascii_lowercase();
        match value.as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Fixed(Device::Cpu)),
            "cuda" | "gpu" => Ok(Self::Fixed(Device::Cuda(0))),
            other => {
                let index = other
                    .strip_prefix("cuda:")
                    .and_then(|n| n.parse::<u32>().ok())
                    .ok_or_else(|| ConfigError::InvalidValue {
                        key: "general.device".to_string(),
                        reason: format!("expected auto, cpu, cuda or cuda:N, got '{other}'"),
                    })?;
                Ok(Self::Fixed(Device::Cuda(index)))
            }
        }
    }

    /// Resolve `Auto` with the supplied accelerator probe.
    pub fn resolve(self, cuda_available: impl FnOnce() -> bool) -> Device {
        match self {
            Self::Fixed(device) => device,
            Self::Auto if cuda_available() => Device::Cuda(0),
            Self::Auto => Device::Cpu,
        }
    }
}

/// Per-run values passed explicitly into every collaborator call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    pub run_id: String,
    pub device: Device,
    pub source_lang: String,
    pub target_lang: String,
}

impl ExecutionContext {
    pub fn new(device: Device, source_lang: &str, target_lang: &str) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().simple().to_string(),
            device,
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        }
    }

    /// First eight characters of the run id, for file prefixes and log lines.
    pub fn short_id(&self) -> &str {
        let end = self.run_id.len().min(8);
        &self.run_id[..end]
    }
}
