//! Sampling configuration.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CodegenError;
use crate::tokenizer::GPT2_END_OF_TEXT;

/// Model-name prefix of checkpoints that only fit in half precision.
const HALF_PRECISION_ONLY: &str = "codegen-16B";

/// Where a model runs.
///
/// Parses from and serializes to `"cpu"`, `"cuda"` (device 0) or `"cuda:N"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Device {
    /// Host CPU.
    #[default]
    Cpu,
    /// CUDA device with the given ordinal.
    Cuda(usize),
}

impl Device {
    /// Check if this is the host CPU.
    #[must_use]
    pub const fn is_cpu(self) -> bool {
        matches!(self, Self::Cpu)
    }
}

impl FromStr for Device {
    type Err = CodegenError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "cpu" => Ok(Self::Cpu),
            "cuda" => Ok(Self::Cuda(0)),
            _ => s
                .strip_prefix("cuda:")
                .and_then(|ordinal| ordinal.parse().ok())
                .map(Self::Cuda)
                .ok_or_else(|| CodegenError::UnknownDevice(s.to_string())),
        }
    }
}

impl TryFrom<String> for Device {
    type Error = CodegenError;

    fn try_from(s: String) -> crate::Result<Self> {
        s.parse()
    }
}

impl From<Device> for String {
    fn from(device: Device) -> Self {
        device.to_string()
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(ordinal) => write!(f, "cuda:{ordinal}"),
        }
    }
}

/// Configuration for a sampling run.
///
/// # Example
///
/// ```
/// use codegen_utils::{Device, SamplingConfig};
///
/// let config = SamplingConfig::default()
///     .with_device(Device::Cuda(0))
///     .with_temperature(0.5);
/// assert!(config.validate().is_ok());
/// assert!(config.use_fp16());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Seed for every random number generator.
    pub seed: u64,
    /// Device the model runs on.
    pub device: Device,
    /// Request half-precision weights.
    pub fp16: bool,
    /// Checkpoint name under `checkpoints/`.
    pub model: String,
    /// Number of GPUs to split batches across.
    pub gpus: usize,
    /// Completions returned per prompt.
    pub batch_size: usize,
    /// Softmax temperature.
    pub temperature: f64,
    /// Nucleus sampling mass.
    pub top_p: f64,
    /// Tokens generated past the prompt. Prompts must be shorter than this.
    pub max_length: usize,
    /// Padding token id.
    pub pad_token: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            device: Device::Cpu,
            fp16: true,
            model: "codegen-350M-mono".to_string(),
            gpus: 1,
            batch_size: 32,
            temperature: 0.8,
            top_p: 0.95,
            max_length: 512,
            pad_token: GPT2_END_OF_TEXT,
        }
    }
}

impl SamplingConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the device.
    #[must_use]
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Set the checkpoint name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the number of GPUs.
    #[must_use]
    pub fn with_gpus(mut self, gpus: usize) -> Self {
        self.gpus = gpus;
        self
    }

    /// Set the completions per prompt.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the nucleus sampling mass.
    #[must_use]
    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    /// Set the generation length.
    #[must_use]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Request full precision.
    #[must_use]
    pub fn without_fp16(mut self) -> Self {
        self.fp16 = false;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err(CodegenError::invalid_config(format!(
                "temperature must be positive and finite, got {}",
                self.temperature
            )));
        }

        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(CodegenError::invalid_config(format!(
                "top_p must be in (0, 1], got {}",
                self.top_p
            )));
        }

        if self.batch_size == 0 {
            return Err(CodegenError::invalid_config("batch_size must be at least 1"));
        }

        if self.max_length == 0 {
            return Err(CodegenError::invalid_config("max_length must be at least 1"));
        }

        if self.model.is_empty() {
            return Err(CodegenError::invalid_config("model name is empty"));
        }

        if self.gpus > 1 && self.device.is_cpu() {
            return Err(CodegenError::invalid_config(format!(
                "{} GPUs requested on a cpu device",
                self.gpus
            )));
        }

        Ok(())
    }

    /// Whether weights are loaded in half precision.
    ///
    /// Half precision is never used on the CPU, except for checkpoints too
    /// large to load any other way.
    #[must_use]
    pub fn use_fp16(&self) -> bool {
        if self.model.starts_with(HALF_PRECISION_ONLY) {
            return true;
        }
        self.fp16 && !self.device.is_cpu()
    }

    /// `<project_root>/checkpoints/<model>`.
    #[must_use]
    pub fn checkpoint_path(&self, project_root: &Path) -> PathBuf {
        project_root.join("checkpoints").join(&self.model)
    }
}
