//! Error types for code-generation utilities.

use thiserror::Error;

/// Errors that can occur while configuring or running generation.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// Device string not understood.
    #[error("unknown device: {0:?} (expected \"cpu\", \"cuda\" or \"cuda:N\")")]
    UnknownDevice(String),

    /// Prompt leaves no room for generated tokens.
    #[error("prompt of {prompt_len} tokens does not fit max_length {max_length}")]
    PromptTooLong {
        /// Tokens in the prompt.
        prompt_len: usize,
        /// Configured generation length.
        max_length: usize,
    },

    /// Prompt batch is malformed.
    #[error("invalid prompt batch: {reason}")]
    InvalidBatch {
        /// Description of the problem.
        reason: String,
    },

    /// The language model failed.
    #[error("generation failed: {reason}")]
    Generation {
        /// Description of the failure.
        reason: String,
    },

    /// A stop pattern failed to compile.
    #[error("invalid stop pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration JSON could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodegenError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create an invalid batch error.
    #[must_use]
    pub fn invalid_batch(reason: impl Into<String>) -> Self {
        Self::InvalidBatch {
            reason: reason.into(),
        }
    }

    /// Create a generation error. Intended for [`crate::CausalLm`] and
    /// [`crate::TokenDecoder`] implementations.
    #[must_use]
    pub fn generation(reason: impl Into<String>) -> Self {
        Self::Generation {
            reason: reason.into(),
        }
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. } | Self::UnknownDevice(_) | Self::Json(_)
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodegenError::PromptTooLong {
            prompt_len: 600,
            max_length: 512,
        };
        let msg = err.to_string();
        assert!(msg.contains("600"));
        assert!(msg.contains("512"));

        let err = CodegenError::UnknownDevice("tpu".to_string());
        assert!(err.to_string().contains("tpu"));

        let err = CodegenError::generation("out of memory");
        assert!(err.to_string().contains("out of memory"));
    }

    #[test]
    fn test_error_predicates() {
        assert!(CodegenError::invalid_config("x").is_config_error());
        assert!(CodegenError::UnknownDevice(String::new()).is_config_error());
        assert!(!CodegenError::invalid_batch("empty").is_config_error());
    }

    #[test]
    fn test_pattern_error_conversion() {
        let regex_err = regex::Regex::new("(").unwrap_err();
        let err = CodegenError::from(regex_err);
        assert!(matches!(err, CodegenError::Pattern(_)));
    }
}
