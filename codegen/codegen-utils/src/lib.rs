//! Glue for code-generating language models.
//!
//! Walker programs are produced by sampling a causal language model and
//! cleaning up what it writes. This crate covers everything around the model
//! itself:
//!
//! - [`SamplingConfig`] - Seed, device, precision and generation settings
//! - [`TokenizerSettings`] - GPT-2 vocabulary extended with indentation runs
//! - [`ModelPlan`] - How a checkpoint is loaded and placed on devices
//! - [`sample`] - Batched generation through a [`CausalLm`] backend
//! - [`truncate`] - Cutting completions at heuristic stop markers
//!
//! Running the transformer is left to a backend implementing [`CausalLm`]
//! and [`TokenDecoder`].
//!
//! # Example
//!
//! ```
//! use codegen_utils::{SamplingConfig, truncate};
//!
//! let config = SamplingConfig::default();
//! assert!(config.validate().is_ok());
//!
//! let text = truncate("def f():\n    return 1\n# junk").unwrap();
//! assert_eq!(text, "def f():\n    return 1\n");
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_errors_doc)]

mod config;
mod error;
mod sampling;
mod tokenizer;
mod truncate;

pub use config::{Device, SamplingConfig};
pub use error::CodegenError;
pub use sampling::{
    CausalLm, GenerationParams, ModelPlan, Placement, Precision, PromptBatch, TokenDecoder,
    sample, sample_truncated, seeded_rng,
};
pub use tokenizer::{
    BASE_VOCABULARY, GPT2_END_OF_TEXT, PaddingSide, TokenizerSettings, tab_tokens,
    whitespace_tokens,
};
pub use truncate::{DEFAULT_TERMINALS, Truncator, truncate};

/// Result type for code-generation operations.
pub type Result<T> = std::result::Result<T, CodegenError>;
