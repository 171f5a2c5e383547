//! Model setup and batched sampling.
//!
//! Loading weights and running the transformer belong to an inference
//! backend. This module decides everything around it (precision, placement,
//! seeding, generation parameters) and talks to the backend through
//! [`CausalLm`] and [`TokenDecoder`].

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::CodegenError;
use crate::config::{Device, SamplingConfig};
use crate::tokenizer::{PaddingSide, TokenizerSettings};
use crate::truncate::Truncator;

/// A deterministic random number generator for `seed`.
///
/// # Example
///
/// ```
/// use codegen_utils::seeded_rng;
/// use rand::Rng;
///
/// let a: u64 = seeded_rng(7).r#gen();
/// let b: u64 = seeded_rng(7).r#gen();
/// assert_eq!(a, b);
/// ```
#[must_use]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Numeric precision of model weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// 16-bit floats.
    Half,
    /// 32-bit floats.
    Full,
}

/// How a model is laid out across devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Whole model on one device.
    Single(Device),
    /// Replicated across devices, with each batch split between them.
    DataParallel {
        /// Device holding the primary replica.
        device: Device,
        /// Ordinals of every participating device.
        device_ids: Vec<usize>,
    },
}

/// Everything an inference backend needs to load a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPlan {
    /// Checkpoint directory.
    pub checkpoint: PathBuf,
    /// Weight precision.
    pub precision: Precision,
    /// Device layout.
    pub placement: Placement,
    /// Tokenizer to pair with the model.
    pub tokenizer: TokenizerSettings,
    /// Seed for every random number generator.
    pub seed: u64,
    /// Whether backend kernels must be deterministic.
    pub deterministic: bool,
}

impl ModelPlan {
    /// Work out how to load the model described by `config`.
    pub fn resolve(config: &SamplingConfig, project_root: &Path) -> crate::Result<Self> {
        config.validate()?;

        let precision = if config.use_fp16() {
            Precision::Half
        } else {
            Precision::Full
        };

        let placement = if config.gpus > 1 {
            Placement::DataParallel {
                device: config.device,
                device_ids: (0..config.gpus).collect(),
            }
        } else {
            Placement::Single(config.device)
        };

        let plan = Self {
            checkpoint: config.checkpoint_path(project_root),
            precision,
            placement,
            tokenizer: TokenizerSettings::custom_gpt2(config.pad_token),
            seed: config.seed,
            deterministic: true,
        };

        info!(
            model = %config.model,
            device = %config.device,
            precision = ?plan.precision,
            gpus = config.gpus,
            "resolved model plan"
        );
        Ok(plan)
    }

    /// A fresh generator seeded with [`ModelPlan::seed`].
    ///
    /// Backends draw every sampling decision from this, so two runs of the
    /// same plan produce the same completions.
    #[must_use]
    pub fn rng(&self) -> StdRng {
        seeded_rng(self.seed)
    }
}

/// Arguments handed to [`CausalLm::generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Sample instead of greedy decoding.
    pub do_sample: bool,
    /// Sequences returned per prompt.
    pub num_return_sequences: usize,
    /// Softmax temperature.
    pub temperature: f64,
    /// Nucleus sampling mass.
    pub top_p: f64,
    /// Total sequence length, prompt included.
    pub max_length: usize,
    /// Padding token id.
    pub pad_token_id: u32,
    /// Reuse attention key/value caches between steps.
    pub use_cache: bool,
}

impl GenerationParams {
    /// Parameters for prompts of `prompt_len` tokens.
    #[must_use]
    pub fn for_prompt(config: &SamplingConfig, prompt_len: usize) -> Self {
        Self {
            do_sample: true,
            num_return_sequences: config.batch_size,
            temperature: config.temperature,
            top_p: config.top_p,
            max_length: prompt_len + config.max_length,
            pad_token_id: config.pad_token,
            use_cache: true,
        }
    }
}

/// Tokenized prompts of equal length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBatch {
    input_ids: Vec<Vec<u32>>,
}

impl PromptBatch {
    /// Wrap already-padded prompts.
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::InvalidBatch`] if the batch is empty or the
    /// prompts differ in length.
    pub fn new(input_ids: Vec<Vec<u32>>) -> crate::Result<Self> {
        let Some(first) = input_ids.first() else {
            return Err(CodegenError::invalid_batch("no prompts"));
        };
        let len = first.len();
        if let Some(i) = input_ids.iter().position(|ids| ids.len() != len) {
            return Err(CodegenError::invalid_batch(format!(
                "prompt {i} has {} tokens, prompt 0 has {len}",
                input_ids[i].len()
            )));
        }
        Ok(Self { input_ids })
    }

    /// Pad prompts of any length to the longest one.
    pub fn padded(prompts: Vec<Vec<u32>>, pad_token: u32, side: PaddingSide) -> crate::Result<Self> {
        let longest = prompts.iter().map(Vec::len).max().unwrap_or(0);
        let input_ids = prompts
            .into_iter()
            .map(|ids| {
                let padding = std::iter::repeat_n(pad_token, longest - ids.len());
                match side {
                    PaddingSide::Left => padding.chain(ids).collect(),
                    PaddingSide::Right => ids.into_iter().chain(padding).collect(),
                }
            })
            .collect();
        Self::new(input_ids)
    }

    /// Prompts in the batch.
    #[must_use]
    pub fn input_ids(&self) -> &[Vec<u32>] {
        &self.input_ids
    }

    /// Tokens per prompt.
    #[must_use]
    pub fn prompt_len(&self) -> usize {
        self.input_ids.first().map_or(0, Vec::len)
    }

    /// Number of prompts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    /// Always false; an empty batch cannot be built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// A causal language model backend.
pub trait CausalLm {
    /// Generate full sequences (prompt included) for every prompt in `batch`.
    fn generate(&self, batch: &PromptBatch, params: &GenerationParams) -> crate::Result<Vec<Vec<u32>>>;
}

/// Turns token ids back into text.
pub trait TokenDecoder {
    /// Decode one sequence.
    fn decode(&self, tokens: &[u32]) -> crate::Result<String>;

    /// Decode many sequences.
    fn batch_decode(&self, sequences: &[Vec<u32>]) -> crate::Result<Vec<String>> {
        sequences.iter().map(|tokens| self.decode(tokens)).collect()
    }
}

/// Sample completions for `batch`, returning only the generated text.
///
/// The first `prompt_len` tokens of every sequence are the prompt and are
/// dropped. With `add_def`, the prompt's last token (a trailing `def`) is
/// kept so the completion reads as a whole function.
///
/// # Errors
///
/// Returns [`CodegenError::PromptTooLong`] if the prompt is not shorter than
/// `config.max_length`, or whatever the backend reports.
pub fn sample<M, D>(
    config: &SamplingConfig,
    model: &M,
    decoder: &D,
    batch: &PromptBatch,
    add_def: bool,
) -> crate::Result<Vec<String>>
where
    M: CausalLm + ?Sized,
    D: TokenDecoder + ?Sized,
{
    let prompt_len = batch.prompt_len();
    if prompt_len >= config.max_length {
        return Err(CodegenError::PromptTooLong {
            prompt_len,
            max_length: config.max_length,
        });
    }

    let params = GenerationParams::for_prompt(config, prompt_len);
    let sequences = model.generate(batch, &params)?;

    let skip = if add_def {
        prompt_len.saturating_sub(1)
    } else {
        prompt_len
    };
    let generated: Vec<Vec<u32>> = sequences
        .into_iter()
        .map(|mut tokens| tokens.split_off(skip.min(tokens.len())))
        .collect();

    debug!(
        prompts = batch.len(),
        prompt_len,
        sequences = generated.len(),
        "sampled completions"
    );
    decoder.batch_decode(&generated)
}

/// [`sample`], then cut every completion at the stop markers.
pub fn sample_truncated<M, D>(
    config: &SamplingConfig,
    model: &M,
    decoder: &D,
    batch: &PromptBatch,
    add_def: bool,
    truncator: &Truncator,
) -> crate::Result<Vec<String>>
where
    M: CausalLm + ?Sized,
    D: TokenDecoder + ?Sized,
{
    let completions = sample(config, model, decoder, batch, add_def)?;
    Ok(completions
        .iter()
        .map(|text| truncator.truncate(text).to_string())
        .collect())
}
