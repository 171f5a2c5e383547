//! Tokenizer settings for code models.
//!
//! Code is dominated by indentation, so runs of spaces and tabs are added to
//! the base GPT-2 vocabulary as single tokens.

use serde::{Deserialize, Serialize};

/// Base vocabulary the code models were trained with.
pub const BASE_VOCABULARY: &str = "gpt2";

/// Token id of `<|endoftext|>` in the GPT-2 vocabulary.
pub const GPT2_END_OF_TEXT: u32 = 50256;

/// Runs of `n` spaces for `n` in `n_min..n_max`, longest first.
///
/// # Example
///
/// ```
/// use codegen_utils::whitespace_tokens;
///
/// assert_eq!(whitespace_tokens(2, 4), vec!["   ", "  "]);
/// ```
#[must_use]
pub fn whitespace_tokens(n_min: usize, n_max: usize) -> Vec<String> {
    repeated_tokens(' ', n_min, n_max)
}

/// Runs of `n` tabs for `n` in `n_min..n_max`, longest first.
#[must_use]
pub fn tab_tokens(n_min: usize, n_max: usize) -> Vec<String> {
    repeated_tokens('\t', n_min, n_max)
}

fn repeated_tokens(c: char, n_min: usize, n_max: usize) -> Vec<String> {
    (n_min..n_max).rev().map(|n| c.to_string().repeat(n)).collect()
}

/// Which end of a prompt receives padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddingSide {
    /// Pad before the prompt, so every prompt ends at the same position.
    #[default]
    Left,
    /// Pad after the prompt.
    Right,
}

/// How the tokenizer is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerSettings {
    /// Name of the pretrained base vocabulary.
    pub base: String,
    /// Tokens added on top of the base vocabulary, in insertion order.
    pub extra_tokens: Vec<String>,
    /// Whether extra tokens are registered as special tokens.
    pub special: bool,
    /// Padding side for batched prompts.
    pub padding_side: PaddingSide,
    /// Token id used for padding.
    pub pad_token: u32,
    /// Maximum model input length (`None` for unbounded).
    pub max_input_size: Option<usize>,
}

impl Default for TokenizerSettings {
    fn default() -> Self {
        Self {
            base: BASE_VOCABULARY.to_string(),
            extra_tokens: Vec::new(),
            special: false,
            padding_side: PaddingSide::Left,
            pad_token: GPT2_END_OF_TEXT,
            max_input_size: None,
        }
    }
}

impl TokenizerSettings {
    /// The code-model tokenizer: GPT-2 plus 2-31 space runs and 2-9 tab
    /// runs, padded on the left with `pad_token`.
    ///
    /// # Example
    ///
    /// ```
    /// use codegen_utils::{PaddingSide, TokenizerSettings};
    ///
    /// let settings = TokenizerSettings::custom_gpt2(50256);
    /// assert_eq!(settings.extra_token_count(), 30 + 8);
    /// assert_eq!(settings.padding_side, PaddingSide::Left);
    /// ```
    #[must_use]
    pub fn custom_gpt2(pad_token: u32) -> Self {
        Self {
            pad_token,
            ..Self::default()
        }
        .with_whitespace(2, 32)
        .with_tabs(2, 10)
    }

    /// Add space runs of length `n_min..n_max`.
    #[must_use]
    pub fn with_whitespace(mut self, n_min: usize, n_max: usize) -> Self {
        self.extra_tokens.extend(whitespace_tokens(n_min, n_max));
        self
    }

    /// Add tab runs of length `n_min..n_max`.
    #[must_use]
    pub fn with_tabs(mut self, n_min: usize, n_max: usize) -> Self {
        self.extra_tokens.extend(tab_tokens(n_min, n_max));
        self
    }

    /// Set the padding side.
    #[must_use]
    pub fn with_padding_side(mut self, side: PaddingSide) -> Self {
        self.padding_side = side;
        self
    }

    /// Register extra tokens as special tokens.
    #[must_use]
    pub fn as_special(mut self) -> Self {
        self.special = true;
        self
    }

    /// Number of tokens added to the base vocabulary.
    #[must_use]
    pub fn extra_token_count(&self) -> usize {
        self.extra_tokens.len()
    }
}
