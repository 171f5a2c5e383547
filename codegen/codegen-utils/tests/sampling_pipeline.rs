//! End-to-end sampling with a scripted backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::path::Path;

use approx::assert_relative_eq;
use codegen_utils::{
    CausalLm, CodegenError, Device, GenerationParams, ModelPlan, PaddingSide, Placement,
    Precision, PromptBatch, SamplingConfig, TokenDecoder, Truncator, sample, sample_truncated,
    truncate,
};

// ============================================================================
// Test backend
// ============================================================================

/// Word-level vocabulary shared by the backend and the decoder.
const WORDS: &[&str] = &[
    "<|endoftext|>",
    "def",
    " make_walker",
    "():\n",
    "    w = walker_creator()\n",
    "    return w.get_walker()\n",
    "\n\n\n",
    "def",
    " unrelated():\n",
    "# trailing comment\n",
];

struct WordDecoder {
    words: HashMap<u32, &'static str>,
}

impl WordDecoder {
    fn new() -> Self {
        let words = WORDS
            .iter()
            .enumerate()
            .map(|(i, w)| (u32::try_from(i).unwrap(), *w))
            .collect();
        Self { words }
    }
}

impl TokenDecoder for WordDecoder {
    fn decode(&self, tokens: &[u32]) -> codegen_utils::Result<String> {
        let mut text = String::new();
        for token in tokens {
            let word = self
                .words
                .get(token)
                .ok_or_else(|| CodegenError::generation(format!("token {token} not in vocabulary")))?;
            text.push_str(word);
        }
        Ok(text)
    }
}

/// Each return slot gets a different continuation.
struct RotatingLm {
    continuations: Vec<Vec<u32>>,
}

impl CausalLm for RotatingLm {
    fn generate(
        &self,
        batch: &PromptBatch,
        params: &GenerationParams,
    ) -> codegen_utils::Result<Vec<Vec<u32>>> {
        let mut out = Vec::new();
        for prompt in batch.input_ids() {
            for slot in 0..params.num_return_sequences {
                let mut seq = prompt.clone();
                seq.extend(&self.continuations[slot % self.continuations.len()]);
                if seq.len() > params.max_length {
                    return Err(CodegenError::generation("sequence exceeds max_length"));
                }
                out.push(seq);
            }
        }
        Ok(out)
    }
}

fn backend() -> RotatingLm {
    RotatingLm {
        continuations: vec![
            vec![2, 3, 4, 5, 6, 7, 8],
            vec![2, 3, 4, 5, 9],
            vec![2, 3, 5, 0, 1, 2],
        ],
    }
}

fn config() -> SamplingConfig {
    SamplingConfig::from_json(r#"{"batch_size": 3, "max_length": 32, "seed": 7}"#).unwrap()
}

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn test_prompt_ending_in_def() {
    // End-of-text then `def`.
    let batch = PromptBatch::new(vec![vec![0, 1]]).unwrap();
    let out = sample_truncated(
        &config(),
        &backend(),
        &WordDecoder::new(),
        &batch,
        true,
        &Truncator::new().unwrap(),
    )
    .unwrap();

    let expected = "def make_walker():\n    w = walker_creator()\n    return w.get_walker()\n";
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|text| text.starts_with("def make_walker")));
    // Second def, then the blank-line run.
    assert_eq!(out[0], expected.trim_end());
    // Comment line.
    assert_eq!(out[1], expected);
    // End-of-text.
    assert_eq!(out[2], "def make_walker():\n    return w.get_walker()\n");
}

#[test]
fn test_without_add_def_prompt_is_dropped() {
    let batch = PromptBatch::new(vec![vec![0, 1]]).unwrap();
    let raw = sample(&config(), &backend(), &WordDecoder::new(), &batch, false).unwrap();
    assert!(raw[0].starts_with(" make_walker():\n"));
    assert!(raw[0].contains("def unrelated"));
    assert_eq!(
        truncate(&raw[1]).unwrap(),
        " make_walker():\n    w = walker_creator()\n    return w.get_walker()\n"
    );
}

#[test]
fn test_left_padded_batch() {
    let batch = PromptBatch::padded(vec![vec![0, 1], vec![1]], 0, PaddingSide::Left).unwrap();
    assert_eq!(batch.prompt_len(), 2);

    let out = sample(&config(), &backend(), &WordDecoder::new(), &batch, false).unwrap();
    assert_eq!(out.len(), 2 * 3);
    assert_eq!(out[0], out[3]);
}

#[test]
fn test_prompt_must_leave_room() {
    let config = config().with_max_length(2);
    let batch = PromptBatch::new(vec![vec![1, 2]]).unwrap();
    let err = sample(&config, &backend(), &WordDecoder::new(), &batch, false).unwrap_err();
    assert!(matches!(err, CodegenError::PromptTooLong { .. }));
}

#[test]
fn test_decoder_error_propagates() {
    let lm = RotatingLm {
        continuations: vec![vec![99]],
    };
    let batch = PromptBatch::new(vec![vec![1]]).unwrap();
    let err = sample(&config(), &lm, &WordDecoder::new(), &batch, false).unwrap_err();
    assert!(err.to_string().contains("99"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_from_json() {
    let config = SamplingConfig::from_json(
        r#"{"model": "codegen-6B-mono", "device": "cuda:0", "gpus": 2, "top_p": 0.9}"#,
    )
    .unwrap();
    assert_relative_eq!(config.top_p, 0.9);
    assert_relative_eq!(config.temperature, 0.8);
    assert_eq!(config.seed, 42);

    let plan = ModelPlan::resolve(&config, Path::new("/srv/elm")).unwrap();
    assert_eq!(plan.precision, Precision::Half);
    assert_eq!(
        plan.placement,
        Placement::DataParallel {
            device: Device::Cuda(0),
            device_ids: vec![0, 1],
        }
    );
    assert!(plan.checkpoint.ends_with("checkpoints/codegen-6B-mono"));
    assert_eq!(plan.tokenizer.pad_token, config.pad_token);
}

#[test]
fn test_config_json_round_trip() {
    let config = config().with_device(Device::Cuda(2)).with_temperature(0.25);
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"cuda:2\""));
    let back = SamplingConfig::from_json(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_invalid_config_rejected() {
    let err = SamplingConfig::from_json(r#"{"batch_size": 0}"#).unwrap_err();
    assert!(err.is_config_error());
    assert!(SamplingConfig::from_json(r#"{"gpus": 4}"#).is_err());
}
