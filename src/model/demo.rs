//! Deterministic demo collaborators for tests and the CLI demo mode.
//!
//! The demo model produces pseudo-random logits that depend only on the seed
//! and the token prefix, so earlier positions keep their logits as the input
//! grows, like a causal transformer.

use super::LanguageModel;
use crate::errors::ChitchatError;
use crate::tokenizer::DialogueTokenizer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Small stand-in model with seeded pseudo-random logits.
pub struct DemoModel {
    vocab_size: usize,
    seed: u64,
}

impl DemoModel {
    pub fn new(vocab_size: usize, seed: u64) -> Self {
        Self { vocab_size, seed }
    }
}

impl LanguageModel for DemoModel {
    fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn forward(&self, input_ids: &[u32]) -> Result<Vec<Vec<f32>>, ChitchatError> {
        if input_ids.is_empty() {
            return Err(ChitchatError::Inference(
                "input_ids must not be empty".to_string(),
            ));
        }
        let mut rows = Vec::with_capacity(input_ids.len());
        let mut state = self.seed;
        for &id in input_ids {
            // FNV-style fold of the prefix; each position's logits depend
            // only on the tokens up to and including it.
            state = state
                .wrapping_mul(0x0000_0100_0000_01b3)
                .wrapping_add(u64::from(id) + 1);
            let mut rng = StdRng::seed_from_u64(state);
            let row: Vec<f32> = (0..self.vocab_size)
                .map(|_| rng.gen_range(-4.0f32..4.0))
                .collect();
            rows.push(row);
        }
        Ok(rows)
    }
}

/// Reserved ids used by [`DemoTokenizer`].
pub const DEMO_BOS_ID: u32 = 0;
pub const DEMO_SEP_ID: u32 = 1;
pub const DEMO_UNK_ID: u32 = 2;

/// Word-hash tokenizer over a tiny fixed vocabulary. Ids 0..3 are reserved
/// for the start marker, separator, and unknown token.
pub struct DemoTokenizer {
    vocab_size: usize,
}

impl DemoTokenizer {
    pub fn new(vocab_size: usize) -> Self {
        assert!(vocab_size > 3, "vocab must hold the reserved ids");
        Self { vocab_size }
    }
}

impl Default for DemoTokenizer {
    fn default() -> Self {
        Self::new(64)
    }
}

impl DialogueTokenizer for DemoTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, ChitchatError> {
        let reserved = 3u64;
        let span = self.vocab_size as u64 - reserved;
        Ok(text
            .split_whitespace()
            .map(|word| {
                let h = word.bytes().fold(0u64, |acc, b| {
                    acc.wrapping_mul(31).wrapping_add(u64::from(b))
                });
                (reserved + h % span) as u32
            })
            .collect())
    }

    fn decode_tokens(&self, ids: &[u32]) -> Result<Vec<String>, ChitchatError> {
        ids.iter()
            .map(|&id| {
                if (id as usize) < self.vocab_size {
                    Ok(format!("<{id}>"))
                } else {
                    Err(ChitchatError::Encoding(format!("id {id} not in vocabulary")))
                }
            })
            .collect()
    }

    fn bos_token_id(&self) -> u32 {
        DEMO_BOS_ID
    }

    fn sep_token_id(&self) -> u32 {
        DEMO_SEP_ID
    }

    fn unk_token_id(&self) -> u32 {
        DEMO_UNK_ID
    }

    fn vocab_size(&self) -> usize {
        self.vocab_size
    }
}
