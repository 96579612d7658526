//! Tokenizer capability: encode/decode and reserved-id lookup.
//!
//! The decoder consumes tokenization through the [`DialogueTokenizer`] trait
//! so hosts can plug in a real vocabulary or a test double.

use crate::errors::ChitchatError;
use std::path::Path;

/// Text <-> token-id boundary consumed by the decoder.
///
/// `decode_tokens` is token-level: it returns one string per id, without
/// merging subwords into words. The decoder concatenates them verbatim.
pub trait DialogueTokenizer: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<u32>, ChitchatError>;

    fn decode_tokens(&self, ids: &[u32]) -> Result<Vec<String>, ChitchatError>;

    /// Start-of-input marker prepended to every model input.
    fn bos_token_id(&self) -> u32;

    /// Utterance boundary; sampling it terminates a response.
    fn sep_token_id(&self) -> u32;

    /// Out-of-vocabulary id; never eligible for generation.
    fn unk_token_id(&self) -> u32;

    fn vocab_size(&self) -> usize;
}

/// BERT-style reserved token strings used by dialogue checkpoints.
const BOS_TOKEN: &str = "[CLS]";
const SEP_TOKEN: &str = "[SEP]";
const UNK_TOKEN: &str = "[UNK]";

/// Wrapper around a HuggingFace `tokenizers` vocabulary.
pub struct HfTokenizer {
    tokenizer: tokenizers::Tokenizer,
    bos_id: u32,
    sep_id: u32,
    unk_id: u32,
}

impl HfTokenizer {
    /// Load from a tokenizer JSON file (e.g. tokenizer.json) and resolve the
    /// reserved ids. Fails if any reserved token is missing from the vocab.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ChitchatError> {
        let tokenizer = tokenizers::Tokenizer::from_file(path.as_ref())
            .map_err(|e| ChitchatError::Encoding(e.to_string()))?;
        let lookup = |token: &str| {
            tokenizer.token_to_id(token).ok_or_else(|| {
                ChitchatError::Encoding(format!("vocabulary has no {token} token"))
            })
        };
        let bos_id = lookup(BOS_TOKEN)?;
        let sep_id = lookup(SEP_TOKEN)?;
        let unk_id = lookup(UNK_TOKEN)?;
        Ok(Self {
            tokenizer,
            bos_id,
            sep_id,
            unk_id,
        })
    }
}

impl DialogueTokenizer for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, ChitchatError> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| ChitchatError::Encoding(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode_tokens(&self, ids: &[u32]) -> Result<Vec<String>, ChitchatError> {
        ids.iter()
            .map(|&id| {
                self.tokenizer
                    .id_to_token(id)
                    .ok_or_else(|| ChitchatError::Encoding(format!("id {id} not in vocabulary")))
            })
            .collect()
    }

    fn bos_token_id(&self) -> u32 {
        self.bos_id
    }

    fn sep_token_id(&self) -> u32 {
        self.sep_id
    }

    fn unk_token_id(&self) -> u32 {
        self.unk_id
    }

    fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }
}
