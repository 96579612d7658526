//! Model capability: the forward-pass collaborator.

pub mod demo;

pub use demo::{DemoModel, DemoTokenizer};

use crate::errors::ChitchatError;

/// Forward-pass boundary consumed by the decoder.
///
/// `forward` returns one logit row per input position, each row `vocab_size`
/// wide. The decoder only reads the final row; returning every position keeps
/// the interface shaped like the underlying inference engines.
pub trait LanguageModel: Send + Sync {
    fn vocab_size(&self) -> usize;

    fn forward(&self, input_ids: &[u32]) -> Result<Vec<Vec<f32>>, ChitchatError>;
}
