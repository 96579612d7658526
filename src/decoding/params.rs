//! Generation parameters and their validation.

use crate::errors::ChitchatError;
use std::time::Duration;

/// Sampling and loop-control parameters for one generator.
///
/// The defaults are the dialogue response policy: top-k 8 with nucleus
/// filtering disabled, inert repetition penalty and temperature, at most 25
/// new tokens, a context window of the 5 most recent turns.
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    /// Keep only the k highest-scoring entries before sampling (0 disables).
    pub top_k: usize,
    /// Nucleus threshold; keep the smallest prefix whose cumulative
    /// probability exceeds it (<= 0.0 disables).
    pub top_p: f32,
    /// Every logit is divided by this before filtering.
    pub temperature: f32,
    /// Logits of already-generated ids are divided by this (1.0 = inert).
    pub repetition_penalty: f32,
    /// Hard cap on generated tokens per response.
    pub max_new_tokens: usize,
    /// How many of the most recent turns are assembled into model input.
    pub history_window: usize,
    /// Fixed RNG seed for reproducible sampling; entropy-seeded when `None`.
    pub seed: Option<u64>,
    /// Per-response wall-clock budget, checked once per iteration.
    pub deadline: Option<Duration>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            top_k: 8,
            top_p: 0.0,
            temperature: 1.0,
            repetition_penalty: 1.0,
            max_new_tokens: 25,
            history_window: 5,
            seed: None,
            deadline: None,
        }
    }
}

impl GenerationConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject parameter combinations that cannot yield a sampleable
    /// distribution. Called before the first model invocation.
    pub fn validate(&self) -> Result<(), ChitchatError> {
        if self.top_k == 0 && self.top_p <= 0.0 {
            return Err(ChitchatError::InvalidFilterConfig(
                "top_k and top_p are both disabled".to_string(),
            ));
        }
        if !(self.temperature > 0.0) {
            return Err(ChitchatError::InvalidFilterConfig(format!(
                "temperature must be positive, got {}",
                self.temperature
            )));
        }
        if !(self.repetition_penalty > 0.0) {
            return Err(ChitchatError::InvalidFilterConfig(format!(
                "repetition penalty must be positive, got {}",
                self.repetition_penalty
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(ChitchatError::InvalidFilterConfig(format!(
                "top_p must be in [0, 1], got {}",
                self.top_p
            )));
        }
        if self.history_window == 0 {
            return Err(ChitchatError::InvalidFilterConfig(
                "history window must include at least the current turn".to_string(),
            ));
        }
        Ok(())
    }
}
