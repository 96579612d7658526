//! The decoding loop: turn one user utterance plus history into a response.

use crate::decoding::filter::top_k_top_p_filter;
use crate::decoding::params::GenerationConfig;
use crate::decoding::processors::{
    ProcessorChain, RepetitionPenaltyProcessor, TemperatureProcessor, TokenBanProcessor,
};
use crate::decoding::sampler::{sample_multinomial, softmax_in_place};
use crate::errors::ChitchatError;
use crate::history::{assemble_input, History};
use crate::model::LanguageModel;
use crate::tokenizer::DialogueTokenizer;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Why a response stopped growing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinishReason {
    /// The separator token was sampled.
    Stop,
    /// The new-token cap was reached.
    Length,
    /// The configured deadline elapsed mid-response.
    Deadline,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::Stop => "stop",
            FinishReason::Length => "length",
            FinishReason::Deadline => "deadline",
        }
    }
}

/// One generated response.
#[derive(Clone, Debug)]
pub struct Reply {
    /// Token strings concatenated with no separator.
    pub text: String,
    pub token_ids: Vec<u32>,
    pub finish_reason: FinishReason,
}

/// Dialogue response generator: owns the sampling policy, borrows the model
/// and tokenizer as shared collaborators.
pub struct DialogueGenerator {
    model: Arc<dyn LanguageModel>,
    tokenizer: Arc<dyn DialogueTokenizer>,
    config: GenerationConfig,
    processors: ProcessorChain,
    rng: ChaCha8Rng,
}

impl DialogueGenerator {
    /// Build a generator. Fails with `InvalidFilterConfig` before any model
    /// invocation if the parameters cannot yield a sampleable distribution.
    pub fn new(
        model: Arc<dyn LanguageModel>,
        tokenizer: Arc<dyn DialogueTokenizer>,
        config: GenerationConfig,
    ) -> Result<Self, ChitchatError> {
        config.validate()?;
        let processors = ProcessorChain::new()
            .add(RepetitionPenaltyProcessor::new(config.repetition_penalty))
            .add(TemperatureProcessor::new(config.temperature))
            .add(TokenBanProcessor::new(vec![tokenizer.unk_token_id()]));
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self {
            model,
            tokenizer,
            config,
            processors,
            rng,
        })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate a response to `text` given the session history.
    ///
    /// The encoded input is appended to `history` before decoding and the
    /// generated utterance after, so the caller's history stays ready for
    /// the next turn.
    pub fn respond(&mut self, text: &str, history: &mut History) -> Result<Reply, ChitchatError> {
        let utterance = self.tokenizer.encode(text)?;
        history.push(utterance);

        let input_ids = assemble_input(
            history,
            self.config.history_window,
            self.tokenizer.bos_token_id(),
            self.tokenizer.sep_token_id(),
        );
        debug!(prompt_tokens = input_ids.len(), "starting decode");

        let (generated, finish_reason) = self.decode(input_ids)?;
        history.push(generated.clone());

        let text = self.tokenizer.decode_tokens(&generated)?.concat();
        debug!(
            generated_tokens = generated.len(),
            finish_reason = finish_reason.as_str(),
            "decode finished"
        );
        Ok(Reply {
            text,
            token_ids: generated,
            finish_reason,
        })
    }

    /// The sampling loop: one model invocation, one sampled token per
    /// iteration, until the separator, the token cap, or the deadline.
    fn decode(
        &mut self,
        mut input_ids: Vec<u32>,
    ) -> Result<(Vec<u32>, FinishReason), ChitchatError> {
        let vocab_size = self.model.vocab_size();
        let sep_id = self.tokenizer.sep_token_id();
        let started = Instant::now();

        let mut generated: Vec<u32> = Vec::with_capacity(self.config.max_new_tokens);
        let mut finish_reason = FinishReason::Length;

        for _ in 0..self.config.max_new_tokens {
            if let Some(deadline) = self.config.deadline {
                if started.elapsed() >= deadline {
                    finish_reason = FinishReason::Deadline;
                    break;
                }
            }

            let rows = self.model.forward(&input_ids)?;
            let mut logits = rows.into_iter().last().ok_or_else(|| {
                ChitchatError::Inference("model returned no positions".to_string())
            })?;
            if logits.len() != vocab_size {
                return Err(ChitchatError::Inference(format!(
                    "expected {} logits, got {}",
                    vocab_size,
                    logits.len()
                )));
            }

            self.processors.process(&mut logits, &generated)?;
            top_k_top_p_filter(&mut logits, self.config.top_k, self.config.top_p);
            softmax_in_place(&mut logits)?;
            let next_id = sample_multinomial(&logits, &mut self.rng)?;

            if next_id == sep_id {
                finish_reason = FinishReason::Stop;
                break;
            }
            generated.push(next_id);
            input_ids.push(next_id);
        }

        Ok((generated, finish_reason))
    }
}
