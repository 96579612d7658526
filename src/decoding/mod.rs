//! Decoding: logit adjustment, filtering, sampling, and the response loop.

pub mod filter;
pub mod generator;
pub mod params;
pub mod processors;
pub mod sampler;

pub use filter::top_k_top_p_filter;
pub use generator::{DialogueGenerator, FinishReason, Reply};
pub use params::GenerationConfig;
pub use processors::{
    LogitProcessor, ProcessorChain, RepetitionPenaltyProcessor, TemperatureProcessor,
    TokenBanProcessor,
};
pub use sampler::{sample_multinomial, softmax_in_place};
