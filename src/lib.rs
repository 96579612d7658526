//! # chitchat-decoder
//!
//! Dialogue response decoding for autoregressive language models in pure Rust.
//!
//! ## Architecture
//!
//! - **History assembly**: recent turns are flattened into one model input,
//!   delimited by the start marker and separator ids
//! - **Logit processors**: repetition penalty, temperature, unknown-token ban
//! - **Filtering**: combined top-k and nucleus (top-p) truncation
//! - **Decoding loop**: multinomial sampling until the separator token or the
//!   length cap, with the model and tokenizer injected as trait objects

pub mod decoding;
pub mod errors;
pub mod history;
pub mod model;
pub mod server;
pub mod tokenizer;

pub use decoding::{
    sample_multinomial, softmax_in_place, top_k_top_p_filter, DialogueGenerator, FinishReason,
    GenerationConfig, LogitProcessor, ProcessorChain, Reply, RepetitionPenaltyProcessor,
    TemperatureProcessor, TokenBanProcessor,
};
pub use errors::ChitchatError;
pub use history::{assemble_input, History, Utterance};
pub use model::{DemoModel, DemoTokenizer, LanguageModel};
pub use tokenizer::{DialogueTokenizer, HfTokenizer};
