//! Central error types for chitchat-decoder.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChitchatError {
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Invalid filter configuration: {0}")]
    InvalidFilterConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
