use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChunkwiseError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding has zero dimensions")]
    EmptyEmbedding,

    #[error("Embedding contains a non-finite value")]
    NonFiniteEmbedding,

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChunkwiseError>;
