use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed catalog data: {0}")]
    DataFormat(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Cannot build an index over an empty corpus")]
    EmptyCorpus,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
