use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    #[error("Dimension mismatch: index holds {expected}-d vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index is empty")]
    Empty,

    #[error("No chunk recorded for vector position {0}")]
    MissingChunk(usize),
}
