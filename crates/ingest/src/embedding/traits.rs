use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding model error: {0}")]
    Model(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedder returned {actual} vectors for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },
}

/// Trait for embedding backends (local ONNX model, feature hashing, ...).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input text (in order).
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// The dimensionality of the output vectors.
    fn dimensions(&self) -> usize;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or(EmbeddingError::CountMismatch { expected: 1, actual: 0 })
    }
}

/// Check that a backend returned one vector of the expected width per input.
pub(crate) fn check_output(
    vectors: &[Vec<f32>],
    inputs: usize,
    dimensions: usize,
) -> Result<(), EmbeddingError> {
    if vectors.len() != inputs {
        return Err(EmbeddingError::CountMismatch {
            expected: inputs,
            actual: vectors.len(),
        });
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
        return Err(EmbeddingError::DimensionMismatch {
            expected: dimensions,
            actual: bad.len(),
        });
    }
    Ok(())
}
