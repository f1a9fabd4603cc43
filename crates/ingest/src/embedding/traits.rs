use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    /// Transport, auth or rate-limit failure in the backend.
    #[error("Embedding unavailable: {0}")]
    Unavailable(String),

    #[error("Embedder returned {actual} vectors for {expected} texts")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedder returned an empty vector")]
    EmptyVector,

    #[error("Embedder returned a vector with NaN or infinite components")]
    NonFiniteVector,
}

/// Trait for embedding backends (OpenAI, Ollama, ONNX, etc.)
///
/// Implemented by the host; this crate performs no network I/O itself.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input text (in order).
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text]).await?;
        match vectors.len() {
            1 => Ok(vectors.remove(0)),
            actual => Err(EmbeddingError::CountMismatch { expected: 1, actual }),
        }
    }
}

/// Check that a backend answered with exactly one vector per text.
pub(crate) fn ensure_count(
    expected: usize,
    vectors: Vec<Vec<f32>>,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if vectors.len() == expected {
        Ok(vectors)
    } else {
        Err(EmbeddingError::CountMismatch {
            expected,
            actual: vectors.len(),
        })
    }
}
