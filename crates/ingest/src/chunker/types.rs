//! Chunking parameters.

use chunkwise_core::config::ChunkingConfig;
use chunkwise_core::{ChunkwiseError, Result};

/// Default maximum chunk length in characters.
pub const DEFAULT_TARGET_SIZE: usize = 800;

/// Default overlap budget in characters.
pub const DEFAULT_OVERLAP: usize = 100;

/// Size parameters for [`chunk_text`](super::chunk_text).
///
/// Always satisfies `target_size > 0` and `overlap < target_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkParams {
    target_size: usize,
    overlap: usize,
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkParams {
    pub fn new(target_size: usize, overlap: usize) -> Result<Self> {
        if target_size == 0 {
            return Err(ChunkwiseError::InvalidParams(
                "target_size must be greater than zero".into(),
            ));
        }
        if overlap >= target_size {
            return Err(ChunkwiseError::InvalidParams(format!(
                "overlap ({overlap}) must be smaller than target_size ({target_size})"
            )));
        }
        Ok(Self { target_size, overlap })
    }

    /// Maximum chunk length in characters.
    pub fn target_size(&self) -> usize {
        self.target_size
    }

    /// Maximum characters of trailing context carried into the next chunk.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Whether a paragraph of `len` characters stays a single unit.
    /// The cut-off is half the target size, exclusive.
    pub fn keeps_paragraph_whole(&self, len: usize) -> bool {
        len.saturating_mul(2) < self.target_size
    }
}

impl TryFrom<&ChunkingConfig> for ChunkParams {
    type Error = ChunkwiseError;

    fn try_from(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.target_size, config.overlap)
    }
}
