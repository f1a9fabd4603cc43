use rayon::prelude::*;
use tracing::debug;

use chunkwise_core::{Chunk, ChunkwiseError, EmbeddedChunk, KnowledgeBase, Result, ScoredChunk};

use crate::similarity::cosine_similarity;

pub const DEFAULT_TOP_K: usize = 5;

fn scores(query: &[f32], base: &[EmbeddedChunk]) -> Result<Vec<f32>> {
    base.par_iter()
        .map(|entry| cosine_similarity(query, &entry.embedding))
        .collect()
}

/// Score every entry against `query`, in insertion order.
pub fn score_all(query: &[f32], base: &[EmbeddedChunk]) -> Result<Vec<ScoredChunk>> {
    let scores = scores(query, base)?;
    Ok(base
        .iter()
        .zip(scores)
        .map(|(entry, score)| ScoredChunk {
            chunk: entry.chunk.clone(),
            score,
        })
        .collect())
}

/// The `k` best-scoring entries, best first. Ties keep insertion order.
pub fn rank(query: &[f32], base: &[EmbeddedChunk], k: usize) -> Result<Vec<ScoredChunk>> {
    if k == 0 || base.is_empty() {
        return Ok(Vec::new());
    }
    let scores = scores(query, base)?;

    let mut order: Vec<usize> = (0..base.len()).collect();
    // `sort_by` is stable.
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order.truncate(k);

    debug!(scored = base.len(), returned = order.len(), "ranked chunks");
    Ok(order
        .into_iter()
        .map(|i| ScoredChunk {
            chunk: base[i].chunk.clone(),
            score: scores[i],
        })
        .collect())
}

/// Like [`rank`], keeping only the chunks.
pub fn top_k(query: &[f32], base: &[EmbeddedChunk], k: usize) -> Result<Vec<Chunk>> {
    Ok(rank(query, base, k)?
        .into_iter()
        .map(|scored| scored.chunk)
        .collect())
}

/// Read-only retrieval over one knowledge base snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Retriever<'a> {
    base: &'a KnowledgeBase,
}

impl<'a> Retriever<'a> {
    pub fn new(base: &'a KnowledgeBase) -> Self {
        Self { base }
    }

    /// Reject a malformed query before scoring anything.
    fn check_query(&self, query: &[f32]) -> Result<()> {
        if !query.iter().all(|x| x.is_finite()) {
            return Err(ChunkwiseError::NonFiniteEmbedding);
        }
        match self.base.dimensions() {
            Some(expected) if expected != query.len() => Err(ChunkwiseError::DimensionMismatch {
                expected,
                actual: query.len(),
            }),
            _ => Ok(()),
        }
    }

    pub fn rank(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        self.check_query(query)?;
        rank(query, self.base.as_slice(), k)
    }

    pub fn top_k(&self, query: &[f32], k: usize) -> Result<Vec<Chunk>> {
        self.check_query(query)?;
        top_k(query, self.base.as_slice(), k)
    }
}
