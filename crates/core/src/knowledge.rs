//! Append-only collection of embedded chunks.
//!
//! [`KnowledgeBase`] enforces that every embedding shares one dimensionality.
//! [`SharedKnowledgeBase`] adds an append-then-publish discipline so readers
//! always scan a consistent snapshot while ingestion keeps appending.

use std::sync::{Arc, PoisonError, RwLock};

use crate::document::EmbeddedChunk;
use crate::error::{ChunkwiseError, Result};

#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Vec<EmbeddedChunk>,
    dimensions: Option<usize>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a base from already-embedded chunks, validating dimensionality.
    pub fn from_embedded(entries: Vec<EmbeddedChunk>) -> Result<Self> {
        let mut base = Self::new();
        base.extend(entries)?;
        Ok(base)
    }

    /// Dimensionality fixed by the first pushed embedding.
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// Append one embedded chunk. The base is unchanged on error.
    pub fn push(&mut self, entry: EmbeddedChunk) -> Result<()> {
        let dims = Self::check(&entry, self.dimensions)?;
        self.dimensions = Some(dims);
        self.entries.push(entry);
        Ok(())
    }

    /// Append a batch. The whole batch is validated before anything is
    /// appended, so a single bad entry rejects all of it.
    pub fn extend(&mut self, batch: Vec<EmbeddedChunk>) -> Result<()> {
        let mut dims = self.dimensions;
        for entry in &batch {
            dims = Some(Self::check(entry, dims)?);
        }
        self.dimensions = dims;
        self.entries.extend(batch);
        Ok(())
    }

    fn check(entry: &EmbeddedChunk, expected: Option<usize>) -> Result<usize> {
        let actual = entry.dimensions();
        if actual == 0 {
            return Err(ChunkwiseError::EmptyEmbedding);
        }
        if !entry.is_finite() {
            return Err(ChunkwiseError::NonFiniteEmbedding);
        }
        match expected {
            Some(expected) if expected != actual => {
                Err(ChunkwiseError::DimensionMismatch { expected, actual })
            }
            _ => Ok(actual),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmbeddedChunk> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[EmbeddedChunk] {
        &self.entries
    }

    /// Distinct source ids, in the order they were first appended.
    pub fn sources(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            let source = entry.chunk.source_id();
            if !seen.contains(&source) {
                seen.push(source);
            }
        }
        seen
    }
}

/// Knowledge base shared between ingestion and retrieval.
///
/// Writers build the next version off to the side and swap it in whole;
/// readers hold an `Arc` to whichever version was current when they asked.
#[derive(Debug, Default)]
pub struct SharedKnowledgeBase {
    current: RwLock<Arc<KnowledgeBase>>,
}

impl SharedKnowledgeBase {
    pub fn new(base: KnowledgeBase) -> Self {
        Self {
            current: RwLock::new(Arc::new(base)),
        }
    }

    /// The most recently published version.
    pub fn snapshot(&self) -> Arc<KnowledgeBase> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Append `batch` and publish the result. Returns the new length.
    /// Nothing is published if the batch fails validation.
    pub fn publish(&self, batch: Vec<EmbeddedChunk>) -> Result<usize> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = KnowledgeBase::clone(&guard);
        next.extend(batch)?;
        let len = next.len();
        *guard = Arc::new(next);
        tracing::debug!(len, "published knowledge base snapshot");
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Chunk;

    fn entry(source: &str, index: usize, embedding: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk::new(Chunk::new(source, index, format!("chunk {index}")), embedding)
    }

    #[test]
    fn first_push_fixes_dimensions() {
        let mut base = KnowledgeBase::new();
        assert_eq!(base.dimensions(), None);
        base.push(entry("a", 0, vec![1.0, 0.0])).unwrap();
        assert_eq!(base.dimensions(), Some(2));
        assert_eq!(base.len(), 1);
    }

    #[test]
    fn mismatched_push_is_rejected() {
        let mut base = KnowledgeBase::new();
        base.push(entry("a", 0, vec![1.0, 0.0])).unwrap();
        let err = base.push(entry("a", 1, vec![1.0, 0.0, 0.0])).unwrap_err();
        assert!(matches!(
            err,
            ChunkwiseError::DimensionMismatch { expected: 2, actual: 3 }
        ));
        assert_eq!(base.len(), 1);
    }

    #[test]
    fn empty_embedding_is_rejected() {
        let mut base = KnowledgeBase::new();
        let err = base.push(entry("a", 0, vec![])).unwrap_err();
        assert!(matches!(err, ChunkwiseError::EmptyEmbedding));
        assert!(base.is_empty());
        assert_eq!(base.dimensions(), None);
    }

    #[test]
    fn non_finite_embedding_is_rejected() {
        let mut base = KnowledgeBase::new();
        base.push(entry("a", 0, vec![1.0, 0.0])).unwrap();
        let corrupt = [
            vec![f32::NAN, 1.0],
            vec![f32::INFINITY, 0.0],
            vec![0.0, f32::NEG_INFINITY],
        ];
        for bad in corrupt {
            let err = base.push(entry("a", 1, bad)).unwrap_err();
            assert!(matches!(err, ChunkwiseError::NonFiniteEmbedding));
        }
        assert_eq!(base.len(), 1);

        let err = KnowledgeBase::from_embedded(vec![
            entry("b", 0, vec![1.0, 0.0]),
            entry("b", 1, vec![f32::NAN, 1.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, ChunkwiseError::NonFiniteEmbedding));
    }

    #[test]
    fn extend_is_all_or_nothing() {
        let mut base = KnowledgeBase::new();
        let batch = vec![
            entry("a", 0, vec![1.0, 0.0]),
            entry("a", 1, vec![0.0, 1.0]),
            entry("a", 2, vec![0.0]),
        ];
        assert!(base.extend(batch).is_err());
        assert!(base.is_empty());
        assert_eq!(base.dimensions(), None);

        base.extend(vec![
            entry("a", 0, vec![1.0, 0.0]),
            entry("b", 0, vec![0.0, 1.0]),
        ])
        .unwrap();
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn sources_in_first_seen_order() {
        let base = KnowledgeBase::from_embedded(vec![
            entry("b.txt", 0, vec![1.0]),
            entry("a.txt", 0, vec![1.0]),
            entry("b.txt", 1, vec![1.0]),
        ])
        .unwrap();
        assert_eq!(base.sources(), vec!["b.txt", "a.txt"]);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_publish() {
        let shared = SharedKnowledgeBase::default();
        shared.publish(vec![entry("a", 0, vec![1.0, 0.0])]).unwrap();

        let before = shared.snapshot();
        let len = shared.publish(vec![entry("a", 1, vec![0.0, 1.0])]).unwrap();

        assert_eq!(len, 2);
        assert_eq!(before.len(), 1);
        assert_eq!(shared.snapshot().len(), 2);
    }

    #[test]
    fn failed_publish_keeps_previous_version() {
        let shared = SharedKnowledgeBase::default();
        shared.publish(vec![entry("a", 0, vec![1.0, 0.0])]).unwrap();
        assert!(shared.publish(vec![entry("a", 1, vec![1.0])]).is_err());
        assert_eq!(shared.snapshot().len(), 1);
    }
}
