//! Document ingestion: chunk, embed, collect.
//!
//! Embedding runs in batches with a bounded number in flight. A failed batch
//! is retried one chunk at a time so a single bad chunk only removes itself
//! from the result instead of aborting the whole document.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{info, instrument, warn};

use chunkwise_core::config::EmbeddingConfig;
use chunkwise_core::{Chunk, ChunkwiseError, EmbeddedChunk, SharedKnowledgeBase};

use crate::chunker::{chunk_text, ChunkParams};
use crate::embedding::traits::ensure_count;
use crate::embedding::{Embedder, EmbeddingCache, EmbeddingError};

/// A chunk that could not be embedded, and why.
#[derive(Debug, Clone)]
pub struct FailedChunk {
    pub chunk: Chunk,
    pub error: EmbeddingError,
}

/// Outcome of ingesting one document.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub source_id: String,
    /// Successfully embedded chunks, in chunk order.
    pub embedded: Vec<EmbeddedChunk>,
    pub failed: Vec<FailedChunk>,
}

impl IngestReport {
    pub fn total_chunks(&self) -> usize {
        self.embedded.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The knowledge base refused a document's embedded chunks.
///
/// Carries the full report so the embeddings are not lost; the caller can
/// retry the publish or persist them elsewhere.
#[derive(Debug, Error)]
#[error("failed to publish chunks of {}: {error}", .report.source_id)]
pub struct PublishError {
    pub report: IngestReport,
    #[source]
    pub error: ChunkwiseError,
}

pub struct IngestPipeline {
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
    concurrency: usize,
    cache: Mutex<EmbeddingCache>,
}

impl IngestPipeline {
    pub fn new(embedder: Arc<dyn Embedder>, config: &EmbeddingConfig) -> Self {
        Self {
            embedder,
            batch_size: config.batch_size.max(1),
            concurrency: config.concurrency.max(1),
            cache: Mutex::new(EmbeddingCache::new(config.cache_capacity)),
        }
    }

    fn cache(&self) -> MutexGuard<'_, EmbeddingCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `(hits, misses)` of the embedding cache so far.
    pub fn cache_stats(&self) -> (u64, u64) {
        let cache = self.cache();
        (cache.hits(), cache.misses())
    }

    /// Chunk `text` and embed every chunk.
    ///
    /// Never fails as a whole: chunks whose embedding fails end up in
    /// [`IngestReport::failed`].
    #[instrument(skip_all, fields(source_id = %source_id))]
    pub async fn ingest(
        &self,
        text: &str,
        source_id: &str,
        params: &ChunkParams,
    ) -> IngestReport {
        let chunks = chunk_text(text, source_id, params);
        self.embed_chunks(source_id, chunks, None).await
    }

    /// Ingest a document and publish its embedded chunks to `base` in one
    /// step. Chunks whose dimensionality differs from the base are reported
    /// as failed rather than rejecting the whole document.
    ///
    /// The base can change while embeddings are in flight. If the publish
    /// is then refused, the report comes back inside the error.
    pub async fn ingest_into(
        &self,
        base: &SharedKnowledgeBase,
        text: &str,
        source_id: &str,
        params: &ChunkParams,
    ) -> Result<IngestReport, PublishError> {
        let expected = base.snapshot().dimensions();
        let chunks = chunk_text(text, source_id, params);
        let report = self.embed_chunks(source_id, chunks, expected).await;
        match base.publish(report.embedded.clone()) {
            Ok(_) => Ok(report),
            Err(error) => {
                warn!(source_id, error = %error, "knowledge base refused document");
                Err(PublishError { report, error })
            }
        }
    }

    /// Embed already-chunked text.
    ///
    /// `expected_dimensions` pins the vector length; when `None`, the first
    /// successfully embedded chunk decides it.
    pub async fn embed_chunks(
        &self,
        source_id: &str,
        chunks: Vec<Chunk>,
        expected_dimensions: Option<usize>,
    ) -> IngestReport {
        let batches: Vec<Vec<Chunk>> = chunks
            .chunks(self.batch_size)
            .map(<[Chunk]>::to_vec)
            .collect();

        // `buffered` keeps batch order, so the report stays in chunk order.
        let outcomes: Vec<Vec<(Chunk, Result<Vec<f32>, EmbeddingError>)>> = stream::iter(batches)
            .map(|batch| self.embed_batch(batch))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = IngestReport {
            source_id: source_id.to_string(),
            ..IngestReport::default()
        };
        let mut dimensions = expected_dimensions;

        for (chunk, outcome) in outcomes.into_iter().flatten() {
            let checked = outcome.and_then(|vector| check_vector(vector, &mut dimensions));
            match checked {
                Ok(vector) => report.embedded.push(EmbeddedChunk::new(chunk, vector)),
                Err(error) => {
                    warn!(
                        chunk_id = %chunk.id(),
                        error = %error,
                        "chunk embedding failed, skipping"
                    );
                    report.failed.push(FailedChunk { chunk, error });
                }
            }
        }

        let hit_rate = self.cache().hit_rate();
        info!(
            source_id,
            embedded = report.embedded.len(),
            failed = report.failed.len(),
            cache_hit_rate = hit_rate,
            "ingested document"
        );
        report
    }

    /// Embed a query, going through the same cache as chunk embeddings.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let cached = self.cache().get(text);
        if let Some(vector) = cached {
            return Ok(vector);
        }
        let vector = check_vector(self.embedder.embed(text).await?, &mut None)?;
        self.cache().put(text, vector.clone());
        Ok(vector)
    }

    async fn embed_batch(
        &self,
        batch: Vec<Chunk>,
    ) -> Vec<(Chunk, Result<Vec<f32>, EmbeddingError>)> {
        let mut slots: Vec<Option<Result<Vec<f32>, EmbeddingError>>> = {
            let mut cache = self.cache();
            batch
                .iter()
                .map(|chunk| cache.get(chunk.content()).map(Ok))
                .collect()
        };
        let missing: Vec<usize> = (0..batch.len()).filter(|&i| slots[i].is_none()).collect();

        if !missing.is_empty() {
            let texts: Vec<&str> = missing.iter().map(|&i| batch[i].content()).collect();
            let result = self
                .embedder
                .embed_batch(&texts)
                .await
                .and_then(|vectors| ensure_count(texts.len(), vectors));

            match result {
                Ok(vectors) => {
                    for (&i, vector) in missing.iter().zip(vectors) {
                        slots[i] = Some(Ok(vector));
                    }
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        size = texts.len(),
                        "batch embedding failed, retrying chunks individually"
                    );
                    for &i in &missing {
                        slots[i] = Some(self.embedder.embed(batch[i].content()).await);
                    }
                }
            }

            let mut cache = self.cache();
            for &i in &missing {
                if let Some(Ok(vector)) = &slots[i] {
                    cache.put(batch[i].content(), vector.clone());
                }
            }
            drop(cache);
        }

        batch
            .into_iter()
            .zip(slots)
            .map(|(chunk, slot)| {
                let outcome = slot.unwrap_or(Err(EmbeddingError::CountMismatch {
                    expected: 1,
                    actual: 0,
                }));
                (chunk, outcome)
            })
            .collect()
    }
}

fn check_vector(
    vector: Vec<f32>,
    dimensions: &mut Option<usize>,
) -> Result<Vec<f32>, EmbeddingError> {
    if vector.is_empty() {
        return Err(EmbeddingError::EmptyVector);
    }
    if !vector.iter().all(|x| x.is_finite()) {
        return Err(EmbeddingError::NonFiniteVector);
    }
    match *dimensions {
        Some(expected) if expected != vector.len() => Err(EmbeddingError::DimensionMismatch {
            expected,
            actual: vector.len(),
        }),
        Some(_) => Ok(vector),
        None => {
            *dimensions = Some(vector.len());
            Ok(vector)
        }
    }
}
