//! Ingestion side of chunkwise: boundary-aware chunking, the embedding
//! collaborator boundary, and a pipeline that ties them together.

pub mod chunker;
pub mod embedding;
pub mod pipeline;

pub use chunker::{chunk, chunk_text, ChunkParams};
pub use embedding::{Embedder, EmbeddingCache, EmbeddingError};
pub use pipeline::{FailedChunk, IngestPipeline, IngestReport, PublishError};
