use serde::{Deserialize, Serialize};
use std::fmt;

/// Chunk identifier: `"{source_id}#{ordinal}"`, unique within a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(String);

impl ChunkId {
    pub fn new(source_id: &str, ordinal: usize) -> Self {
        Self(format!("{source_id}#{ordinal}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bounded segment of a source document's text, tagged with its origin.
///
/// Chunks are created by the chunker and never mutated afterwards, so the
/// fields are only readable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    id: ChunkId,
    source_id: String,
    content: String,
    /// 0-based ordinal among the chunks emitted for `source_id`.
    index: usize,
}

impl Chunk {
    /// Build a chunk for position `index` of `source_id`.
    ///
    /// Public because the chunker lives in `chunkwise-ingest`; hosts should
    /// obtain chunks from the chunker rather than building them by hand.
    pub fn new(source_id: &str, index: usize, content: String) -> Self {
        Self {
            id: ChunkId::new(source_id, index),
            source_id: source_id.to_string(),
            content,
            index,
        }
    }

    pub fn id(&self) -> &ChunkId {
        &self.id
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Length of the content in characters.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// A chunk plus the vector the external embedding step computed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

impl EmbeddedChunk {
    pub fn new(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self { chunk, embedding }
    }

    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }

    /// No component is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.embedding.iter().all(|x| x.is_finite())
    }

    /// Drop the embedding, keeping only the chunk.
    pub fn into_chunk(self) -> Chunk {
        self.chunk
    }
}

/// A chunk paired with its similarity to a query. Only lives during ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_id_combines_source_and_ordinal() {
        assert_eq!(ChunkId::new("doc.txt", 3).as_str(), "doc.txt#3");
        assert_eq!(ChunkId::new("doc.txt", 0).to_string(), "doc.txt#0");
    }

    #[test]
    fn chunk_accessors() {
        let chunk = Chunk::new("notes.md", 2, "Héllo".to_string());
        assert_eq!(chunk.id().as_str(), "notes.md#2");
        assert_eq!(chunk.source_id(), "notes.md");
        assert_eq!(chunk.content(), "Héllo");
        assert_eq!(chunk.index(), 2);
        assert_eq!(chunk.char_len(), 5);
    }

    #[test]
    fn chunk_serializes_with_transparent_id() {
        let chunk = Chunk::new("a.txt", 0, "text".to_string());
        let json = serde_json::to_string(&chunk).unwrap();
        assert!(json.contains("\"id\":\"a.txt#0\""));
        assert!(json.contains("\"source_id\":\"a.txt\""));

        let back: Chunk = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chunk);
    }

    #[test]
    fn embedded_chunk_strips_to_chunk() {
        let chunk = Chunk::new("a.txt", 1, "body".to_string());
        let embedded = EmbeddedChunk::new(chunk.clone(), vec![0.5, 0.5, 0.0]);
        assert_eq!(embedded.dimensions(), 3);
        assert_eq!(embedded.into_chunk(), chunk);
    }
}
