/// End-to-end flow: chunk documents, embed them with a keyword embedder,
/// publish into a shared knowledge base and retrieve against a query.

use std::sync::Arc;

use async_trait::async_trait;

use chunkwise_core::config::EmbeddingConfig;
use chunkwise_core::SharedKnowledgeBase;
use chunkwise_ingest::{ChunkParams, Embedder, EmbeddingError, IngestPipeline};
use chunkwise_retrieval::Retriever;

// ============================================================================
// Test Helpers
// ============================================================================

const VOCABULARY: &[&str] = &["rust", "borrow", "ocean", "whale", "coffee", "espresso"];

/// Counts vocabulary words, one dimension per word.
struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| keyword_vector(t)).collect())
    }
}

fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    VOCABULARY
        .iter()
        .map(|word| lower.matches(word).count() as f32)
        .collect()
}

fn pipeline() -> IngestPipeline {
    let config = EmbeddingConfig {
        batch_size: 2,
        concurrency: 2,
        cache_capacity: 32,
    };
    IngestPipeline::new(Arc::new(KeywordEmbedder), &config)
}

fn params() -> ChunkParams {
    ChunkParams::new(60, 20).unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn query_finds_chunks_from_the_right_document() {
    let pipeline = pipeline();
    let base = SharedKnowledgeBase::default();

    let rust_doc = "Rust checks every borrow at compile time.\n\n\
                    The borrow checker keeps Rust programs memory safe.";
    let sea_doc = "A whale can dive deep into the ocean.\n\n\
                   The ocean is home to the blue whale.";
    let cafe_doc = "Espresso is strong coffee.\n\nCoffee beans are roasted before brewing.";

    let documents = [
        ("rust.md", rust_doc),
        ("sea.md", sea_doc),
        ("cafe.md", cafe_doc),
    ];
    for (source, text) in documents {
        let report = pipeline
            .ingest_into(&base, text, source, &params())
            .await
            .unwrap();
        assert!(report.is_complete());
        assert!(report.total_chunks() >= 1);
    }

    let snapshot = base.snapshot();
    assert_eq!(snapshot.sources(), vec!["rust.md", "sea.md", "cafe.md"]);
    assert_eq!(snapshot.dimensions(), Some(VOCABULARY.len()));

    let query = pipeline
        .embed_query("where does the whale swim in the ocean")
        .await
        .unwrap();
    let results = Retriever::new(&snapshot).top_k(&query, 2).unwrap();

    assert_eq!(results.len(), 2);
    for chunk in &results {
        assert_eq!(chunk.source_id(), "sea.md");
    }
}

#[tokio::test]
async fn snapshot_taken_before_ingest_stays_stable() {
    let pipeline = pipeline();
    let base = SharedKnowledgeBase::default();

    pipeline
        .ingest_into(&base, "Coffee first.", "a.md", &params())
        .await
        .unwrap();
    let before = base.snapshot();

    pipeline
        .ingest_into(&base, "More espresso and coffee.", "b.md", &params())
        .await
        .unwrap();

    assert_eq!(before.len(), 1);
    assert_eq!(base.snapshot().len(), 2);

    let query = keyword_vector("coffee");
    let results = Retriever::new(&before).top_k(&query, 5).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source_id(), "a.md");
}
