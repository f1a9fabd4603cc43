//! Similarity scoring and top-K selection over embedded chunks.
//!
//! A linear scan: every chunk is scored against the query, then a stable
//! descending sort picks the best `k`. Suited to a single-user knowledge
//! base, not to large corpora.

pub mod ranking;
pub mod similarity;

pub use ranking::{rank, score_all, top_k, Retriever, DEFAULT_TOP_K};
pub use similarity::cosine_similarity;
