//! Boundary-aware text chunking.
//!
//! Splits a document into overlapping chunks suitable for independent
//! embedding: paragraphs first, sentences for long paragraphs, fixed-length
//! slices for anything still too long. Units are packed greedily and each
//! new chunk is seeded with whole trailing units of the previous one.

mod helpers;
mod packing;
mod types;

pub use packing::{chunk, chunk_text};
pub use types::ChunkParams;
