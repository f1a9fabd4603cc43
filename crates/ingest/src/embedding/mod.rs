pub mod cache;
pub mod traits;

pub use cache::EmbeddingCache;
pub use traits::{Embedder, EmbeddingError};
