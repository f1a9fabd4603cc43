use std::num::NonZeroUsize;

use lru::LruCache;

/// LRU cache mapping chunk text to its embedding vector.
///
/// A capacity of zero disables caching: lookups always miss and `put` is a
/// no-op.
pub struct EmbeddingCache {
    cache: Option<LruCache<String, Vec<f32>>>,
    hits: u64,
    misses: u64,
}

impl EmbeddingCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: NonZeroUsize::new(capacity).map(LruCache::new),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a cached embedding by text.
    pub fn get(&mut self, text: &str) -> Option<Vec<f32>> {
        match self.cache.as_mut().and_then(|c| c.get(text)) {
            Some(vec) => {
                self.hits += 1;
                Some(vec.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store an embedding for a text.
    pub fn put(&mut self, text: &str, embedding: Vec<f32>) {
        if let Some(cache) = self.cache.as_mut() {
            cache.put(text.to_string(), embedding);
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn len(&self) -> usize {
        self.cache.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
