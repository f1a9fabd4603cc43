use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ChunkwiseError, Result};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

/// Host-side settings. The chunker and retriever never read this; hosts pass
/// the relevant values to them explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `CHUNKWISE_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("CHUNKWISE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            chunking: ChunkingConfig::from_env_profiled(p),
            retrieval: RetrievalConfig::from_env_profiled(p),
            embedding: EmbeddingConfig::from_env_profiled(p),
        }
    }

    /// Parse a TOML document. Missing sections and fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ChunkwiseError::Config(e.to_string()))
    }

    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config");
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.chunking;
        if c.target_size == 0 {
            return Err(ChunkwiseError::Config("chunking.target_size must be > 0".into()));
        }
        if c.overlap >= c.target_size {
            return Err(ChunkwiseError::Config(format!(
                "chunking.overlap ({}) must be smaller than chunking.target_size ({})",
                c.overlap, c.target_size
            )));
        }
        if self.embedding.batch_size == 0 {
            return Err(ChunkwiseError::Config("embedding.batch_size must be > 0".into()));
        }
        if self.embedding.concurrency == 0 {
            return Err(ChunkwiseError::Config("embedding.concurrency must be > 0".into()));
        }
        Ok(())
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  chunking:   target_size={}, overlap={}",
            self.chunking.target_size, self.chunking.overlap
        );
        tracing::info!("  retrieval:  top_k={}", self.retrieval.top_k);
        tracing::info!(
            "  embedding:  batch_size={}, concurrency={}, cache_capacity={}",
            self.embedding.batch_size, self.embedding.concurrency, self.embedding.cache_capacity
        );
    }
}

// ── Chunking ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub target_size: usize,
    /// Maximum characters carried over from the previous chunk.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_size: 800,
            overlap: 100,
        }
    }
}

impl ChunkingConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            target_size: profiled_env_usize(p, "CHUNK_TARGET_SIZE", d.target_size),
            overlap: profiled_env_usize(p, "CHUNK_OVERLAP", d.overlap),
        }
    }
}

// ── Retrieval ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

impl RetrievalConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            top_k: profiled_env_usize(p, "RETRIEVAL_TOP_K", Self::default().top_k),
        }
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Texts per embedder call.
    pub batch_size: usize,
    /// Batches in flight at once.
    pub concurrency: usize,
    /// LRU entries kept by the embedding cache (0 disables caching).
    pub cache_capacity: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            batch_size: 16,
            concurrency: 4,
            cache_capacity: 1024,
        }
    }
}

impl EmbeddingConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            batch_size: profiled_env_usize(p, "EMBEDDING_BATCH_SIZE", d.batch_size),
            concurrency: profiled_env_usize(p, "EMBEDDING_CONCURRENCY", d.concurrency),
            cache_capacity: profiled_env_usize(p, "EMBEDDING_CACHE_CAPACITY", d.cache_capacity),
        }
    }
}
