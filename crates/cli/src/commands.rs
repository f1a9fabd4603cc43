use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use chunkwise_core::{Config, EmbeddedChunk, KnowledgeBase};
use chunkwise_ingest::{chunk_text, ChunkParams};
use chunkwise_retrieval::Retriever;

use crate::cli::{ChunkArgs, RankArgs};

/// Config values with command-line overrides applied.
fn chunk_params(config: &Config, args: &ChunkArgs) -> Result<ChunkParams> {
    let target_size = args.target_size.unwrap_or(config.chunking.target_size);
    let overlap = args.overlap.unwrap_or(config.chunking.overlap);
    ChunkParams::new(target_size, overlap).context("invalid chunking parameters")
}

fn source_id(args: &ChunkArgs) -> String {
    args.source.clone().unwrap_or_else(|| {
        args.file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| args.file.display().to_string())
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {what} in {}", path.display()))
}

pub fn run_chunk(config: &Config, args: &ChunkArgs) -> Result<()> {
    let params = chunk_params(config, args)?;
    let source = source_id(args);
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let chunks = chunk_text(&text, &source, &params);
    info!(source = %source, chunks = chunks.len(), "Chunked document");

    let mut out = BufWriter::new(io::stdout().lock());
    for chunk in &chunks {
        serde_json::to_writer(&mut out, chunk)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

pub fn run_rank(config: &Config, args: &RankArgs) -> Result<()> {
    let entries: Vec<EmbeddedChunk> = read_json(&args.base, "knowledge base")?;
    let query: Vec<f32> = read_json(&args.query, "query vector")?;
    let base = KnowledgeBase::from_embedded(entries)
        .with_context(|| format!("inconsistent knowledge base in {}", args.base.display()))?;
    let k = args.top_k.unwrap_or(config.retrieval.top_k);

    let retriever = Retriever::new(&base);
    let mut out = BufWriter::new(io::stdout().lock());
    if args.scores {
        let ranked = retriever.rank(&query, k).context("ranking failed")?;
        info!(entries = base.len(), returned = ranked.len(), "Ranked knowledge base");
        serde_json::to_writer_pretty(&mut out, &ranked)?;
    } else {
        let chunks = retriever.top_k(&query, k).context("ranking failed")?;
        info!(entries = base.len(), returned = chunks.len(), "Ranked knowledge base");
        serde_json::to_writer_pretty(&mut out, &chunks)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn chunk_args(file: &str) -> ChunkArgs {
        ChunkArgs {
            file: PathBuf::from(file),
            source: None,
            target_size: None,
            overlap: None,
        }
    }

    #[test]
    fn params_come_from_config_by_default() {
        let mut config = Config::default();
        config.chunking.target_size = 300;
        config.chunking.overlap = 40;

        let params = chunk_params(&config, &chunk_args("notes.md")).unwrap();
        assert_eq!(params.target_size(), 300);
        assert_eq!(params.overlap(), 40);
    }

    #[test]
    fn flags_override_config() {
        let mut args = chunk_args("notes.md");
        args.target_size = Some(120);
        args.overlap = Some(0);

        let params = chunk_params(&Config::default(), &args).unwrap();
        assert_eq!(params.target_size(), 120);
        assert_eq!(params.overlap(), 0);
    }

    #[test]
    fn overlap_flag_is_validated_against_target() {
        let mut args = chunk_args("notes.md");
        args.overlap = Some(900);
        assert!(chunk_params(&Config::default(), &args).is_err());
    }

    #[test]
    fn source_defaults_to_file_name() {
        assert_eq!(source_id(&chunk_args("docs/guide/intro.md")), "intro.md");

        let mut args = chunk_args("docs/guide/intro.md");
        args.source = Some("guide".into());
        assert_eq!(source_id(&args), "guide");
    }
}
