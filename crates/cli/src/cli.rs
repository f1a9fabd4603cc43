use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Split documents into chunks and rank embedded chunks against a query.
///
/// Embedding happens outside this tool: `rank` reads vectors that were
/// already computed.
#[derive(Parser, Debug)]
#[command(name = "chunkwise", about = "Chunk documents and rank embedded chunks")]
pub struct CliArgs {
    /// Path to a TOML config file (default: environment and .env)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chunk a text file and print one JSON chunk per line
    Chunk(ChunkArgs),
    /// Rank a JSON knowledge base against a JSON query vector
    Rank(RankArgs),
}

#[derive(Args, Debug)]
pub struct ChunkArgs {
    /// Text file to chunk
    pub file: PathBuf,

    /// Source id recorded on every chunk (default: the file name)
    #[arg(long)]
    pub source: Option<String>,

    /// Maximum chunk length in characters
    #[arg(long)]
    pub target_size: Option<usize>,

    /// Overlap budget in characters
    #[arg(long)]
    pub overlap: Option<usize>,
}

#[derive(Args, Debug)]
pub struct RankArgs {
    /// JSON array of embedded chunks
    #[arg(long)]
    pub base: PathBuf,

    /// JSON array of numbers
    #[arg(long)]
    pub query: PathBuf,

    /// Number of chunks to return
    #[arg(short = 'k', long = "top-k")]
    pub top_k: Option<usize>,

    /// Include similarity scores in the output
    #[arg(long)]
    pub scores: bool,
}
