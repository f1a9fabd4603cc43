mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;

use chunkwise_core::config::{load_dotenv, Config};

use crate::cli::{CliArgs, Command};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let config = match args.config.as_deref() {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => {
            load_dotenv();
            let config = Config::from_env();
            config.validate().context("invalid configuration in environment")?;
            config
        }
    };
    config.log_summary();

    match &args.command {
        Command::Chunk(chunk_args) => commands::run_chunk(&config, chunk_args),
        Command::Rank(rank_args) => commands::run_rank(&config, rank_args),
    }
}
