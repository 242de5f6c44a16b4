//! Evaluate command implementation.

use anyhow::{Context, Result};
use clap::Parser;
use shabda_tokenizer::Tokenizer;
use std::path::PathBuf;
use std::time::Instant;

use super::read_lines;

/// Evaluate command arguments.
#[derive(Parser)]
pub struct EvaluateCommand {
    /// Path to the trained tokenizer
    #[arg(short, long)]
    pub tokenizer: PathBuf,

    /// Text file to evaluate on, one sentence per line
    #[arg(short, long)]
    pub input: PathBuf,

    /// Only use the first N lines
    #[arg(short, long)]
    pub limit: Option<usize>,
}

pub fn run(cmd: EvaluateCommand) -> Result<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)
        .with_context(|| format!("failed to load {}", cmd.tokenizer.display()))?;

    let mut lines = read_lines(&cmd.input)?;
    if let Some(limit) = cmd.limit {
        lines.truncate(limit);
    }

    let start = Instant::now();
    let ratio = tokenizer
        .compression_ratio(&lines)
        .context("evaluation failed")?;
    let elapsed = start.elapsed();

    println!("Lines: {}", lines.len());
    println!("Vocabulary size: {}", tokenizer.vocab_size());
    match ratio {
        Some(ratio) => println!("Compression ratio: {:.3} characters per token", ratio),
        None => println!("Compression ratio: n/a (no tokens)"),
    }
    println!("Time: {:.2?}", elapsed);

    Ok(())
}
