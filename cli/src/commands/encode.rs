//! Encode command implementation.

use anyhow::{Context, Result};
use clap::Parser;
use shabda_tokenizer::Tokenizer;
use std::path::PathBuf;

use super::read_input;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Path to the trained tokenizer
    #[arg(short, long)]
    pub tokenizer: PathBuf,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Print only the token IDs
    #[arg(long, default_value_t = false)]
    pub ids_only: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(cmd: EncodeCommand) -> Result<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)
        .with_context(|| format!("failed to load {}", cmd.tokenizer.display()))?;

    let text = read_input(&cmd.input)?;
    let encoding = tokenizer.encode(&text).context("encoding failed")?;

    let ids: Vec<String> = encoding.ids.iter().map(|id| id.to_string()).collect();
    let output = if cmd.ids_only {
        ids.join(" ")
    } else {
        format!("tokens: {}\nids: {}", encoding.tokens.join(" "), ids.join(" "))
    };

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Encoded {} tokens to {}", encoding.len(), path.display());
        }
        None => println!("{}", output),
    }

    Ok(())
}
