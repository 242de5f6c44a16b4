//! Decode command implementation.

use anyhow::{Context, Result};
use clap::Parser;
use shabda_tokenizer::Tokenizer;
use std::path::PathBuf;

use super::read_input;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Path to the trained tokenizer
    #[arg(short, long)]
    pub tokenizer: PathBuf,

    /// Token IDs separated by commas or whitespace ("-" reads stdin)
    #[arg(short, long)]
    pub ids: String,

    /// Skip special tokens during decoding
    #[arg(short, long, default_value_t = false)]
    pub skip_special_tokens: bool,
}

fn parse_ids(text: &str) -> Result<Vec<u32>> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("invalid token id '{}'", s))
        })
        .collect()
}

pub fn run(cmd: DecodeCommand) -> Result<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)
        .with_context(|| format!("failed to load {}", cmd.tokenizer.display()))?;

    let ids = parse_ids(&read_input(&cmd.ids)?)?;
    let text = tokenizer
        .decode(&ids, cmd.skip_special_tokens)
        .context("decoding failed")?;

    println!("{}", text);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_ids("4, 2,3").unwrap(), vec![4, 2, 3]);
        assert_eq!(parse_ids("4 2\n3\n").unwrap(), vec![4, 2, 3]);
        assert!(parse_ids("").unwrap().is_empty());
        assert!(parse_ids("4,x").is_err());
    }
}
