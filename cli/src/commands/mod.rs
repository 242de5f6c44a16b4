//! CLI commands for the shabda tokenizer.

pub mod clean;
pub mod decode;
pub mod encode;
pub mod evaluate;
pub mod train;

pub use clean::CleanCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use evaluate::EvaluateCommand;
pub use train::TrainCommand;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Read text from `input`, or from stdin when it is "-".
pub(crate) fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        Ok(buffer)
    } else {
        Ok(input.to_string())
    }
}

/// Read all lines of a text file.
pub(crate) fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("failed to read {}", path.display()))
}
