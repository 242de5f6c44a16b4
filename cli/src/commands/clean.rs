//! Clean command implementation.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use shabda_tokenizer::{CorpusCleaner, NormalizationForm};
use std::path::PathBuf;

/// Unicode normalization choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Normalization {
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
    None,
}

impl From<Normalization> for NormalizationForm {
    fn from(value: Normalization) -> Self {
        match value {
            Normalization::Nfc => NormalizationForm::NFC,
            Normalization::Nfd => NormalizationForm::NFD,
            Normalization::Nfkc => NormalizationForm::NFKC,
            Normalization::Nfkd => NormalizationForm::NFKD,
            Normalization::None => NormalizationForm::None,
        }
    }
}

/// Clean command arguments.
#[derive(Parser)]
pub struct CleanCommand {
    /// Raw corpus file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Cleaned output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Unicode normalization applied to each line
    #[arg(long, value_enum, default_value_t = Normalization::None)]
    pub normalization: Normalization,
}

pub fn run(cmd: CleanCommand) -> Result<()> {
    let cleaner = CorpusCleaner::new(cmd.normalization.into());
    let stats = cleaner
        .clean_file(&cmd.input, &cmd.output)
        .with_context(|| format!("failed to clean {}", cmd.input.display()))?;

    println!(
        "Cleaned {} lines ({} empty, {} characters removed) into {}",
        stats.lines,
        stats.empty_lines,
        stats.removed_chars,
        cmd.output.display()
    );

    Ok(())
}
