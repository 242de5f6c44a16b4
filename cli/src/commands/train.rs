//! Train command implementation.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use shabda_tokenizer::{
    CorpusCleaner, ModelFormat, SpecialTokensConfig, Splitter, StopReason, Tokenizer,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::clean::Normalization;
use super::read_lines;

/// Built-in pre-tokenizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SplitKind {
    /// Split on whitespace runs
    Whitespace,
    /// Separate word characters from punctuation
    WordPunct,
}

/// Train command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Input text file(s), one sentence per line
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Output tokenizer file
    #[arg(short, long, default_value = "tokenizer.json")]
    pub output: PathBuf,

    /// Target vocabulary size
    #[arg(long, default_value_t = 5000)]
    pub vocab_size: usize,

    /// Minimum pair frequency for a merge
    #[arg(long, default_value_t = 2)]
    pub min_frequency: u64,

    /// Special tokens in id order (comma-separated); defaults to <pad>,<s>,</s>,<unk>,<mask>
    #[arg(long, value_delimiter = ',')]
    pub special_tokens: Option<Vec<String>>,

    /// Pre-tokenizer
    #[arg(long, value_enum, default_value_t = SplitKind::Whitespace)]
    pub split: SplitKind,

    /// Custom pre-tokenizer regex whose matches are the pre-tokens; overrides --split
    #[arg(long)]
    pub pattern: Option<String>,

    /// Stop after this many merges
    #[arg(long)]
    pub max_merges: Option<usize>,

    /// Clean lines (Devanagari and ASCII only) before training
    #[arg(long, default_value_t = false)]
    pub clean: bool,

    /// Unicode normalization applied by --clean
    #[arg(long, value_enum, default_value_t = Normalization::None)]
    pub normalization: Normalization,

    /// Also export vocab.json and merges.txt into this directory
    #[arg(long)]
    pub hf_export: Option<PathBuf>,

    /// Train on a single thread
    #[arg(long, default_value_t = false)]
    pub sequential: bool,
}

impl TrainCommand {
    fn splitter(&self) -> Result<Splitter> {
        match &self.pattern {
            Some(pattern) => Splitter::custom(pattern)
                .with_context(|| format!("invalid pre-tokenizer pattern '{}'", pattern)),
            None => Ok(match self.split {
                SplitKind::Whitespace => Splitter::whitespace(),
                SplitKind::WordPunct => Splitter::word_punct(),
            }),
        }
    }

    fn special_tokens(&self) -> SpecialTokensConfig {
        match &self.special_tokens {
            Some(tokens) => SpecialTokensConfig::new(tokens.iter().map(|t| t.trim())),
            None => SpecialTokensConfig::default(),
        }
    }
}

pub fn run(cmd: TrainCommand) -> Result<()> {
    let start = Instant::now();

    let mut lines = Vec::new();
    for path in &cmd.input {
        let file_lines = read_lines(path)?;
        info!("Read {} lines from {}", file_lines.len(), path.display());
        lines.extend(file_lines);
    }
    if cmd.clean {
        let cleaner = CorpusCleaner::new(cmd.normalization.into());
        lines = cleaner
            .clean_lines(&lines)
            .filter(|line| !line.is_empty())
            .collect();
        info!("{} non-empty lines after cleaning", lines.len());
    }

    let stop_signal = Arc::new(AtomicBool::new(false));
    let handler_signal = stop_signal.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        handler_signal.store(true, Ordering::Relaxed);
    }) {
        warn!("Ctrl-C will not stop training: {}", err);
    }

    let builder = Tokenizer::builder()
        .vocab_size(cmd.vocab_size)
        .min_frequency(cmd.min_frequency)
        .with_special_tokens(cmd.special_tokens())
        .splitter(cmd.splitter()?)
        .parallel(!cmd.sequential)
        .max_merges(cmd.max_merges)
        .stop_signal(stop_signal);

    let (tokenizer, report) = builder
        .train_with_report(&lines)
        .context("training failed")?;

    if report.distinct_words == 0 {
        warn!("No training text in the input; saving special tokens only");
    }
    match report.stop_reason {
        StopReason::TargetVocabReached => {}
        StopReason::Saturated if report.distinct_words > 0 => warn!(
            "No pair reaches min frequency {}; vocabulary stopped at {} tokens",
            cmd.min_frequency,
            tokenizer.vocab_size()
        ),
        StopReason::Saturated => {}
        StopReason::MaxMerges => info!("Stopped at the {} merge cap", report.merges),
        StopReason::Interrupted => warn!("Interrupted; saving the partial tokenizer"),
    }

    tokenizer
        .save_as(&cmd.output, ModelFormat::Json)
        .with_context(|| format!("failed to save {}", cmd.output.display()))?;
    if let Some(dir) = &cmd.hf_export {
        tokenizer
            .save_as(dir, ModelFormat::HuggingFace)
            .with_context(|| format!("failed to export to {}", dir.display()))?;
    }

    println!(
        "Trained {} tokens ({} merges, {} distinct words) in {:.2?}",
        tokenizer.vocab_size(),
        report.merges,
        report.distinct_words,
        start.elapsed()
    );
    println!("Saved tokenizer to {}", cmd.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(input: PathBuf, output: PathBuf) -> TrainCommand {
        TrainCommand {
            input: vec![input],
            output,
            vocab_size: 10,
            min_frequency: 2,
            special_tokens: Some(vec!["<unk>".into()]),
            split: SplitKind::Whitespace,
            pattern: None,
            max_merges: None,
            clean: true,
            normalization: Normalization::None,
            hf_export: None,
            sequential: true,
        }
    }

    #[test]
    fn test_empty_corpus_saves_special_tokens_only() {
        let dir = std::env::temp_dir().join("shabda_test_cli_train_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("empty.txt");
        let output = dir.join("tokenizer.json");
        std::fs::write(&input, "\n?!\n").unwrap();

        run(command(input, output.clone())).unwrap();

        let tokenizer = Tokenizer::load(&output).unwrap();
        assert_eq!(tokenizer.vocab_size(), 1);
        assert!(tokenizer.merges().is_empty());
        assert_eq!(tokenizer.token_to_id("<unk>"), Some(0));

        // Cleanup
        std::fs::remove_dir_all(dir).ok();
    }
}
