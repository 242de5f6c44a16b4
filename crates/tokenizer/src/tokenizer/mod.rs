//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that ties the
//! pre-tokenizer, the vocabulary and the merge rules together.

use crate::io::{ModelFormat, TokenizerLoader, TokenizerSaver};
use crate::pre_tokenizer::Splitter;
use log::info;
use rayon::prelude::*;
use shabda_core::{
    CharLevelEncoder, MergeRules, Result, SpecialTokensConfig, TokenizerError, Vocabulary,
};
use shabda_training::{BpeTrainer, TrainingConfig, TrainingReport, WordCounter};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Configuration for training a tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Target vocabulary size
    pub vocab_size: usize,
    /// Minimum frequency for merges during training
    pub min_frequency: u64,
    /// Special tokens configuration
    pub special_tokens: SpecialTokensConfig,
    /// Pre-tokenizer used for training and encoding
    pub splitter: Splitter,
    /// Whether training uses parallel processing
    pub parallel: bool,
    /// Optional cap on merge iterations
    pub max_merges: Option<usize>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        let training = TrainingConfig::default();
        Self {
            vocab_size: training.vocab_size,
            min_frequency: training.min_frequency,
            special_tokens: training.special_tokens,
            splitter: Splitter::default(),
            parallel: training.parallel,
            max_merges: training.max_merges,
        }
    }
}

impl TokenizerConfig {
    /// The trainer settings of this configuration.
    pub fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            vocab_size: self.vocab_size,
            min_frequency: self.min_frequency,
            special_tokens: self.special_tokens.clone(),
            parallel: self.parallel,
            max_merges: self.max_merges,
        }
    }
}

/// Builder for training a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    config: TokenizerConfig,
    stop_signal: Option<Arc<AtomicBool>>,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target vocabulary size.
    pub fn vocab_size(mut self, size: usize) -> Self {
        self.config.vocab_size = size;
        self
    }

    /// Set the minimum frequency for merges.
    pub fn min_frequency(mut self, freq: u64) -> Self {
        self.config.min_frequency = freq;
        self
    }

    /// Set special tokens.
    pub fn with_special_tokens(mut self, tokens: SpecialTokensConfig) -> Self {
        self.config.special_tokens = tokens;
        self
    }

    /// Set the pre-tokenizer.
    pub fn splitter(mut self, splitter: Splitter) -> Self {
        self.config.splitter = splitter;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn max_merges(mut self, max_merges: Option<usize>) -> Self {
        self.config.max_merges = max_merges;
        self
    }

    /// Stop training at the next merge boundary once `signal` is set.
    pub fn stop_signal(mut self, signal: Arc<AtomicBool>) -> Self {
        self.stop_signal = Some(signal);
        self
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Train a tokenizer on corpus lines.
    pub fn train<I, S>(self, lines: I) -> Result<Tokenizer>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.train_with_report(lines).map(|(tokenizer, _)| tokenizer)
    }

    /// Train a tokenizer on corpus lines and return the training summary.
    pub fn train_with_report<I, S>(self, lines: I) -> Result<(Tokenizer, TrainingReport)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let training = self.config.training_config();
        training.validate()?;

        let mut counter = WordCounter::new();
        for line in lines {
            for word in self.config.splitter.split_str(line.as_ref()) {
                counter.add_word(word);
            }
        }

        let mut trainer = BpeTrainer::new(training);
        if let Some(signal) = self.stop_signal {
            trainer = trainer.with_stop_signal(signal);
        }
        let output = trainer.train(&counter)?;

        let tokenizer = Tokenizer::from_parts(output.vocab, output.merges, self.config.splitter);
        Ok((tokenizer, output.report))
    }
}

/// Main tokenizer struct.
///
/// Immutable once built; clones share the vocabulary and merge rules and
/// can be used from many threads at once.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Character-level BPE encoder (owns vocabulary and merges)
    encoder: CharLevelEncoder,
    /// Text splitter
    splitter: Splitter,
}

impl Tokenizer {
    /// Assemble a tokenizer from its parts.
    pub fn from_parts(vocab: Vocabulary, merges: MergeRules, splitter: Splitter) -> Self {
        Self {
            encoder: CharLevelEncoder::new(Arc::new(vocab), Arc::new(merges)),
            splitter,
        }
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Train a whitespace-split tokenizer with default frequency settings.
    pub fn train<I, S, T>(lines: I, vocab_size: usize, special_tokens: &[T]) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self::builder()
            .vocab_size(vocab_size)
            .with_special_tokens(SpecialTokensConfig::new(
                special_tokens.iter().map(|t| t.as_ref().to_string()),
            ))
            .train(lines)
    }

    /// Encode text to tokens and token IDs.
    pub fn encode(&self, text: &str) -> Result<Encoding> {
        let mut encoding = Encoding::default();

        for (word_index, word) in self.splitter.split_str(text).into_iter().enumerate() {
            let word_encoding = self.encoder.encode_word(word)?;
            encoding
                .word_ids
                .extend(std::iter::repeat(word_index as u32).take(word_encoding.ids.len()));
            encoding.tokens.extend(word_encoding.tokens);
            encoding.ids.extend(word_encoding.ids);
        }

        Ok(encoding)
    }

    /// Encode a batch of texts (parallelized).
    pub fn encode_batch<S>(&self, texts: &[S]) -> Result<Vec<Encoding>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.encode(text.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()
    }

    /// Decode token IDs back to text.
    ///
    /// Token strings are concatenated without separators; whitespace removed
    /// by the pre-tokenizer is not restored.
    pub fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> Result<String> {
        self.encoder.decode(ids, skip_special_tokens)
    }

    /// Average number of characters per token over `lines`.
    ///
    /// Characters are counted over whole lines, spaces included. Returns
    /// `None` when the lines produce no tokens.
    pub fn compression_ratio<I, S>(&self, lines: I) -> Result<Option<f64>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut chars = 0usize;
        let mut tokens = 0usize;

        for line in lines {
            let line = line.as_ref();
            chars += line.chars().count();
            tokens += self.encode(line)?.len();
        }

        Ok((tokens > 0).then(|| chars as f64 / tokens as f64))
    }

    /// Get the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.encoder.vocab().len()
    }

    /// Get a reference to the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        self.encoder.vocab()
    }

    /// Get a reference to the merge rules.
    pub fn merges(&self) -> &MergeRules {
        self.encoder.merges()
    }

    pub fn splitter(&self) -> &Splitter {
        &self.splitter
    }

    pub fn token_to_id(&self, token: &str) -> Option<u32> {
        self.vocab().get_id(token)
    }

    pub fn id_to_token(&self, id: u32) -> Option<&str> {
        self.vocab().get_token(id)
    }

    fn saver(&self) -> TokenizerSaver<'_> {
        TokenizerSaver::new(self.vocab(), self.merges(), &self.splitter)
    }

    /// Save the tokenizer to a JSON artifact file.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.saver().save(path)
    }

    /// Save in the given format.
    ///
    /// [`ModelFormat::Json`] writes `path` as a file; [`ModelFormat::HuggingFace`]
    /// treats `path` as a directory.
    pub fn save_as(&self, path: &Path, format: ModelFormat) -> Result<()> {
        match format {
            ModelFormat::Json => self.save(path),
            ModelFormat::HuggingFace => self.save_huggingface(path),
        }
    }

    /// Export `vocab.json` and `merges.txt` into a directory.
    pub fn save_huggingface(&self, dir: &Path) -> Result<()> {
        self.saver().save_huggingface(dir)?;
        info!("Exported HuggingFace files to {}", dir.display());
        Ok(())
    }

    /// Serialize to a JSON artifact string.
    pub fn to_json(&self) -> Result<String> {
        self.saver().to_json_string()
    }

    /// Load a tokenizer from a JSON artifact file.
    pub fn load(path: &Path) -> Result<Self> {
        let (vocab, merges, splitter) = TokenizerLoader::load(path)?;
        Ok(Self::from_parts(vocab, merges, splitter))
    }

    /// Load a tokenizer from a JSON artifact string.
    pub fn from_json(json: &str) -> Result<Self> {
        let (vocab, merges, splitter) = TokenizerLoader::from_json_str(json)?;
        Ok(Self::from_parts(vocab, merges, splitter))
    }
}

impl std::str::FromStr for Tokenizer {
    type Err = TokenizerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

/// Result of encoding text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoding {
    /// Token strings
    pub tokens: Vec<String>,
    /// Token IDs, parallel to `tokens`
    pub ids: Vec<u32>,
    /// Index of the pre-token each token came from
    pub word_ids: Vec<u32>,
}

impl Encoding {
    /// Get the number of tokens.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the encoding is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Rejoin tokens into text, one space between pre-tokens.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        let mut previous: Option<u32> = None;

        for (token, &word) in self.tokens.iter().zip(&self.word_ids) {
            if previous.is_some_and(|p| p != word) {
                text.push(' ');
            }
            text.push_str(token);
            previous = Some(word);
        }

        text
    }
}
