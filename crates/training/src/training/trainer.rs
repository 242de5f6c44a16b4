//! BPE trainer implementation.
//!
//! Learns an ordered list of merge rules from a word-frequency table. Each
//! iteration merges the most frequent adjacent pair; ties go to the pair
//! that occurs first when scanning words in first-seen order, left to right.

use super::counter::{count_pairs_parallel, count_pairs_sequential, WordCounter};
use super::word::Word;
use ahash::{AHashMap, AHashSet};
use log::{debug, info};
use rayon::prelude::*;
use shabda_core::{
    MergeCandidate, MergeRules, Pair, PairPriorityQueue, Result, SpecialTokensConfig,
    TokenizerError, Vocabulary,
};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Configuration for BPE training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingConfig {
    /// Target vocabulary size, special tokens included
    pub vocab_size: usize,
    /// Minimum frequency for a pair to be merged
    pub min_frequency: u64,
    /// Special tokens, assigned ids `0..k` in order
    pub special_tokens: SpecialTokensConfig,
    /// Whether to use parallel processing
    pub parallel: bool,
    /// Optional cap on the number of merge iterations
    pub max_merges: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vocab_size: 5000,
            min_frequency: 2,
            special_tokens: SpecialTokensConfig::default(),
            parallel: true,
            max_merges: None,
        }
    }
}

impl TrainingConfig {
    /// Start a builder from the default configuration.
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Check the values that do not depend on the corpus.
    pub fn validate(&self) -> Result<()> {
        if self.min_frequency < 2 {
            return Err(TokenizerError::InvalidConfig(format!(
                "min_frequency must be at least 2, got {}",
                self.min_frequency
            )));
        }
        let specials = self.special_tokens.tokens.len();
        if self.vocab_size < specials {
            return Err(TokenizerError::InvalidConfig(format!(
                "vocab_size {} cannot hold {} special tokens",
                self.vocab_size, specials
            )));
        }
        Ok(())
    }
}

/// Builder for [`TrainingConfig`].
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    pub fn vocab_size(mut self, size: usize) -> Self {
        self.config.vocab_size = size;
        self
    }

    pub fn min_frequency(mut self, freq: u64) -> Self {
        self.config.min_frequency = freq;
        self
    }

    pub fn special_tokens(mut self, special_tokens: SpecialTokensConfig) -> Self {
        self.config.special_tokens = special_tokens;
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

    /// Validate and return the configuration.
    pub fn build(self) -> Result<TrainingConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Why a training run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The vocabulary reached the configured size.
    TargetVocabReached,
    /// No pair reaches the minimum frequency.
    Saturated,
    /// The configured merge cap was hit.
    MaxMerges,
    /// The stop signal was raised.
    Interrupted,
}

/// Summary of a training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingReport {
    /// Number of distinct words in the corpus
    pub distinct_words: usize,
    /// Total word occurrences in the corpus
    pub total_words: u64,
    /// Number of base symbols added after the special tokens
    pub alphabet_size: usize,
    /// Number of merge rules learned
    pub merges: usize,
    pub stop_reason: StopReason,
}

/// Result of [`BpeTrainer::train`].
#[derive(Debug, Clone)]
pub struct TrainingOutput {
    pub vocab: Vocabulary,
    pub merges: MergeRules,
    pub report: TrainingReport,
}

/// BPE trainer.
///
/// Trains a BPE vocabulary from a word-frequency table by iteratively
/// merging the most frequent adjacent symbol pair.
#[derive(Debug, Clone, Default)]
pub struct BpeTrainer {
    /// Configuration
    config: TrainingConfig,
    /// Checked between iterations; training stops once it is set
    stop_signal: Option<Arc<AtomicBool>>,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            stop_signal: None,
        }
    }

    /// Create a new BPE trainer with default configuration.
    pub fn with_vocab_size(vocab_size: usize) -> Self {
        Self::new(TrainingConfig {
            vocab_size,
            ..Default::default()
        })
    }

    /// Stop training at the next iteration boundary once `signal` is set.
    pub fn with_stop_signal(mut self, signal: Arc<AtomicBool>) -> Self {
        self.stop_signal = Some(signal);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Count `words` and train on them.
    pub fn train_words<I, S>(&self, words: I) -> Result<TrainingOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counter = WordCounter::new();
        counter.add_words(words);
        self.train(&counter)
    }

    /// Train on a word-frequency table.
    pub fn train(&self, counter: &WordCounter) -> Result<TrainingOutput> {
        self.config.validate()?;

        let mut vocab = Vocabulary::with_special_tokens(&self.config.special_tokens.tokens)?;
        let specials = vocab.len();

        // Base alphabet in first-seen order. A character spelling a special
        // token never gets a regular id and splits its word in two.
        let mut buf = [0u8; 4];
        let mut symbols: Vec<Vec<u32>> = Vec::with_capacity(counter.word_count());
        let mut word_counts: Vec<u64> = Vec::with_capacity(counter.word_count());
        for (word, count) in counter.iter() {
            let mut piece = Vec::with_capacity(word.len());
            for c in word.chars() {
                let token = c.encode_utf8(&mut buf);
                match vocab.get_id(token) {
                    Some(id) if vocab.special().is_special(id) => {
                        if !piece.is_empty() {
                            symbols.push(std::mem::take(&mut piece));
                            word_counts.push(count);
                        }
                    }
                    _ => piece.push(vocab.add_token(token)),
                }
            }
            if !piece.is_empty() {
                symbols.push(piece);
                word_counts.push(count);
            }
        }
        let alphabet_size = vocab.len() - specials;

        if vocab.len() > self.config.vocab_size {
            return Err(TokenizerError::InvalidConfig(format!(
                "vocab_size {} is smaller than {} special tokens plus {} base symbols",
                self.config.vocab_size, specials, alphabet_size
            )));
        }

        info!(
            "Training BPE on {} distinct words ({} total), alphabet of {} symbols, target vocab {}",
            counter.word_count(),
            counter.total_word_occurrences(),
            alphabet_size,
            self.config.vocab_size
        );

        let pair_counts = if self.config.parallel {
            count_pairs_parallel(&symbols, &word_counts)
        } else {
            count_pairs_sequential(&symbols, &word_counts)
        };
        let words: Vec<Word> = symbols.into_iter().map(Word::new).collect();

        let mut state = TrainingState::new(words, word_counts, pair_counts, &self.config);
        let mut merges = MergeRules::new();

        let stop_reason = loop {
            if vocab.len() >= self.config.vocab_size {
                break StopReason::TargetVocabReached;
            }
            if self.config.max_merges.is_some_and(|max| merges.len() >= max) {
                break StopReason::MaxMerges;
            }
            if self.stop_requested() {
                break StopReason::Interrupted;
            }

            let Some(candidate) = state.select() else {
                break StopReason::Saturated;
            };

            let merged = merged_token(&vocab, candidate.pair)?;
            if vocab.get_id(&merged).is_some_and(|id| vocab.special().is_special(id)) {
                debug!(
                    "skipping {:?}: spells a special token (count {})",
                    merged, candidate.count
                );
                state.reserve(candidate.pair);
                continue;
            }
            let new_id = vocab.add_token(&merged);
            let rank = merges.push(candidate.pair, new_id);
            debug!(
                "merge #{}: {:?} + {:?} -> {:?} (id {}, count {})",
                rank,
                vocab.get_token(candidate.pair.0).unwrap_or_default(),
                vocab.get_token(candidate.pair.1).unwrap_or_default(),
                merged,
                new_id,
                candidate.count
            );

            state.apply_merge(candidate.pair, new_id, self.config.parallel);
        };

        let report = TrainingReport {
            distinct_words: counter.word_count(),
            total_words: counter.total_word_occurrences(),
            alphabet_size,
            merges: merges.len(),
            stop_reason,
        };

        info!(
            "Training finished: vocab size {}, {} merges, stop reason {:?}",
            vocab.len(),
            merges.len(),
            stop_reason
        );

        Ok(TrainingOutput {
            vocab,
            merges,
            report,
        })
    }

    fn stop_requested(&self) -> bool {
        self.stop_signal
            .as_ref()
            .is_some_and(|signal| signal.load(Ordering::Relaxed))
    }
}

/// Concatenated string of a pair's symbols.
fn merged_token(vocab: &Vocabulary, pair: Pair) -> Result<String> {
    let left = vocab
        .get_token(pair.0)
        .ok_or(TokenizerError::UnknownTokenId(pair.0))?;
    let right = vocab
        .get_token(pair.1)
        .ok_or(TokenizerError::UnknownTokenId(pair.1))?;
    Ok(format!("{}{}", left, right))
}

/// Mutable state of one training run.
struct TrainingState {
    /// Distinct words, index = first-seen order
    words: Vec<Word>,
    /// Frequency per word
    word_counts: Vec<u64>,
    /// Aggregate count per pair, positive entries only
    pair_counts: AHashMap<Pair, u64>,
    /// Pair -> indices of words that may contain it. Entries can be stale.
    where_to_update: AHashMap<Pair, BTreeSet<usize>>,
    /// Pairs at or above the minimum frequency
    queue: PairPriorityQueue,
    /// Pairs that spell a special token; never queued again
    reserved: AHashSet<Pair>,
    min_frequency: u64,
}

impl TrainingState {
    fn new(
        words: Vec<Word>,
        word_counts: Vec<u64>,
        pair_counts: AHashMap<Pair, u64>,
        config: &TrainingConfig,
    ) -> Self {
        let mut where_to_update: AHashMap<Pair, BTreeSet<usize>> =
            AHashMap::with_capacity(pair_counts.len());
        for (i, word) in words.iter().enumerate() {
            for pair in word.pairs() {
                where_to_update.entry(pair).or_default().insert(i);
            }
        }

        let mut queue = PairPriorityQueue::with_capacity(pair_counts.len());
        for (&pair, &count) in &pair_counts {
            if count >= config.min_frequency {
                queue.push(MergeCandidate::new(pair, count));
            }
        }

        Self {
            words,
            word_counts,
            pair_counts,
            where_to_update,
            queue,
            reserved: AHashSet::new(),
            min_frequency: config.min_frequency,
        }
    }

    /// Exclude `pair` from selection for the rest of the run.
    fn reserve(&mut self, pair: Pair) {
        self.queue.remove(pair);
        self.reserved.insert(pair);
    }

    /// Pop the pair to merge next, breaking count ties by first occurrence.
    fn select(&mut self) -> Option<MergeCandidate> {
        let ties = self.queue.pop_ties();
        let best = ties
            .iter()
            .copied()
            .min_by_key(|candidate| self.first_occurrence(candidate.pair))?;

        for candidate in ties {
            if candidate.pair != best.pair {
                self.queue.push(candidate);
            }
        }

        Some(best)
    }

    /// `(word index, symbol position)` of the first occurrence of `pair`.
    fn first_occurrence(&self, pair: Pair) -> (usize, usize) {
        self.where_to_update
            .get(&pair)
            .and_then(|indices| {
                indices.iter().find_map(|&i| {
                    self.words[i]
                        .first_position(pair)
                        .map(|position| (i, position))
                })
            })
            .unwrap_or((usize::MAX, usize::MAX))
    }

    /// Rewrite every word containing `pair` and update the counts.
    fn apply_merge(&mut self, pair: Pair, new_id: u32, parallel: bool) {
        let indices = self.where_to_update.remove(&pair).unwrap_or_default();

        let mut batch: Vec<(usize, Word)> = indices
            .into_iter()
            .map(|i| (i, std::mem::take(&mut self.words[i])))
            .collect();

        let changes: Vec<Vec<(Pair, i64)>> = if parallel {
            batch
                .par_iter_mut()
                .map(|(_, word)| word.merge(pair, new_id))
                .collect()
        } else {
            batch
                .iter_mut()
                .map(|(_, word)| word.merge(pair, new_id))
                .collect()
        };

        // Word indices are ascending, so deltas are applied in scan order.
        let mut aggregated: AHashMap<Pair, i64> = AHashMap::new();
        for ((i, word), deltas) in batch.into_iter().zip(changes) {
            let freq = self.word_counts[i] as i64;
            for (changed, delta) in deltas {
                if delta > 0 {
                    self.where_to_update.entry(changed).or_default().insert(i);
                }
                *aggregated.entry(changed).or_insert(0) += delta * freq;
            }
            self.words[i] = word;
        }

        for (changed, delta) in aggregated {
            if delta == 0 {
                continue;
            }
            let current = self.pair_counts.get(&changed).copied().unwrap_or(0) as i64;
            let count = current + delta;

            if count > 0 {
                let count = count as u64;
                self.pair_counts.insert(changed, count);
                if count >= self.min_frequency && !self.reserved.contains(&changed) {
                    self.queue.push(MergeCandidate::new(changed, count));
                } else {
                    self.queue.remove(changed);
                }
            } else {
                self.pair_counts.remove(&changed);
                self.queue.remove(changed);
                self.where_to_update.remove(&changed);
            }
        }
    }
}
