//! Word and pair counting for BPE training.
//!
//! Training cost scales with the number of *distinct* words, so identical
//! pre-tokens are folded into one entry with a summed frequency. Entries keep
//! the order in which words were first seen; that order is the canonical scan
//! order used for alphabet ids and merge tie-breaking.

use ahash::AHashMap;
use compact_str::CompactString;
use shabda_core::Pair;

/// Counter for distinct words and their frequencies.
#[derive(Debug, Clone, Default)]
pub struct WordCounter {
    /// Word -> index into `words`
    index: AHashMap<CompactString, usize>,
    /// Distinct words in first-seen order
    words: Vec<CompactString>,
    /// Word -> frequency count (parallel to `words`)
    word_counts: Vec<u64>,
}

impl WordCounter {
    /// Create a new word counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single word occurrence. Empty words are ignored.
    pub fn add_word(&mut self, word: &str) {
        self.add_word_with_count(word, 1);
    }

    /// Add `count` occurrences of a word. Empty words and zero counts are
    /// ignored.
    pub fn add_word_with_count(&mut self, word: &str, count: u64) {
        if word.is_empty() || count == 0 {
            return;
        }

        if let Some(&pos) = self.index.get(word) {
            self.word_counts[pos] += count;
        } else {
            let word = CompactString::new(word);
            self.index.insert(word.clone(), self.words.len());
            self.words.push(word);
            self.word_counts.push(count);
        }
    }

    /// Add every word of an iterator.
    pub fn add_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.add_word(word.as_ref());
        }
    }

    /// Get the number of distinct words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Check if no word has been counted.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Get the total count of all word occurrences.
    pub fn total_word_occurrences(&self) -> u64 {
        self.word_counts.iter().sum()
    }

    /// Frequency of a word, if it was seen.
    pub fn frequency(&self, word: &str) -> Option<u64> {
        self.index.get(word).map(|&pos| self.word_counts[pos])
    }

    /// Iterate over `(word, frequency)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.words
            .iter()
            .zip(self.word_counts.iter())
            .map(|(word, &count)| (word.as_str(), count))
    }
}

/// Count adjacent pairs across symbol sequences in parallel.
///
/// Each occurrence contributes the frequency of the sequence it appears in.
pub fn count_pairs_parallel(words: &[Vec<u32>], word_counts: &[u64]) -> AHashMap<Pair, u64> {
    use rayon::prelude::*;

    words
        .par_iter()
        .zip(word_counts.par_iter())
        .fold(AHashMap::new, |mut acc: AHashMap<Pair, u64>, (word, &count)| {
            for window in word.windows(2) {
                *acc.entry((window[0], window[1])).or_insert(0) += count;
            }
            acc
        })
        .reduce(AHashMap::new, |mut acc, pair_counts| {
            for (pair, count) in pair_counts {
                *acc.entry(pair).or_insert(0) += count;
            }
            acc
        })
}

/// Count adjacent pairs sequentially (for small inputs or single-threaded use).
pub fn count_pairs_sequential(words: &[Vec<u32>], word_counts: &[u64]) -> AHashMap<Pair, u64> {
    let mut pair_counts: AHashMap<Pair, u64> = AHashMap::new();

    for (word, &count) in words.iter().zip(word_counts.iter()) {
        for window in word.windows(2) {
            *pair_counts.entry((window[0], window[1])).or_insert(0) += count;
        }
    }

    pair_counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_word_deduplicates() {
        let mut counter = WordCounter::new();
        counter.add_words(["ab", "bc", "ab", "ab"]);

        assert_eq!(counter.word_count(), 2);
        assert_eq!(counter.total_word_occurrences(), 4);
        assert_eq!(counter.frequency("ab"), Some(3));
        assert_eq!(counter.frequency("bc"), Some(1));
        assert_eq!(counter.frequency("cd"), None);
    }

    #[test]
    fn test_first_seen_order() {
        let mut counter = WordCounter::new();
        counter.add_words(["भारत", "राज्य", "भारत", "आहे"]);

        let words: Vec<&str> = counter.iter().map(|(w, _)| w).collect();
        assert_eq!(words, vec!["भारत", "राज्य", "आहे"]);
    }

    #[test]
    fn test_empty_words_ignored() {
        let mut counter = WordCounter::new();
        counter.add_word("");
        counter.add_word_with_count("a", 0);

        assert!(counter.is_empty());
    }

    #[test]
    fn test_count_pairs_with_frequency() {
        let words = vec![vec![0, 1], vec![1, 2]];
        let counts = vec![3, 2];

        let pairs = count_pairs_sequential(&words, &counts);
        assert_eq!(pairs.get(&(0, 1)), Some(&3));
        assert_eq!(pairs.get(&(1, 2)), Some(&2));
    }

    #[test]
    fn test_count_pairs_parallel_matches_sequential() {
        let words = vec![vec![0, 1, 2], vec![1, 2, 3], vec![2, 3, 4], vec![0, 0, 0]];
        let counts = vec![1, 1, 5, 2];

        let parallel = count_pairs_parallel(&words, &counts);
        let sequential = count_pairs_sequential(&words, &counts);

        assert_eq!(parallel, sequential);
        assert_eq!(parallel.get(&(1, 2)), Some(&2));
        assert_eq!(parallel.get(&(2, 3)), Some(&6));
        // Overlapping occurrences are each counted
        assert_eq!(parallel.get(&(0, 0)), Some(&4));
    }
}
