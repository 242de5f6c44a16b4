//! Symbol sequence of a single distinct word during training.

use ahash::AHashMap;
use shabda_core::Pair;

/// A distinct word as a sequence of vocabulary ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Word {
    symbols: Vec<u32>,
}

impl Word {
    /// Create a word from its initial symbol ids.
    pub fn new(symbols: Vec<u32>) -> Self {
        Self { symbols }
    }

    /// Current symbol ids.
    #[inline]
    pub fn symbols(&self) -> &[u32] {
        &self.symbols
    }

    /// Number of symbols.
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate over adjacent pairs, left to right.
    pub fn pairs(&self) -> impl Iterator<Item = Pair> + '_ {
        self.symbols.windows(2).map(|w| (w[0], w[1]))
    }

    /// Position of the first occurrence of `pair`.
    pub fn first_position(&self, pair: Pair) -> Option<usize> {
        self.pairs().position(|p| p == pair)
    }

    /// Merge every non-overlapping occurrence of `pair`, left to right.
    ///
    /// Returns the change in per-occurrence pair counts for this word,
    /// sorted by pair. Callers scale the deltas by the word frequency.
    pub fn merge(&mut self, pair: Pair, new_id: u32) -> Vec<(Pair, i64)> {
        let mut merged = Vec::with_capacity(self.symbols.len());
        let mut i = 0;

        while i < self.symbols.len() {
            if i + 1 < self.symbols.len()
                && self.symbols[i] == pair.0
                && self.symbols[i + 1] == pair.1
            {
                merged.push(new_id);
                i += 2;
            } else {
                merged.push(self.symbols[i]);
                i += 1;
            }
        }

        if merged.len() == self.symbols.len() {
            return Vec::new();
        }

        let before = self.pair_histogram();
        self.symbols = merged;
        let after = self.pair_histogram();

        let mut deltas: Vec<(Pair, i64)> = before
            .iter()
            .filter_map(|(&p, &old)| {
                let new = after.get(&p).copied().unwrap_or(0);
                (new != old).then_some((p, new - old))
            })
            .chain(
                after
                    .iter()
                    .filter(|(p, _)| !before.contains_key(*p))
                    .map(|(&p, &new)| (p, new)),
            )
            .collect();

        deltas.sort_unstable();
        deltas
    }

    fn pair_histogram(&self) -> AHashMap<Pair, i64> {
        let mut histogram = AHashMap::with_capacity(self.symbols.len());
        for pair in self.pairs() {
            *histogram.entry(pair).or_insert(0) += 1;
        }
        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_reports_deltas() {
        // a b c b c -> a bc bc
        let mut word = Word::new(vec![1, 2, 3, 2, 3]);
        let deltas = word.merge((2, 3), 9);

        assert_eq!(word.symbols(), &[1, 9, 9]);
        assert_eq!(
            deltas,
            vec![((1, 2), -1), ((1, 9), 1), ((2, 3), -2), ((3, 2), -1), ((9, 9), 1)]
        );
    }

    #[test]
    fn test_merge_overlapping_run() {
        let mut word = Word::new(vec![1, 1, 1]);
        let deltas = word.merge((1, 1), 2);

        assert_eq!(word.symbols(), &[2, 1]);
        assert_eq!(deltas, vec![((1, 1), -2), ((2, 1), 1)]);
    }

    #[test]
    fn test_merge_absent_pair_is_noop() {
        let mut word = Word::new(vec![1, 2]);
        assert!(word.merge((2, 1), 5).is_empty());
        assert_eq!(word.symbols(), &[1, 2]);
    }

    #[test]
    fn test_first_position() {
        let word = Word::new(vec![4, 1, 2, 1, 2]);
        assert_eq!(word.first_position((1, 2)), Some(1));
        assert_eq!(word.first_position((2, 4)), None);
    }
}
