//! Merge rule management for BPE.
//!
//! Merge rules are stored using token IDs rather than strings for fast
//! comparison. The learned order is kept verbatim: a rule's rank is its
//! position in that order, and encoding replays rules by rank.

use crate::core::vocab::Vocabulary;
use crate::error::{Result, TokenizerError};
use ahash::AHashMap;

/// A pair of token IDs that can be merged.
pub type Pair = (u32, u32);

/// Pair -> ranks at which that pair is merged, ascending.
///
/// A pair normally has a single rank. It can have more when an earlier merge
/// destroyed all of its occurrences and a later merge spelled one of its
/// symbols again through a different pair.
pub type MergeMap = AHashMap<Pair, Vec<u32>>;

/// A single learned merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRule {
    /// Left and right symbol ids
    pub pair: Pair,
    /// Id of the concatenated symbol
    pub new_id: u32,
}

/// Ordered collection of BPE merge rules with rank lookup.
#[derive(Debug, Clone, Default)]
pub struct MergeRules {
    /// Rules in learned order (index = rank)
    rules: Vec<MergeRule>,
    /// Pair -> ranks
    ranks: MergeMap,
}

impl MergeRules {
    /// Create a new empty collection of merge rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new collection with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rules: Vec::with_capacity(capacity),
            ranks: MergeMap::with_capacity(capacity),
        }
    }

    /// Append a merge rule and return its rank.
    pub fn push(&mut self, pair: Pair, new_id: u32) -> u32 {
        let rank = self.rules.len() as u32;
        self.rules.push(MergeRule { pair, new_id });
        self.ranks.entry(pair).or_default().push(rank);
        rank
    }

    /// Get the rule at a rank.
    #[inline]
    pub fn get(&self, rank: u32) -> Option<&MergeRule> {
        self.rules.get(rank as usize)
    }

    /// First rule for `pair` whose rank is strictly greater than `after`
    /// (or the first rule at all when `after` is `None`).
    ///
    /// Returns `(rank, new_id)`.
    #[inline]
    pub fn next_rank(&self, pair: Pair, after: Option<u32>) -> Option<(u32, u32)> {
        let ranks = self.ranks.get(&pair)?;
        let idx = match after {
            Some(after) => ranks.partition_point(|&r| r <= after),
            None => 0,
        };
        let rank = *ranks.get(idx)?;
        Some((rank, self.rules[rank as usize].new_id))
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over rules in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &MergeRule> + '_ {
        self.rules.iter()
    }

    /// Rules as `(left, right)` token strings, in rank order.
    pub fn to_string_pairs(&self, vocab: &Vocabulary) -> Result<Vec<(String, String)>> {
        self.rules
            .iter()
            .map(|rule| {
                let left = vocab
                    .get_token(rule.pair.0)
                    .ok_or(TokenizerError::UnknownTokenId(rule.pair.0))?;
                let right = vocab
                    .get_token(rule.pair.1)
                    .ok_or(TokenizerError::UnknownTokenId(rule.pair.1))?;
                Ok((left.to_string(), right.to_string()))
            })
            .collect()
    }

    /// Rebuild rules from `(left, right)` token strings in rank order.
    ///
    /// Both symbols and their concatenation must be registered in `vocab`;
    /// otherwise the artifact is corrupt.
    pub fn from_string_pairs<I, L, R>(pairs: I, vocab: &Vocabulary) -> Result<Self>
    where
        I: IntoIterator<Item = (L, R)>,
        L: AsRef<str>,
        R: AsRef<str>,
    {
        let pairs = pairs.into_iter();
        let mut rules = Self::with_capacity(pairs.size_hint().0);

        for (rank, (left, right)) in pairs.enumerate() {
            let (left, right) = (left.as_ref(), right.as_ref());
            let lookup = |symbol: &str| {
                vocab.get_id(symbol).ok_or_else(|| {
                    TokenizerError::CorruptArtifact(format!(
                        "merge #{} references unregistered symbol '{}'",
                        rank, symbol
                    ))
                })
            };
            let pair = (lookup(left)?, lookup(right)?);
            let merged = format!("{}{}", left, right);
            let new_id = lookup(&merged)?;
            rules.push(pair, new_id);
        }

        Ok(rules)
    }
}

impl PartialEq for MergeRules {
    fn eq(&self, other: &Self) -> bool {
        // `ranks` is derived from `rules`.
        self.rules == other.rules
    }
}

impl Eq for MergeRules {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_ranks_in_order() {
        let mut rules = MergeRules::new();
        assert_eq!(rules.push((0, 1), 100), 0);
        assert_eq!(rules.push((1, 2), 101), 1);

        assert_eq!(rules.len(), 2);
        assert_eq!(rules.get(1), Some(&MergeRule { pair: (1, 2), new_id: 101 }));
        assert_eq!(rules.get(2), None);
    }

    #[test]
    fn test_next_rank() {
        let mut rules = MergeRules::new();
        rules.push((0, 1), 100);
        rules.push((1, 2), 101);

        assert_eq!(rules.next_rank((0, 1), None), Some((0, 100)));
        assert_eq!(rules.next_rank((1, 2), Some(0)), Some((1, 101)));
        // Already passed
        assert_eq!(rules.next_rank((0, 1), Some(0)), None);
        assert_eq!(rules.next_rank((2, 3), None), None);
    }

    #[test]
    fn test_next_rank_with_repeated_pair() {
        let mut rules = MergeRules::new();
        rules.push((5, 6), 7);
        rules.push((1, 2), 3);
        rules.push((5, 6), 7);

        assert_eq!(rules.next_rank((5, 6), None), Some((0, 7)));
        assert_eq!(rules.next_rank((5, 6), Some(0)), Some((2, 7)));
        assert_eq!(rules.next_rank((5, 6), Some(1)), Some((2, 7)));
        assert_eq!(rules.next_rank((5, 6), Some(2)), None);
    }

    #[test]
    fn test_string_pairs_roundtrip() {
        let mut vocab = Vocabulary::new();
        let a = vocab.add_token("a");
        let b = vocab.add_token("b");
        let ab = vocab.add_token("ab");

        let mut rules = MergeRules::new();
        rules.push((a, b), ab);

        let pairs = rules.to_string_pairs(&vocab).unwrap();
        assert_eq!(pairs, vec![("a".to_string(), "b".to_string())]);

        let rebuilt = MergeRules::from_string_pairs(pairs, &vocab).unwrap();
        assert_eq!(rebuilt, rules);
    }

    #[test]
    fn test_from_string_pairs_rejects_unregistered_symbols() {
        let mut vocab = Vocabulary::new();
        vocab.add_token("a");
        vocab.add_token("b");

        // "ab" itself is missing
        let err = MergeRules::from_string_pairs([("a", "b")], &vocab).unwrap_err();
        assert!(matches!(err, TokenizerError::CorruptArtifact(_)));

        let err = MergeRules::from_string_pairs([("a", "z")], &vocab).unwrap_err();
        assert!(matches!(err, TokenizerError::CorruptArtifact(_)));
    }
}
