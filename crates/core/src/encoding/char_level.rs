//! Character-level BPE encoding.
//!
//! Every Unicode codepoint of a word starts as its own symbol. Merge rules
//! are then replayed in learned order: the lowest-ranked rule whose pair is
//! present fires on every non-overlapping occurrence, left to right, and the
//! scan continues with strictly higher ranks only. Skipping rules whose pair
//! is absent gives exactly the result of walking the full rule list once.

use crate::core::{MergeRules, Pair, Vocabulary, UNK_TOKEN};
use crate::{Result, TokenizerError};
use std::sync::Arc;

/// A symbol during encoding: either a vocabulary entry or a codepoint the
/// vocabulary has never seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symbol {
    Known(u32),
    Unknown(char),
}

/// Tokens and ids for one pre-tokenized word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordEncoding {
    /// Token strings
    pub tokens: Vec<String>,
    /// Token IDs, parallel to `tokens`
    pub ids: Vec<u32>,
}

/// Character-level BPE encoder.
///
/// Holds the vocabulary and merge rules behind `Arc`s; cloning is cheap and
/// the encoder is safe to share across threads.
#[derive(Debug, Clone)]
pub struct CharLevelEncoder {
    /// Vocabulary for token lookups
    vocab: Arc<Vocabulary>,
    /// Merge rules in learned order
    merges: Arc<MergeRules>,
}

impl CharLevelEncoder {
    /// Create a new character-level encoder.
    pub fn new(vocab: Arc<Vocabulary>, merges: Arc<MergeRules>) -> Self {
        Self { vocab, merges }
    }

    /// The vocabulary used for lookups.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// The merge rules replayed during encoding.
    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    /// Encode a single pre-tokenized word.
    ///
    /// Codepoints missing from the vocabulary become `<unk>`, as do
    /// codepoints that spell a special token. If the vocabulary has no
    /// `<unk>` token this is an [`TokenizerError::UnknownToken`] error.
    pub fn encode_word(&self, word: &str) -> Result<WordEncoding> {
        let mut buf = [0u8; 4];
        let mut symbols: Vec<Symbol> = word
            .chars()
            .map(|c| match self.vocab.get_id(c.encode_utf8(&mut buf)) {
                Some(id) if !self.vocab.special().is_special(id) => Symbol::Known(id),
                _ => Symbol::Unknown(c),
            })
            .collect();

        self.apply_bpe_merges(&mut symbols);

        let mut encoding = WordEncoding {
            tokens: Vec::with_capacity(symbols.len()),
            ids: Vec::with_capacity(symbols.len()),
        };

        for symbol in symbols {
            let (id, token) = match symbol {
                Symbol::Known(id) => {
                    let token = self
                        .vocab
                        .get_token(id)
                        .ok_or(TokenizerError::UnknownTokenId(id))?;
                    (id, token)
                }
                Symbol::Unknown(c) => {
                    let unk = self
                        .vocab
                        .special()
                        .unk
                        .ok_or_else(|| TokenizerError::UnknownToken(c.to_string()))?;
                    (unk, UNK_TOKEN)
                }
            };
            encoding.ids.push(id);
            encoding.tokens.push(token.to_string());
        }

        Ok(encoding)
    }

    /// Apply BPE merge rules to a symbol sequence, in rank order.
    fn apply_bpe_merges(&self, symbols: &mut Vec<Symbol>) {
        let mut last_rank: Option<u32> = None;

        while symbols.len() >= 2 {
            let next = symbols
                .windows(2)
                .filter_map(|w| match (w[0], w[1]) {
                    (Symbol::Known(left), Symbol::Known(right)) => {
                        self.merges.next_rank((left, right), last_rank)
                    }
                    _ => None,
                })
                .min_by_key(|&(rank, _)| rank);

            let Some((rank, new_id)) = next else {
                break;
            };
            let Some(rule) = self.merges.get(rank) else {
                break;
            };

            merge_all(symbols, rule.pair, new_id);
            last_rank = Some(rank);
        }
    }

    /// Decode token IDs back to text.
    ///
    /// Token strings are concatenated as-is; whitespace dropped by the
    /// pre-tokenizer is not restored.
    pub fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> Result<String> {
        let special = self.vocab.special();
        let mut text = String::new();

        for &id in ids {
            let token = self
                .vocab
                .get_token(id)
                .ok_or(TokenizerError::UnknownTokenId(id))?;
            if skip_special_tokens && special.is_special(id) {
                continue;
            }
            text.push_str(token);
        }

        Ok(text)
    }
}

/// Replace every non-overlapping occurrence of `pair`, scanning left to right.
fn merge_all(symbols: &mut Vec<Symbol>, pair: Pair, new_id: u32) {
    let (left, right) = (Symbol::Known(pair.0), Symbol::Known(pair.1));
    let mut merged = Vec::with_capacity(symbols.len());
    let mut i = 0;

    while i < symbols.len() {
        if i + 1 < symbols.len() && symbols[i] == left && symbols[i + 1] == right {
            merged.push(Symbol::Known(new_id));
            i += 2;
        } else {
            merged.push(symbols[i]);
            i += 1;
        }
    }

    *symbols = merged;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab_with(tokens: &[&str]) -> Vocabulary {
        let mut vocab = Vocabulary::with_special_tokens(&[UNK_TOKEN]).unwrap();
        for token in tokens {
            vocab.add_token(token);
        }
        vocab
    }

    fn encoder(vocab: Vocabulary, rules: &[(&str, &str)]) -> CharLevelEncoder {
        let merges = MergeRules::from_string_pairs(rules.iter().copied(), &vocab).unwrap();
        CharLevelEncoder::new(Arc::new(vocab), Arc::new(merges))
    }

    #[test]
    fn test_encode_without_merges() {
        let encoder = encoder(vocab_with(&["h", "e", "l", "o"]), &[]);

        let result = encoder.encode_word("hello").unwrap();
        assert_eq!(result.tokens, vec!["h", "e", "l", "l", "o"]);
        assert_eq!(result.ids, vec![1, 2, 3, 3, 4]);
    }

    #[test]
    fn test_rules_apply_in_learned_order() {
        let vocab = vocab_with(&["a", "b", "c", "ab", "abc", "bc"]);
        let encoder = encoder(vocab, &[("a", "b"), ("ab", "c"), ("b", "c")]);

        let result = encoder.encode_word("abc").unwrap();
        assert_eq!(result.tokens, vec!["abc"]);
    }

    #[test]
    fn test_earlier_rule_wins() {
        let vocab = vocab_with(&["a", "b", "c", "ab", "bc"]);
        let encoder = encoder(vocab, &[("b", "c"), ("a", "b")]);

        let result = encoder.encode_word("abc").unwrap();
        assert_eq!(result.tokens, vec!["a", "bc"]);
    }

    #[test]
    fn test_passed_rules_do_not_fire_again() {
        // (abc, d) ranks before the rules that build "abc" in this word, so
        // replaying the list once never reaches it.
        let vocab = vocab_with(&["a", "b", "c", "d", "abc", "abcd", "bc"]);
        let encoder = encoder(vocab, &[("abc", "d"), ("b", "c"), ("a", "bc")]);

        let result = encoder.encode_word("abcd").unwrap();
        assert_eq!(result.tokens, vec!["abc", "d"]);
    }

    #[test]
    fn test_overlapping_occurrences_merge_left_to_right() {
        let vocab = vocab_with(&["a", "aa"]);
        let encoder = encoder(vocab, &[("a", "a")]);

        let result = encoder.encode_word("aaa").unwrap();
        assert_eq!(result.tokens, vec!["aa", "a"]);
    }

    #[test]
    fn test_unknown_codepoint_maps_to_unk() {
        let vocab = vocab_with(&["म", "ा", "मा"]);
        let encoder = encoder(vocab, &[("म", "ा")]);

        let result = encoder.encode_word("माझ").unwrap();
        assert_eq!(result.tokens, vec!["मा", "<unk>"]);
        assert_eq!(result.ids[1], 0);
    }

    #[test]
    fn test_unknown_codepoint_without_unk_is_an_error() {
        let mut vocab = Vocabulary::new();
        vocab.add_token("a");
        let encoder = CharLevelEncoder::new(Arc::new(vocab), Arc::new(MergeRules::new()));

        let err = encoder.encode_word("ab").unwrap_err();
        assert!(matches!(err, TokenizerError::UnknownToken(ref s) if s == "b"));
    }

    #[test]
    fn test_codepoint_spelling_a_special_token_is_unknown() {
        let mut vocab = Vocabulary::with_special_tokens(&[UNK_TOKEN, "#"]).unwrap();
        vocab.add_token("a");
        let encoder = CharLevelEncoder::new(Arc::new(vocab), Arc::new(MergeRules::new()));

        let result = encoder.encode_word("a#").unwrap();
        assert_eq!(result.tokens, vec!["a", "<unk>"]);
        assert_eq!(result.ids, vec![2, 0]);
    }

    #[test]
    fn test_decode() {
        let vocab = vocab_with(&["a", "b", "ab"]);
        let encoder = encoder(vocab, &[("a", "b")]);

        assert_eq!(encoder.decode(&[3, 2, 0], false).unwrap(), "abb<unk>");
        assert_eq!(encoder.decode(&[0, 3, 2], true).unwrap(), "abb");
        assert!(matches!(
            encoder.decode(&[1, 99], false),
            Err(TokenizerError::UnknownTokenId(99))
        ));
    }
}
