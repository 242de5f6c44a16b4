//! Vocabulary storage and lookup.
//!
//! Token strings are stored once per direction: an `AHashMap` for
//! string -> id lookups and a dense `Vec` for id -> string. Ids are always
//! `0..len()` with no gaps, and special tokens occupy the lowest ids.

use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use compact_str::CompactString;

/// Forward mapping: token string -> ID
pub type Vocab = AHashMap<CompactString, u32>;

/// Name of the unknown-symbol token.
pub const UNK_TOKEN: &str = "<unk>";

/// Vocabulary with forward and reverse mappings.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    /// Forward mapping: token string -> ID
    vocab: Vocab,
    /// Reverse mapping: ID -> token string (index = ID)
    tokens: Vec<CompactString>,
    /// Special token IDs (cached for fast access)
    special: SpecialTokens,
}

impl Vocabulary {
    /// Create a new empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new vocabulary with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vocab: Vocab::with_capacity(capacity),
            tokens: Vec::with_capacity(capacity),
            special: SpecialTokens::default(),
        }
    }

    /// Create a vocabulary seeded with special tokens at ids `0..k`.
    ///
    /// Fails if a special token is empty or listed twice.
    pub fn with_special_tokens<S: AsRef<str>>(special: &[S]) -> Result<Self> {
        let mut vocab = Self::with_capacity(special.len());

        for token in special {
            let token = token.as_ref();
            if token.is_empty() {
                return Err(TokenizerError::InvalidConfig(
                    "special tokens must not be empty".to_string(),
                ));
            }
            if vocab.get_id(token).is_some() {
                return Err(TokenizerError::InvalidConfig(format!(
                    "special token '{}' listed more than once",
                    token
                )));
            }
            vocab.add_token(token);
        }

        vocab.special = SpecialTokens {
            count: vocab.len() as u32,
            unk: vocab.get_id(UNK_TOKEN),
        };

        Ok(vocab)
    }

    /// Rebuild a vocabulary from an explicit token -> id table.
    ///
    /// Validates that ids are dense (`0..len`), ids and tokens are unique, and that
    /// `special[i]` is assigned id `i`. Any violation is a
    /// [`TokenizerError::CorruptArtifact`].
    pub fn from_id_map<I, S>(entries: I, special: &[S]) -> Result<Self>
    where
        I: IntoIterator<Item = (String, u32)>,
        S: AsRef<str>,
    {
        let entries: Vec<(String, u32)> = entries.into_iter().collect();
        let len = entries.len();
        let mut slots: Vec<Option<CompactString>> = vec![None; len];

        for (token, id) in entries {
            let slot = slots.get_mut(id as usize).ok_or_else(|| {
                TokenizerError::CorruptArtifact(format!(
                    "id {} for token '{}' is outside the dense range 0..{}",
                    id, token, len
                ))
            })?;
            if let Some(existing) = slot {
                return Err(TokenizerError::CorruptArtifact(format!(
                    "id {} is assigned to both '{}' and '{}'",
                    id, existing, token
                )));
            }
            *slot = Some(CompactString::new(&token));
        }

        let mut vocab = Self::with_capacity(len);
        for (id, slot) in slots.into_iter().enumerate() {
            // With `len` entries, no duplicate ids and every id < len, all
            // slots are filled.
            let token = slot.ok_or_else(|| {
                TokenizerError::CorruptArtifact(format!("id {} has no token", id))
            })?;
            if vocab.vocab.insert(token.clone(), id as u32).is_some() {
                return Err(TokenizerError::CorruptArtifact(format!(
                    "token '{}' is listed more than once",
                    token
                )));
            }
            vocab.tokens.push(token);
        }

        for (expected, token) in special.iter().enumerate() {
            let token = token.as_ref();
            match vocab.get_id(token) {
                Some(id) if id as usize == expected => {}
                Some(id) => {
                    return Err(TokenizerError::CorruptArtifact(format!(
                        "special token '{}' has id {}, expected {}",
                        token, id, expected
                    )))
                }
                None => {
                    return Err(TokenizerError::CorruptArtifact(format!(
                        "special token '{}' is missing from the vocabulary",
                        token
                    )))
                }
            }
        }

        vocab.special = SpecialTokens {
            count: special.len() as u32,
            unk: special
                .iter()
                .position(|t| t.as_ref() == UNK_TOKEN)
                .map(|i| i as u32),
        };

        Ok(vocab)
    }

    /// Add a token to the vocabulary.
    ///
    /// Returns the ID assigned to the token, or the existing ID if the
    /// token is already present.
    pub fn add_token(&mut self, token: &str) -> u32 {
        if let Some(&id) = self.vocab.get(token) {
            return id;
        }

        let token = CompactString::new(token);
        let id = self.tokens.len() as u32;
        self.tokens.push(token.clone());
        self.vocab.insert(token, id);

        id
    }

    /// Get the ID for a token string.
    #[inline]
    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.vocab.get(token).copied()
    }

    /// Get the token string for an ID.
    #[inline]
    pub fn get_token(&self, id: u32) -> Option<&str> {
        self.tokens.get(id as usize).map(|s| s.as_str())
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Special token strings, in id order.
    pub fn special_tokens(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens[..self.special.count as usize]
            .iter()
            .map(|s| s.as_str())
    }

    /// Cached special token IDs.
    #[inline]
    pub fn special(&self) -> &SpecialTokens {
        &self.special
    }

    /// Iterate over `(id, token)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .map(|(id, token)| (id as u32, token.as_str()))
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        // The forward map is derived from `tokens`.
        self.tokens == other.tokens && self.special == other.special
    }
}

impl Eq for Vocabulary {}

/// Special token IDs cached for fast access.
///
/// Special tokens always occupy ids `0..count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecialTokens {
    /// Number of special tokens
    pub count: u32,
    /// Unknown token ID, if `<unk>` is one of the special tokens
    pub unk: Option<u32>,
}

impl SpecialTokens {
    /// Check if an ID is a special token.
    #[inline]
    pub fn is_special(&self, id: u32) -> bool {
        id < self.count
    }
}

/// Configuration for special tokens.
///
/// The declared order is the id order: `tokens[i]` gets id `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialTokensConfig {
    pub tokens: Vec<String>,
}

impl SpecialTokensConfig {
    /// Special tokens in the given order.
    pub fn new<S: Into<String>>(tokens: impl IntoIterator<Item = S>) -> Self {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Only the `<unk>` token.
    pub fn unk_only() -> Self {
        Self::new([UNK_TOKEN])
    }

    /// No special tokens at all.
    pub fn none() -> Self {
        Self { tokens: Vec::new() }
    }
}

impl Default for SpecialTokensConfig {
    fn default() -> Self {
        Self::new(["<pad>", "<s>", "</s>", UNK_TOKEN, "<mask>"])
    }
}
