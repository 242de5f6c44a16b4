//! Shabda-core - Core BPE data structures and encoding
//!
//! This crate provides the fundamental data structures for codepoint-level
//! byte-pair encoding (BPE), independent of how text is pre-tokenized.
//!
//! # Features
//!
//! - Dense vocabulary storage using `AHashMap` and compact strings
//! - Ordered merge rules with rank lookup
//! - Stale-tolerant priority queue for merge selection during training
//! - Deterministic, rank-ordered merge replay for encoding
//!
//! # Example
//!
//! ```rust
//! use shabda_core::{CharLevelEncoder, MergeRules, Vocabulary};
//! use std::sync::Arc;
//!
//! let mut vocab = Vocabulary::with_special_tokens(&["<unk>"])?;
//! let a = vocab.add_token("a");
//! let b = vocab.add_token("b");
//! let ab = vocab.add_token("ab");
//!
//! let mut merges = MergeRules::new();
//! merges.push((a, b), ab);
//!
//! let encoder = CharLevelEncoder::new(Arc::new(vocab), Arc::new(merges));
//! assert_eq!(encoder.encode_word("abb")?.ids, vec![ab, b]);
//! # Ok::<(), shabda_core::TokenizerError>(())
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

// Core BPE data structures
pub mod core;
pub use core::{
    MergeCandidate, MergeMap, MergeRule, MergeRules, Pair, PairPriorityQueue, SpecialTokens,
    SpecialTokensConfig, Vocab, Vocabulary, UNK_TOKEN,
};

// Encoding
pub mod encoding;
pub use encoding::{CharLevelEncoder, WordEncoding};
