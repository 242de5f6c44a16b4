//! Core BPE data structures.
//!
//! This module contains the vocabulary, the ordered merge rules, and the
//! priority queue used while learning merges.

pub mod merges;
pub mod priority;
pub mod vocab;

pub use merges::{MergeMap, MergeRule, MergeRules, Pair};
pub use priority::{MergeCandidate, PairPriorityQueue};
pub use vocab::{SpecialTokens, SpecialTokensConfig, Vocab, Vocabulary, UNK_TOKEN};
