//! Pre-tokenization.
//!
//! Text is split into pre-tokens before BPE encoding; merges never cross a
//! pre-token boundary.

pub mod split;

pub use split::{SplitPattern, Splitter, WORD_PUNCT_PATTERN};
