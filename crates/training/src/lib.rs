//! shabda-training - BPE vocabulary training
//!
//! This crate learns an ordered list of BPE merge rules from a
//! word-frequency table.
//!
//! # Features
//!
//! - Distinct-word counting with first-seen ordering
//! - Parallel pair counting and per-word merge rewrites with `rayon`
//! - Deterministic tie-breaking by first occurrence
//! - Configurable vocab size, min frequency, special tokens and merge cap
//!
//! # Example
//!
//! ```rust
//! use shabda_training::{BpeTrainer, SpecialTokensConfig, TrainingConfig};
//!
//! let config = TrainingConfig::builder()
//!     .vocab_size(5)
//!     .special_tokens(SpecialTokensConfig::unk_only())
//!     .build()?;
//!
//! let output = BpeTrainer::new(config).train_words(["ab", "ab", "ab", "bc", "bc"])?;
//! assert_eq!(output.vocab.get_id("ab"), Some(4));
//! # Ok::<(), shabda_training::TokenizerError>(())
//! ```

pub use shabda_core::{Result, SpecialTokensConfig, TokenizerError};

// Training infrastructure
pub mod training;
pub use training::{
    BpeTrainer, StopReason, TrainingConfig, TrainingConfigBuilder, TrainingOutput, TrainingReport,
    Word, WordCounter,
};
