//! Training infrastructure for BPE tokenizers.
//!
//! This module provides the word-frequency counter, the per-word symbol
//! sequences and the trainer that learns merge rules from them.

pub mod counter;
pub mod trainer;
pub mod word;

pub use counter::{count_pairs_parallel, count_pairs_sequential, WordCounter};
pub use trainer::{
    BpeTrainer, StopReason, TrainingConfig, TrainingConfigBuilder, TrainingOutput, TrainingReport,
};
pub use word::Word;
