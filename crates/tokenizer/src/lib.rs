//! shabda-tokenizer - High-level Marathi BPE tokenizer API
//!
//! This crate ties the pieces together: pre-tokenization, training through
//! `shabda-training`, codepoint-level encoding and decoding through
//! `shabda-core`, and persistence of trained tokenizers.
//!
//! # Features
//!
//! - Builder for training configuration
//! - Whitespace, word/punctuation and custom regex pre-tokenizers
//! - Parallel batch encoding
//! - JSON artifacts with strict validation on load, HuggingFace export
//! - Corpus cleaning for raw Marathi text
//!
//! # Example
//!
//! ```rust
//! use shabda_tokenizer::Tokenizer;
//!
//! let tokenizer = Tokenizer::train(["ab ab ab", "bc bc"], 5, &["<unk>"])?;
//!
//! let encoding = tokenizer.encode("ab bc")?;
//! assert_eq!(encoding.tokens, vec!["ab", "b", "c"]);
//! assert_eq!(encoding.ids, vec![4, 2, 3]);
//!
//! let text = tokenizer.decode(&encoding.ids, false)?;
//! assert_eq!(text, "abbc");
//! # Ok::<(), shabda_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use shabda_core::{MergeRules, Result, SpecialTokensConfig, TokenizerError, Vocabulary};
pub use shabda_training::{StopReason, TrainingReport};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{Encoding, Tokenizer, TokenizerBuilder, TokenizerConfig};

// IO/Serialization
pub mod io;
pub use io::{ModelFormat, TokenizerLoader, TokenizerSaver};

// Pre-tokenization
pub mod pre_tokenizer;
pub use pre_tokenizer::{SplitPattern, Splitter};

// Corpus cleaning
pub mod cleaning;
pub use cleaning::{CleanStats, CorpusCleaner, NormalizationForm};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
