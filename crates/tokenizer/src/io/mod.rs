//! Serialization and deserialization for BPE models.
//!
//! Tokenizers load from and save to a single JSON artifact. The HuggingFace
//! `vocab.json` + `merges.txt` pair can be exported for interoperability.

pub mod format;
pub mod load;
pub mod save;

pub use format::{ModelFormat, OrderedVocab, SerializedPreTokenizer, SerializedTokenizer};
pub use load::TokenizerLoader;
pub use save::TokenizerSaver;
