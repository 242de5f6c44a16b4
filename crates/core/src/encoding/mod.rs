//! Encoding of pre-tokenized words with a trained vocabulary.
//!
//! Words start as one symbol per Unicode codepoint; merges are then replayed
//! in learned order.

pub mod char_level;

pub use char_level::{CharLevelEncoder, WordEncoding};
