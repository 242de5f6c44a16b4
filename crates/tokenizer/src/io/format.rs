//! Format definitions for tokenizer serialization.
//!
//! The JSON artifact holds everything needed to rebuild a tokenizer:
//! the vocabulary, the merge list in rank order, the special tokens and the
//! pre-tokenizer. Vocabulary entries are written in id order so saving the
//! same tokenizer twice produces identical bytes.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Model format types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// Single JSON artifact (load and save)
    Json,
    /// HuggingFace tokenizer files, vocab.json + merges.txt (save only)
    HuggingFace,
}

/// Header line of an exported `merges.txt`.
pub const HF_MERGES_HEADER: &str = "#version: 0.2";

/// Token -> id entries kept in file order.
///
/// Serializes as a JSON object. Deserializing keeps duplicate keys instead of
/// silently dropping them, so the loader can reject them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedVocab(pub Vec<(String, u32)>);

impl Serialize for OrderedVocab {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (token, id) in &self.0 {
            map.serialize_entry(token, id)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OrderedVocab {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVocabVisitor;

        impl<'de> Visitor<'de> for OrderedVocabVisitor {
            type Value = OrderedVocab;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of token strings to ids")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((token, id)) = access.next_entry::<String, u32>()? {
                    entries.push((token, id));
                }
                Ok(OrderedVocab(entries))
            }
        }

        deserializer.deserialize_map(OrderedVocabVisitor)
    }
}

/// Pre-tokenizer in serialized format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SerializedPreTokenizer {
    Whitespace,
    WordPunct,
    Custom { pattern: String },
}

/// Complete tokenizer serialization format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedTokenizer {
    /// Format version, the crate version that wrote the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Number of vocabulary entries
    pub vocab_size: usize,
    /// Special tokens in id order
    pub special_tokens: Vec<String>,
    /// Vocabulary (token -> ID mapping)
    pub vocab: OrderedVocab,
    /// Merge rules in rank order
    pub merges: Vec<(String, String)>,
    /// Pre-tokenizer, whitespace when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_tokenizer: Option<SerializedPreTokenizer>,
}
