//! Save functionality for trained tokenizers.
//!
//! This module provides methods for saving trained tokenizers to disk
//! in various formats.

use super::format::{
    OrderedVocab, SerializedPreTokenizer, SerializedTokenizer, HF_MERGES_HEADER,
};
use crate::pre_tokenizer::{SplitPattern, Splitter};
use log::info;
use shabda_core::{MergeRules, Result, TokenizerError, Vocabulary};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Tokenizer saver - handles saving trained models.
pub struct TokenizerSaver<'a> {
    /// Vocabulary reference
    vocab: &'a Vocabulary,
    /// Merge rules reference
    merges: &'a MergeRules,
    /// Pre-tokenizer reference
    splitter: &'a Splitter,
}

impl<'a> TokenizerSaver<'a> {
    /// Create a new tokenizer saver.
    pub fn new(vocab: &'a Vocabulary, merges: &'a MergeRules, splitter: &'a Splitter) -> Self {
        Self {
            vocab,
            merges,
            splitter,
        }
    }

    /// Save the tokenizer as a single JSON file.
    ///
    /// Missing parent directories are created.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TokenizerError::io(parent, e))?;
        }

        let file = File::create(path).map_err(|e| TokenizerError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.serialize()?)?;
        writer.flush().map_err(|e| TokenizerError::io(path, e))?;

        info!(
            "Saved tokenizer ({} tokens, {} merges) to {}",
            self.vocab.len(),
            self.merges.len(),
            path.display()
        );
        Ok(())
    }

    /// Serialize the tokenizer to a pretty-printed JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.serialize()?)?)
    }

    /// Save in HuggingFace format (vocab.json + merges.txt).
    ///
    /// This creates two files in `dir`:
    /// - `vocab.json`: Token to ID mapping, in id order
    /// - `merges.txt`: `#version: 0.2` header, then one `left right` pair per line
    pub fn save_huggingface(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).map_err(|e| TokenizerError::io(dir, e))?;

        let vocab_path = dir.join("vocab.json");
        let vocab_file = File::create(&vocab_path).map_err(|e| TokenizerError::io(&vocab_path, e))?;
        let mut vocab_writer = BufWriter::new(vocab_file);
        serde_json::to_writer_pretty(&mut vocab_writer, &self.ordered_vocab())?;
        vocab_writer
            .flush()
            .map_err(|e| TokenizerError::io(&vocab_path, e))?;

        let merges_path = dir.join("merges.txt");
        let merges_file =
            File::create(&merges_path).map_err(|e| TokenizerError::io(&merges_path, e))?;
        let mut merges_writer = BufWriter::new(merges_file);
        let write_err = |e| TokenizerError::io(&merges_path, e);

        writeln!(merges_writer, "{}", HF_MERGES_HEADER).map_err(write_err)?;
        for (left, right) in self.merges.to_string_pairs(self.vocab)? {
            writeln!(merges_writer, "{} {}", left, right).map_err(write_err)?;
        }
        merges_writer.flush().map_err(write_err)?;

        Ok(())
    }

    fn ordered_vocab(&self) -> OrderedVocab {
        OrderedVocab(
            self.vocab
                .iter()
                .map(|(id, token)| (token.to_string(), id))
                .collect(),
        )
    }

    /// Serialize the tokenizer to a structure.
    pub(crate) fn serialize(&self) -> Result<SerializedTokenizer> {
        let pre_tokenizer = match self.splitter.pattern() {
            SplitPattern::Whitespace => SerializedPreTokenizer::Whitespace,
            SplitPattern::WordPunct => SerializedPreTokenizer::WordPunct,
            SplitPattern::Custom(re) => SerializedPreTokenizer::Custom {
                pattern: re.as_str().to_string(),
            },
        };

        Ok(SerializedTokenizer {
            version: Some(crate::VERSION.to_string()),
            vocab_size: self.vocab.len(),
            special_tokens: self.vocab.special_tokens().map(str::to_string).collect(),
            vocab: self.ordered_vocab(),
            merges: self.merges.to_string_pairs(self.vocab)?,
            pre_tokenizer: Some(pre_tokenizer),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vocabulary, MergeRules) {
        let mut vocab = Vocabulary::with_special_tokens(&["<unk>"]).unwrap();
        let a = vocab.add_token("a");
        let b = vocab.add_token("b");
        vocab.add_token("c");
        let ab = vocab.add_token("ab");
        let mut merges = MergeRules::new();
        merges.push((a, b), ab);
        (vocab, merges)
    }

    #[test]
    fn test_serialize() {
        let (vocab, merges) = sample();
        let splitter = Splitter::default();

        let serialized = TokenizerSaver::new(&vocab, &merges, &splitter)
            .serialize()
            .unwrap();

        assert_eq!(serialized.vocab_size, 5);
        assert_eq!(serialized.special_tokens, vec!["<unk>"]);
        let ids: Vec<u32> = serialized.vocab.0.iter().map(|(_, id)| *id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(serialized.merges, vec![("a".to_string(), "b".to_string())]);
        assert_eq!(serialized.version.as_deref(), Some(env!("CARGO_PKG_VERSION")));
        assert_eq!(
            serialized.pre_tokenizer,
            Some(SerializedPreTokenizer::Whitespace)
        );
    }

    #[test]
    fn test_json_is_deterministic() {
        let (vocab, merges) = sample();
        let splitter = Splitter::word_punct();
        let saver = TokenizerSaver::new(&vocab, &merges, &splitter);

        assert_eq!(saver.to_json_string().unwrap(), saver.to_json_string().unwrap());
    }

    #[test]
    fn test_save_huggingface() {
        let (vocab, merges) = sample();
        let splitter = Splitter::default();
        let dir = std::env::temp_dir().join("shabda_test_save_hf");

        TokenizerSaver::new(&vocab, &merges, &splitter)
            .save_huggingface(&dir)
            .unwrap();

        let merges_txt = std::fs::read_to_string(dir.join("merges.txt")).unwrap();
        assert_eq!(merges_txt, "#version: 0.2\na b\n");

        let vocab_json = std::fs::read_to_string(dir.join("vocab.json")).unwrap();
        let parsed: OrderedVocab = serde_json::from_str(&vocab_json).unwrap();
        assert_eq!(parsed.0.len(), 5);
        assert_eq!(parsed.0[4], ("ab".to_string(), 4));

        // Cleanup
        std::fs::remove_dir_all(dir).ok();
    }
}
