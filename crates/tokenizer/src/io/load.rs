//! Load functionality for pre-trained tokenizers.
//!
//! Every artifact is validated before use; any structural problem is a
//! [`TokenizerError::CorruptArtifact`] and nothing is partially loaded.

use super::format::{SerializedPreTokenizer, SerializedTokenizer};
use crate::pre_tokenizer::Splitter;
use log::{debug, info};
use shabda_core::{MergeRules, Result, TokenizerError, Vocabulary};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Tokenizer loader - handles loading trained models.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Load a tokenizer from a JSON artifact file.
    pub fn load(path: &Path) -> Result<(Vocabulary, MergeRules, Splitter)> {
        let file = File::open(path).map_err(|e| TokenizerError::io(path, e))?;
        let reader = BufReader::new(file);
        let serialized: SerializedTokenizer =
            serde_json::from_reader(reader).map_err(corrupt_json)?;

        let loaded = Self::deserialize(serialized)?;
        info!(
            "Loaded tokenizer ({} tokens, {} merges) from {}",
            loaded.0.len(),
            loaded.1.len(),
            path.display()
        );
        Ok(loaded)
    }

    /// Load a tokenizer from a JSON artifact string.
    pub fn from_json_str(json: &str) -> Result<(Vocabulary, MergeRules, Splitter)> {
        let serialized: SerializedTokenizer = serde_json::from_str(json).map_err(corrupt_json)?;
        Self::deserialize(serialized)
    }

    /// Validate and rebuild from a serialized structure.
    pub fn deserialize(data: SerializedTokenizer) -> Result<(Vocabulary, MergeRules, Splitter)> {
        if let Some(version) = &data.version {
            debug!("Artifact written by version {}", version);
        }

        if data.vocab_size != data.vocab.0.len() {
            return Err(TokenizerError::CorruptArtifact(format!(
                "vocab_size is {} but the vocabulary has {} entries",
                data.vocab_size,
                data.vocab.0.len()
            )));
        }

        let vocab = Vocabulary::from_id_map(data.vocab.0, &data.special_tokens)?;
        let merges = MergeRules::from_string_pairs(data.merges, &vocab)?;

        let splitter = match data.pre_tokenizer {
            None | Some(SerializedPreTokenizer::Whitespace) => Splitter::whitespace(),
            Some(SerializedPreTokenizer::WordPunct) => Splitter::word_punct(),
            Some(SerializedPreTokenizer::Custom { pattern }) => {
                Splitter::custom(&pattern).map_err(|e| {
                    TokenizerError::CorruptArtifact(format!("pre_tokenizer: {}", e))
                })?
            }
        };

        Ok((vocab, merges, splitter))
    }
}

/// A file that does not parse is a corrupt artifact.
fn corrupt_json(err: serde_json::Error) -> TokenizerError {
    if err.is_io() {
        TokenizerError::Json(err)
    } else {
        TokenizerError::CorruptArtifact(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::save::TokenizerSaver;

    fn artifact(vocab: &str, merges: &str) -> String {
        let size = vocab.matches(':').count();
        format!(
            r#"{{"vocab_size": {}, "special_tokens": ["<unk>"], "vocab": {}, "merges": {}}}"#,
            size, vocab, merges
        )
    }

    #[test]
    fn test_load_roundtrip() {
        let temp_dir = std::env::temp_dir().join("shabda_test_load");
        let path = temp_dir.join("tokenizer.json");

        let mut vocab = Vocabulary::with_special_tokens(&["<pad>", "<unk>"]).unwrap();
        let m = vocab.add_token("म");
        let aa = vocab.add_token("ा");
        let ma = vocab.add_token("मा");
        let mut merges = MergeRules::new();
        merges.push((m, aa), ma);
        let splitter = Splitter::custom(r"\S+").unwrap();

        TokenizerSaver::new(&vocab, &merges, &splitter)
            .save(&path)
            .unwrap();
        let (loaded_vocab, loaded_merges, loaded_splitter) = TokenizerLoader::load(&path).unwrap();

        assert_eq!(loaded_vocab, vocab);
        assert_eq!(loaded_merges, merges);
        assert_eq!(loaded_splitter, splitter);
        assert_eq!(loaded_vocab.special().unk, Some(1));

        // Cleanup
        std::fs::remove_dir_all(temp_dir).ok();
    }

    #[test]
    fn test_defaults_for_optional_fields() {
        let json = artifact(r#"{"<unk>": 0, "a": 1, "b": 2, "ab": 3}"#, r#"[["a", "b"]]"#);
        let (vocab, merges, splitter) = TokenizerLoader::from_json_str(&json).unwrap();

        assert_eq!(vocab.len(), 4);
        assert_eq!(merges.len(), 1);
        assert_eq!(splitter, Splitter::whitespace());
    }

    #[test]
    fn test_rejects_size_mismatch() {
        let json = r#"{"vocab_size": 3, "special_tokens": [], "vocab": {"a": 0}, "merges": []}"#;
        assert!(matches!(
            TokenizerLoader::from_json_str(json),
            Err(TokenizerError::CorruptArtifact(_))
        ));
    }

    #[test]
    fn test_rejects_gaps_and_duplicates() {
        let gap = artifact(r#"{"<unk>": 0, "a": 2}"#, "[]");
        assert!(matches!(
            TokenizerLoader::from_json_str(&gap),
            Err(TokenizerError::CorruptArtifact(_))
        ));

        let duplicate_id = artifact(r#"{"<unk>": 0, "a": 1, "b": 1}"#, "[]");
        assert!(matches!(
            TokenizerLoader::from_json_str(&duplicate_id),
            Err(TokenizerError::CorruptArtifact(_))
        ));

        let duplicate_token = artifact(r#"{"<unk>": 0, "a": 1, "a": 2}"#, "[]");
        assert!(matches!(
            TokenizerLoader::from_json_str(&duplicate_token),
            Err(TokenizerError::CorruptArtifact(_))
        ));
    }

    #[test]
    fn test_rejects_misplaced_special_token() {
        let json = artifact(r#"{"a": 0, "<unk>": 1}"#, "[]");
        assert!(matches!(
            TokenizerLoader::from_json_str(&json),
            Err(TokenizerError::CorruptArtifact(_))
        ));
    }

    #[test]
    fn test_rejects_unregistered_merge_symbols() {
        let missing_merged = artifact(r#"{"<unk>": 0, "a": 1, "b": 2}"#, r#"[["a", "b"]]"#);
        assert!(matches!(
            TokenizerLoader::from_json_str(&missing_merged),
            Err(TokenizerError::CorruptArtifact(_))
        ));

        let missing_side = artifact(r#"{"<unk>": 0, "a": 1, "ab": 2}"#, r#"[["a", "b"]]"#);
        assert!(matches!(
            TokenizerLoader::from_json_str(&missing_side),
            Err(TokenizerError::CorruptArtifact(_))
        ));
    }

    #[test]
    fn test_rejects_bad_pattern_and_malformed_json() {
        let json = r#"{"vocab_size": 1, "special_tokens": [], "vocab": {"a": 0}, "merges": [],
            "pre_tokenizer": {"type": "custom", "pattern": "(unclosed"}}"#;
        assert!(matches!(
            TokenizerLoader::from_json_str(json),
            Err(TokenizerError::CorruptArtifact(_))
        ));

        assert!(matches!(
            TokenizerLoader::from_json_str("{\"vocab\": "),
            Err(TokenizerError::CorruptArtifact(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("shabda_test_missing").join("nope.json");
        assert!(matches!(
            TokenizerLoader::load(&path),
            Err(TokenizerError::Io { .. })
        ));
    }
}
