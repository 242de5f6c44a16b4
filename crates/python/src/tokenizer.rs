//! PyO3 wrapper for the Tokenizer struct

use pyo3::prelude::*;
use shabda_tokenizer::{Encoding, SpecialTokensConfig, Splitter, Tokenizer, TokenizerBuilder};
use std::path::PathBuf;

use crate::error::{IntoPyErr, TokenizerResult};

/// Tokens and ids of an encoded text
#[pyclass(name = "Encoding", frozen)]
pub struct PyEncoding {
    #[pyo3(get)]
    tokens: Vec<String>,
    #[pyo3(get)]
    ids: Vec<u32>,
    #[pyo3(get)]
    word_ids: Vec<u32>,
}

impl From<Encoding> for PyEncoding {
    fn from(encoding: Encoding) -> Self {
        Self {
            tokens: encoding.tokens,
            ids: encoding.ids,
            word_ids: encoding.word_ids,
        }
    }
}

#[pymethods]
impl PyEncoding {
    /// Rejoin tokens with one space between words
    fn to_text(&self) -> String {
        Encoding {
            tokens: self.tokens.clone(),
            ids: self.ids.clone(),
            word_ids: self.word_ids.clone(),
        }
        .to_text()
    }

    fn __len__(&self) -> usize {
        self.ids.len()
    }

    fn __repr__(&self) -> String {
        format!("Encoding(tokens={:?}, ids={:?})", self.tokens, self.ids)
    }
}

fn special_tokens_config(special_tokens: Option<Vec<String>>) -> SpecialTokensConfig {
    special_tokens
        .map(|tokens| SpecialTokensConfig::new(tokens))
        .unwrap_or_default()
}

/// Python wrapper for the shabda Tokenizer
#[pyclass(name = "Tokenizer", frozen)]
pub struct PyTokenizer {
    inner: Tokenizer,
}

#[pymethods]
impl PyTokenizer {
    /// Load a tokenizer from a JSON file
    #[staticmethod]
    fn load(path: PathBuf) -> TokenizerResult<Self> {
        let inner = Tokenizer::load(&path).map_err(|e| e.into_py_err())?;
        Ok(PyTokenizer { inner })
    }

    /// Load a tokenizer from a JSON string
    #[staticmethod]
    fn from_json(json: &str) -> TokenizerResult<Self> {
        let inner = Tokenizer::from_json(json).map_err(|e| e.into_py_err())?;
        Ok(PyTokenizer { inner })
    }

    /// Train a tokenizer on corpus lines
    #[staticmethod]
    #[pyo3(signature = (lines, vocab_size=5000, special_tokens=None, min_frequency=2))]
    fn train(
        py: Python<'_>,
        lines: Vec<String>,
        vocab_size: usize,
        special_tokens: Option<Vec<String>>,
        min_frequency: u64,
    ) -> TokenizerResult<Self> {
        let builder = Tokenizer::builder()
            .vocab_size(vocab_size)
            .min_frequency(min_frequency)
            .with_special_tokens(special_tokens_config(special_tokens));
        let inner = py
            .allow_threads(|| builder.train(&lines))
            .map_err(|e| e.into_py_err())?;
        Ok(PyTokenizer { inner })
    }

    /// Create a builder for custom training settings
    #[staticmethod]
    fn builder() -> PyTokenizerBuilder {
        PyTokenizerBuilder::new()
    }

    /// Encode text to tokens and ids
    fn encode(&self, text: &str) -> TokenizerResult<PyEncoding> {
        let encoding = self.inner.encode(text).map_err(|e| e.into_py_err())?;
        Ok(encoding.into())
    }

    /// Encode a batch of texts
    fn encode_batch(&self, py: Python<'_>, texts: Vec<String>) -> TokenizerResult<Vec<PyEncoding>> {
        let encodings = py
            .allow_threads(|| self.inner.encode_batch(&texts))
            .map_err(|e| e.into_py_err())?;
        Ok(encodings.into_iter().map(PyEncoding::from).collect())
    }

    /// Decode token IDs back to text
    #[pyo3(signature = (ids, skip_special_tokens=false))]
    fn decode(&self, ids: Vec<u32>, skip_special_tokens: bool) -> TokenizerResult<String> {
        self.inner
            .decode(&ids, skip_special_tokens)
            .map_err(|e| e.into_py_err())
    }

    /// Characters per token over the given lines
    fn compression_ratio(&self, lines: Vec<String>) -> TokenizerResult<Option<f64>> {
        self.inner
            .compression_ratio(&lines)
            .map_err(|e| e.into_py_err())
    }

    /// Get the vocabulary size
    fn vocab_size(&self) -> usize {
        self.inner.vocab_size()
    }

    fn token_to_id(&self, token: &str) -> Option<u32> {
        self.inner.token_to_id(token)
    }

    fn id_to_token(&self, id: u32) -> Option<String> {
        self.inner.id_to_token(id).map(str::to_string)
    }

    /// Save the tokenizer to a JSON file
    fn save(&self, path: PathBuf) -> TokenizerResult<()> {
        self.inner.save(&path).map_err(|e| e.into_py_err())
    }

    /// Export vocab.json and merges.txt into a directory
    fn save_huggingface(&self, dir: PathBuf) -> TokenizerResult<()> {
        self.inner.save_huggingface(&dir).map_err(|e| e.into_py_err())
    }

    /// Serialize to a JSON string
    fn to_json(&self) -> TokenizerResult<String> {
        self.inner.to_json().map_err(|e| e.into_py_err())
    }

    /// Get a string representation
    fn __repr__(&self) -> String {
        format!(
            "Tokenizer(vocab_size={}, merges={})",
            self.inner.vocab_size(),
            self.inner.merges().len()
        )
    }

    /// Get a string representation
    fn __str__(&self) -> String {
        self.__repr__()
    }
}

/// Builder for training tokenizers with custom configuration
#[pyclass(name = "TokenizerBuilder")]
pub struct PyTokenizerBuilder {
    inner: TokenizerBuilder,
}

#[pymethods]
impl PyTokenizerBuilder {
    #[staticmethod]
    fn new() -> Self {
        Self {
            inner: Tokenizer::builder(),
        }
    }

    fn vocab_size(&self, size: usize) -> Self {
        Self {
            inner: self.inner.clone().vocab_size(size),
        }
    }

    fn min_frequency(&self, freq: u64) -> Self {
        Self {
            inner: self.inner.clone().min_frequency(freq),
        }
    }

    fn special_tokens(&self, tokens: Vec<String>) -> Self {
        Self {
            inner: self
                .inner
                .clone()
                .with_special_tokens(SpecialTokensConfig::new(tokens)),
        }
    }

    #[pyo3(signature = (max_merges=None))]
    fn max_merges(&self, max_merges: Option<usize>) -> Self {
        Self {
            inner: self.inner.clone().max_merges(max_merges),
        }
    }

    /// Pre-tokenizer: "whitespace", "word_punct", or a regex whose matches are pre-tokens
    fn split_pattern(&self, pattern: &str) -> TokenizerResult<Self> {
        let splitter = match pattern {
            "whitespace" => Splitter::whitespace(),
            "word_punct" => Splitter::word_punct(),
            custom => Splitter::custom(custom).map_err(|e| e.into_py_err())?,
        };
        Ok(Self {
            inner: self.inner.clone().splitter(splitter),
        })
    }

    fn train(&self, py: Python<'_>, lines: Vec<String>) -> TokenizerResult<PyTokenizer> {
        let builder = self.inner.clone();
        let inner = py
            .allow_threads(|| builder.train(&lines))
            .map_err(|e| e.into_py_err())?;
        Ok(PyTokenizer { inner })
    }
}
