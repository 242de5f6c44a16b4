//! Error types for the shabda tokenizer library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tokenizer library.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Invalid configuration (vocab size too small, bad split pattern, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Token ID outside the loaded vocabulary
    #[error("Unknown token ID: {0}")]
    UnknownTokenId(u32),

    /// Symbol not in the vocabulary and no `<unk>` token to fall back to
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// Persisted artifact failed structural validation
    #[error("Corrupt artifact: {0}")]
    CorruptArtifact(String),

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TokenizerError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;
