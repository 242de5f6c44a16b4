//! Error handling for Python bindings

use pyo3::{create_exception, exceptions::PyRuntimeError, PyErr};
use shabda_tokenizer::TokenizerError as RustTokenizerError;

// Custom Python exception for tokenizer errors
create_exception!(
    shabda,
    TokenizerError,
    PyRuntimeError,
    "Error during tokenization"
);

// Raised when a saved tokenizer fails validation
create_exception!(
    shabda,
    CorruptArtifactError,
    TokenizerError,
    "Saved tokenizer failed validation"
);

/// Result type for tokenizer operations
pub type TokenizerResult<T> = Result<T, PyErr>;

/// Convert a Rust TokenizerError to a Python exception
pub trait IntoPyErr {
    fn into_py_err(self) -> PyErr;
}

impl IntoPyErr for RustTokenizerError {
    fn into_py_err(self) -> PyErr {
        match self {
            RustTokenizerError::CorruptArtifact(_) => CorruptArtifactError::new_err(self.to_string()),
            RustTokenizerError::Io { .. } => pyo3::exceptions::PyIOError::new_err(self.to_string()),
            RustTokenizerError::UnknownTokenId(_) => {
                pyo3::exceptions::PyValueError::new_err(self.to_string())
            }
            _ => TokenizerError::new_err(self.to_string()),
        }
    }
}
