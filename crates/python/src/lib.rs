//! Python bindings for the shabda tokenizer
//!
//! This module provides a Pythonic interface to the Rust-based Marathi BPE
//! tokenizer.

use pyo3::prelude::*;

mod error;
mod tokenizer;

use tokenizer::{PyEncoding, PyTokenizer, PyTokenizerBuilder};

/// shabda: Marathi BPE tokenizer in Rust with Python bindings
#[pymodule]
fn shabda(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTokenizer>()?;
    m.add_class::<PyTokenizerBuilder>()?;
    m.add_class::<PyEncoding>()?;

    let py = m.py();
    m.add("TokenizerError", py.get_type_bound::<error::TokenizerError>())?;
    m.add(
        "CorruptArtifactError",
        py.get_type_bound::<error::CorruptArtifactError>(),
    )?;

    // Add version info
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
