//! Error types shared across the crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Validation failures while decoding CSV text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("missing required column '{0}' in header")]
    MissingColumn(&'static str),

    #[error("unknown column '{0}' in header")]
    UnknownColumn(String),

    #[error("column '{0}' appears more than once in header")]
    DuplicateColumn(String),

    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid id '{value}'")]
    InvalidId { line: usize, value: String },

    #[error("line {line}: {message}")]
    InvalidType { line: usize, message: String },

    #[error("line {line}: duplicate id {id}")]
    DuplicateId { line: usize, id: u64 },

    #[error("line {line}: unterminated quoted field")]
    UnterminatedQuote { line: usize },
}

/// Failures reading or writing the local storage file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("storage file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures of task store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("import failed: {0}")]
    Import(#[from] CodecError),

    #[error("{0}")]
    InvalidType(String),

    #[error("no task ids left: the largest id is already {max}")]
    IdsExhausted { max: u64 },
}
