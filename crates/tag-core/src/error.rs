//! Error types for the label engine.
//!
//! Lookup misses during editing are not errors at the editor level (they
//! become logged no-ops); these types exist so the lower layers can report
//! precisely what went wrong and let the caller decide.

use crate::id::LayerId;
use thiserror::Error;

/// Layer store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    /// A layer with this id already exists in the set.
    #[error("duplicate layer id `{0}`")]
    DuplicateId(LayerId),

    /// No layer with this id exists in the set.
    #[error("layer `{0}` not found")]
    NotFound(LayerId),
}

/// Tabular import failures. Any of these rejects the whole import.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// The input has no header row.
    #[error("input is empty")]
    Empty,

    /// A header was found but no data rows.
    #[error("no records after the header row")]
    NoRecords,

    /// A quoted field runs to end of input.
    #[error("unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },

    /// A data row has more fields than the header.
    #[error("line {line}: expected at most {expected} fields, found {found}")]
    TooManyFields {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Any other malformed input.
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// Template vault failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// No template with this id; callers fall back to saving a new one.
    #[error("template `{0}` not found")]
    NotFound(String),
}

/// Persistence collaborator failures.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("write to `{key}` failed: {reason}")]
    Write { key: String, reason: String },
}
