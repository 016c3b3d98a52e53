//! Error types for h2cost-core

use thiserror::Error;

use crate::path::CellPath;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in h2cost-core
#[derive(Debug, Error)]
pub enum Error {
    /// Table not present in the store
    #[error("Table not found: {0}")]
    MissingTable(String),

    /// Row not present in a table
    #[error("Row not found: {table} > {row}")]
    MissingRow { table: String, row: String },

    /// Cell not present in a row
    #[error("Cell not found: {0}")]
    MissingCell(CellPath),

    /// Path text that does not have exactly three components
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Value of the wrong kind for an arithmetic operation
    #[error("Invalid value type at {path}: expected {expected}, got {actual}")]
    InvalidValueType {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Arrays of different length combined element-wise
    #[error("Array length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}
