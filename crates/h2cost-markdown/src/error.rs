//! Markdown and lookup table error types

use std::path::PathBuf;

use thiserror::Error;

/// Result type for markdown and lookup operations
pub type MarkdownResult<T> = std::result::Result<T, MarkdownError>;

/// Errors that can occur while reading or writing input files
#[derive(Debug, Error)]
pub enum MarkdownError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV library error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Parse error
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Lookup table without usable rows
    #[error("Lookup table {path} has no data rows")]
    EmptyLookup { path: PathBuf },

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] h2cost_core::Error),
}
