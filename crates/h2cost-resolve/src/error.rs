//! Resolution error types

use h2cost_core::CellPath;
use thiserror::Error;

/// Result type for resolution operations
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Errors that can occur while resolving or processing cells
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Store lookup or value error
    #[error(transparent)]
    Core(#[from] h2cost_core::Error),

    /// Reference to a cell that has not been finalized (strict mode only)
    #[error("Unprocessed value used at {path} (by {by})")]
    UnfinalizedReference { path: CellPath, by: CellPath },

    /// Label where a number is required
    #[error("Non-numeric value at {0}")]
    NonNumeric(CellPath),
}
