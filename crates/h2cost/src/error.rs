//! Error types for model runs

use h2cost_core::CellPath;
use h2cost_markdown::MarkdownError;
use h2cost_resolve::ResolveError;
use thiserror::Error;

/// Result type alias using [`DcfError`]
pub type DcfResult<T> = std::result::Result<T, DcfError>;

/// Errors that can occur while building or running a model
#[derive(Debug, Error)]
pub enum DcfError {
    /// Cell resolution error
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Input or lookup file error
    #[error(transparent)]
    Markdown(#[from] MarkdownError),

    /// Workflow step whose name is neither a builtin function nor a registered plugin
    #[error("Unknown workflow step: {name} ({kind})")]
    UnknownStep { name: String, kind: &'static str },

    /// Workflow row with an invalid type or position
    #[error("Invalid workflow step {name}: {message}")]
    InvalidStep { name: String, message: String },

    /// Workflow steps that depend on each other
    #[error("Workflow cycle between steps: {}", .0.join(", "))]
    WorkflowCycle(Vec<String>),

    /// Required cell that no input provides and no step produces
    #[error("Step {step} requires {path}, which is neither in the input nor produced by any step")]
    MissingProducer { step: String, path: CellPath },

    /// Value needed by the cash flow tail that no workflow step computed
    #[error("{what} is not available; is the {step} step missing from the workflow?")]
    MissingStep { what: &'static str, step: &'static str },

    /// Division by zero
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// Depreciation schedule without any non-zero entry
    #[error("Depreciation schedule for a recovery period of {0} years is empty")]
    EmptySchedule(f64),

    /// Depreciation type other than MACRS
    #[error("Unsupported depreciation type: {0}")]
    UnsupportedDepreciation(String),

    /// Parameter outside its valid domain
    #[error("Invalid parameter at {path}: {message}")]
    InvalidParameter { path: CellPath, message: String },
}

impl DcfError {
    /// Create a division-by-zero error
    pub fn division_by_zero<S: Into<String>>(what: S) -> Self {
        DcfError::DivisionByZero(what.into())
    }
}

impl From<h2cost_core::Error> for DcfError {
    fn from(err: h2cost_core::Error) -> Self {
        DcfError::Resolve(ResolveError::Core(err))
    }
}
