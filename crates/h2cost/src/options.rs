//! Options for model runs

use std::path::PathBuf;

use h2cost_resolve::ResolveOptions;

/// Tolerance of the after-tax cash flow consistency check
pub const RESIDUAL_TOLERANCE: f64 = 1e-6;

/// Options for a discounted cash flow run
#[derive(Debug, Clone)]
pub struct DcfOptions {
    /// Directory holding the price index and MACRS lookup files.
    ///
    /// Without it, price inflators are 1 and the bundled MACRS table is used.
    pub lookup_dir: Option<PathBuf>,
    /// Cell resolution options
    pub resolve: ResolveOptions,
    /// Warn about input rows that no step used (default: true)
    pub check_processing: bool,
    /// Largest accepted NPV of the after-tax cash flow (default: 1e-6)
    pub residual_tolerance: f64,
}

impl Default for DcfOptions {
    fn default() -> Self {
        Self {
            lookup_dir: None,
            resolve: ResolveOptions::default(),
            check_processing: true,
            residual_tolerance: RESIDUAL_TOLERANCE,
        }
    }
}
