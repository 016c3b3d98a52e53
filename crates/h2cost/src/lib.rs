//! # h2cost
//!
//! Levelized cost of hydrogen from a discounted cash flow model.
//!
//! A model is a [`TableStore`] read from markdown tables. Its `Workflow`
//! table lists builtin functions and plugins; each step resolves the input
//! cells it needs and writes its outputs back into the store. The cash flow
//! tail then solves for the unit price at which the after-tax cash flow
//! discounts to zero at the target rate of return.
//!
//! ## Features
//!
//! - Markdown input merged over bundled defaults ([`input`])
//! - Standard plugins for production, capital, replacement and operating costs
//! - Workflow order validated against the cells each step reads and writes
//! - MACRS depreciation, debt, taxes, salvage and working capital
//! - Per-component cost breakdown that sums to the levelized cost
//! - Scenarios over a shared base store ([`Scenario`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use h2cost::{load_input, DcfOptions, Defaults, DiscountedCashFlow};
//! use h2cost_markdown::MarkdownReadOptions;
//!
//! let store = load_input("project.md", &Defaults::Bundled, &MarkdownReadOptions::default())?;
//! let dcf = DiscountedCashFlow::run(store, &DcfOptions::default())?;
//! println!("{:.2} $/kg", dcf.h2_cost());
//! ```

pub mod dcf;
pub mod error;
pub mod input;
pub mod options;
pub mod plugin;
pub mod plugins;
pub mod scenario;
pub mod workflow;

pub use dcf::{CashFlows, DcfResults, DiscountedCashFlow, StepOutputs};
pub use error::{DcfError, DcfResult};
pub use input::{bundled_defaults, load_input, load_input_str, Defaults, BUNDLED_DEFAULTS};
pub use options::DcfOptions;
pub use plugin::{Plugin, PluginDef, PluginFactory, PluginRegistry, PluginReport};
pub use scenario::Scenario;
pub use workflow::{StepKind, StepSchema, WorkflowStep};

pub use h2cost_core::{CellPath, TableGroup, TableStore, Value};
pub use h2cost_resolve::{Contributions, Model, ResolveOptions};
