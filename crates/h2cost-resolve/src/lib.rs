//! # h2cost-resolve
//!
//! Cell resolution and input processing for h2cost.
//!
//! This crate provides:
//! - Reference resolution (`A > B > C; D > E > F` → product of the targets)
//! - Input processing with write-back, `Former` archiving and memoization
//! - Table and table-group aggregation with per-table contributions
//! - Dependency ordering used to validate workflow step order
//!
//! ## Example
//!
//! ```rust
//! use h2cost_core::{TableStore, Value};
//! use h2cost_resolve::Model;
//!
//! let mut store = TableStore::new();
//! store.set("Scaling", "Factor", "Value", 2.0);
//! store.set("Costs", "Pump", "Value", 50.0);
//! store.set("Costs", "Pump", "Path", "Scaling > Factor > Value");
//!
//! let mut model = Model::new(store);
//! model.process_input("Scaling", "Factor", "Value").unwrap();
//! let cost = model.process_input("Costs", "Pump", "Value").unwrap();
//! assert_eq!(cost, Value::Number(100.0));
//! ```

pub mod dependency;
pub mod error;
pub mod model;
pub mod processor;
pub mod resolver;

pub use dependency::DependencyGraph;
pub use error::{ResolveError, ResolveResult};
pub use model::{Model, ResolveOptions, ResolveStats};
pub use processor::{Contributions, FORMER_PREFIX, SUMMED_TOTAL_KEY, SUMMED_TOTAL_VALUE};
