//! # h2cost-core
//!
//! Core data structures for the h2cost levelized cost model.
//!
//! This crate provides the fundamental types used throughout h2cost:
//! - [`TableStore`] and [`Table`] - the ordered `table > row > column` store
//! - [`Value`] - cell values (numbers, yearly arrays, text)
//! - [`CellPath`] - the address of one cell, written `Top > Middle > Bottom`
//! - [`TableGroup`] - typed families of tables that are summed together
//!
//! ## Example
//!
//! ```rust
//! use h2cost_core::{TableStore, Value};
//!
//! let mut store = TableStore::new();
//! store.set("Financial Input Values", "irr", "Value", 0.08);
//! store.set("Fixed Operating Costs", "Labor", "Value", "Labor > Total > Value");
//!
//! assert_eq!(
//!     store.get("Financial Input Values", "irr", "Value"),
//!     Some(&Value::Number(0.08))
//! );
//! ```

pub mod error;
pub mod group;
pub mod nearest;
pub mod path;
pub mod store;
pub mod value;

// Re-exports for convenience
pub use error::{Error, Result};
pub use group::TableGroup;
pub use nearest::nearest_index;
pub use path::{split_components, split_paths, CellPath, PATH_DELIMITER, PATH_LIST_DELIMITER};
pub use store::{Row, Table, TableStore};
pub use value::Value;
