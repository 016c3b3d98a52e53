//! Table store - the three-level ordered mapping every model is built on
//!
//! Tables are held behind [`Arc`], so cloning a store only copies table
//! handles. A table is copied the first time a clone writes to it.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::group::TableGroup;
use crate::path::CellPath;
use crate::value::Value;

/// One row of a table: column name to value, in declaration order
pub type Row = IndexMap<String, Value>;

/// A named table of rows
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    /// Group tag, assigned when the table is created
    group: Option<TableGroup>,
    /// Rows keyed by middle key
    rows: IndexMap<String, Row>,
}

impl Table {
    /// Create an empty table with an explicit group
    pub fn new(group: Option<TableGroup>) -> Self {
        Self {
            group,
            rows: IndexMap::new(),
        }
    }

    /// Get the group tag
    pub fn group(&self) -> Option<TableGroup> {
        self.group
    }

    /// Set the group tag
    pub fn set_group(&mut self, group: Option<TableGroup>) {
        self.group = group;
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row by name
    pub fn row(&self, name: &str) -> Option<&Row> {
        self.rows.get(name)
    }

    /// Get a row, creating it at the end if it does not exist
    pub fn row_entry(&mut self, name: &str) -> &mut Row {
        self.rows.entry(name.to_string()).or_default()
    }

    /// Check if a row exists
    pub fn contains_row(&self, name: &str) -> bool {
        self.rows.contains_key(name)
    }

    /// Iterate over `(row name, row)` in declaration order
    pub fn rows(&self) -> impl Iterator<Item = (&str, &Row)> {
        self.rows.iter().map(|(name, row)| (name.as_str(), row))
    }

    /// Row names in declaration order
    pub fn row_names(&self) -> Vec<String> {
        self.rows.keys().cloned().collect()
    }
}

/// Ordered collection of named tables
///
/// Table, row and column order is preserved exactly as declared. Tables
/// created through [`TableStore::table_entry`] or [`TableStore::set`] are
/// tagged with the [`TableGroup`] their name indicates.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TableStore {
    tables: IndexMap<String, Arc<Table>>,
}

impl TableStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if the store has no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Get a table by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name).map(|table| table.as_ref())
    }

    /// Get a mutable table by name
    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name).map(Arc::make_mut)
    }

    /// Get a table, creating (and tagging) it if it does not exist
    pub fn table_entry(&mut self, name: &str) -> &mut Table {
        let table = self
            .tables
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Table::new(TableGroup::classify(name))));
        Arc::make_mut(table)
    }

    /// Insert an empty table with an explicit group, replacing the tag of an
    /// existing table of the same name
    pub fn insert_table_in_group(&mut self, name: &str, group: TableGroup) -> &mut Table {
        let table = self.table_entry(name);
        table.set_group(Some(group));
        table
    }

    /// Check if a table exists
    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Iterate over `(table name, table)` in declaration order
    pub fn tables(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.tables
            .iter()
            .map(|(name, table)| (name.as_str(), table.as_ref()))
    }

    /// Table names in declaration order
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Names of the tables tagged with `group`, in declaration order
    pub fn tables_in_group(&self, group: TableGroup) -> Vec<String> {
        self.tables
            .iter()
            .filter(|(_, table)| table.group == Some(group))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Get a row
    pub fn row(&self, top: &str, middle: &str) -> Option<&Row> {
        self.tables.get(top)?.rows.get(middle)
    }

    /// Get a cell value
    pub fn get(&self, top: &str, middle: &str, bottom: &str) -> Option<&Value> {
        self.row(top, middle)?.get(bottom)
    }

    /// Get a cell value by path
    pub fn get_path(&self, path: &CellPath) -> Option<&Value> {
        self.get(&path.top, &path.middle, &path.bottom)
    }

    /// Get a cell value, reporting which level of the path is missing
    pub fn cell(&self, top: &str, middle: &str, bottom: &str) -> Result<&Value> {
        let table = self
            .tables
            .get(top)
            .ok_or_else(|| Error::MissingTable(top.to_string()))?;
        let row = table.rows.get(middle).ok_or_else(|| Error::MissingRow {
            table: top.to_string(),
            row: middle.to_string(),
        })?;
        row.get(bottom)
            .ok_or_else(|| Error::MissingCell(CellPath::new(top, middle, bottom)))
    }

    /// Set a cell value, creating the table and row as needed.
    ///
    /// Returns the previous value, if any.
    pub fn set(
        &mut self,
        top: &str,
        middle: &str,
        bottom: &str,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.table_entry(top)
            .row_entry(middle)
            .insert(bottom.to_string(), value.into())
    }

    /// Set a cell value by path
    pub fn set_path(&mut self, path: &CellPath, value: impl Into<Value>) -> Option<Value> {
        self.set(&path.top, &path.middle, &path.bottom, value)
    }

    /// Deep merge `other` into this store; `other` wins on every leaf.
    ///
    /// Tables and rows that only exist in `other` are appended. Existing
    /// tables keep their position and their group tag unless they had none.
    pub fn merge(&mut self, other: TableStore) {
        for (name, other_table) in other.tables {
            let Some(existing) = self.tables.get_mut(&name) else {
                self.tables.insert(name, other_table);
                continue;
            };
            let table = Arc::make_mut(existing);
            let other_table = Arc::try_unwrap(other_table).unwrap_or_else(|arc| (*arc).clone());
            if table.group.is_none() {
                table.group = other_table.group;
            }
            for (row_name, other_row) in other_table.rows {
                let row = table.rows.entry(row_name).or_default();
                for (column, value) in other_row {
                    row.insert(column, value);
                }
            }
        }
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.tables
            .values()
            .flat_map(|table| table.rows.values())
            .map(|row| row.len())
            .sum()
    }
}
