//! Input processing: resolve, archive, write back and memoize
//!
//! [`Model::process_input`] is the only way a raw input cell becomes final.
//! Table and group aggregation are built on top of it.

use h2cost_core::{CellPath, TableGroup, Value};
use indexmap::IndexMap;

use crate::error::{ResolveError, ResolveResult};
use crate::model::Model;

/// Middle key under which a table's subtotal is written
pub const SUMMED_TOTAL_KEY: &str = "Summed Total";

/// Bottom key under which a table's subtotal is written
pub const SUMMED_TOTAL_VALUE: &str = "Value";

/// Prefix of the column that archives a cell's raw value
pub const FORMER_PREFIX: &str = "Former ";

/// Per-table subtotals of an aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct Contributions {
    /// Subtotal by table (or component) name, in store order
    pub data: IndexMap<String, Value>,
    /// Grand total
    pub total: Value,
    /// Label of the aggregated group
    pub table_group: String,
}

impl Contributions {
    /// Create an empty breakdown
    pub fn new(table_group: impl Into<String>) -> Self {
        Self {
            data: IndexMap::new(),
            total: Value::Number(0.0),
            table_group: table_group.into(),
        }
    }
}

impl Model {
    /// Process one cell using the configured path column
    pub fn process_input(&mut self, top: &str, middle: &str, bottom: &str) -> ResolveResult<Value> {
        let path_key = self.options.path_key.clone();
        self.process_input_with(top, middle, bottom, &path_key)
    }

    /// Process one cell, multiplying in the row's `path_key` column.
    ///
    /// A finalized cell is returned as stored without further lookups. A
    /// label is finalized and passed through. Otherwise the resolved value
    /// replaces the raw one, which is archived under `Former <bottom>`.
    pub fn process_input_with(
        &mut self,
        top: &str,
        middle: &str,
        bottom: &str,
        path_key: &str,
    ) -> ResolveResult<Value> {
        let path = CellPath::new(top, middle, bottom);
        let raw = self.store.cell(top, middle, bottom)?.clone();

        if self.memo.contains(&path) {
            return Ok(raw);
        }

        if raw.is_label() {
            self.finalize(path);
            return Ok(raw);
        }

        let mut value = self.resolve_raw(&raw, &path)?;
        if let Some(factor) = self.store.get(top, middle, path_key).cloned() {
            let factor = self.resolve_raw(&factor, &path.with_bottom(path_key))?;
            value = value.mul(&factor)?;
        }

        if value != raw {
            let former = format!("{}{}", FORMER_PREFIX, bottom);
            self.store.set(top, middle, &former, raw);
            self.store.set(top, middle, bottom, value.clone());
        }

        self.finalize(path);
        Ok(value)
    }

    /// Process a numeric cell, failing on labels
    pub fn process_number(&mut self, top: &str, middle: &str, bottom: &str) -> ResolveResult<f64> {
        match self.process_input(top, middle, bottom)? {
            Value::Number(n) => Ok(n),
            other => Err(h2cost_core::Error::InvalidValueType {
                path: CellPath::new(top, middle, bottom).to_string(),
                expected: "number",
                actual: other.type_name(),
            }
            .into()),
        }
    }

    /// Process every row of a table, column by column.
    ///
    /// `columns` holds `(bottom, path_key)` pairs, processed left to right.
    pub fn process_table(&mut self, top: &str, columns: &[(&str, &str)]) -> ResolveResult<()> {
        for middle in self.row_names(top)? {
            for (bottom, path_key) in columns {
                self.process_input_with(top, &middle, bottom, path_key)?;
            }
        }
        Ok(())
    }

    /// Process one column of every row of a table
    pub fn process_column(&mut self, top: &str, bottom: &str) -> ResolveResult<()> {
        let path_key = self.options.path_key.clone();
        self.process_table(top, &[(bottom, path_key.as_str())])
    }

    /// Sum the processed `bottom` column over every row of a table
    pub fn sum_table(&mut self, top: &str, bottom: &str) -> ResolveResult<Value> {
        let mut total = Value::Number(0.0);
        for middle in self.row_names(top)? {
            let value = self.process_input(top, &middle, bottom)?;
            if !value.is_numeric() {
                return Err(ResolveError::NonNumeric(CellPath::new(top, middle, bottom)));
            }
            total = total.add(&value)?;
        }
        Ok(total)
    }

    /// Sum every table whose name contains `substring`.
    ///
    /// With `insert_total`, each table's subtotal is written to
    /// `<table> > Summed Total > Value`.
    pub fn sum_all_tables(
        &mut self,
        substring: &str,
        bottom: &str,
        insert_total: bool,
    ) -> ResolveResult<(Value, Contributions)> {
        let tables: Vec<String> = self
            .store
            .table_names()
            .into_iter()
            .filter(|name| name.contains(substring))
            .collect();
        self.sum_tables(tables, substring, bottom, insert_total)
    }

    /// Sum every table tagged with `group`
    pub fn sum_group(
        &mut self,
        group: TableGroup,
        bottom: &str,
        insert_total: bool,
    ) -> ResolveResult<(Value, Contributions)> {
        let tables = self.store.tables_in_group(group);
        self.sum_tables(tables, group.marker(), bottom, insert_total)
    }

    fn sum_tables(
        &mut self,
        tables: Vec<String>,
        label: &str,
        bottom: &str,
        insert_total: bool,
    ) -> ResolveResult<(Value, Contributions)> {
        let mut contributions = Contributions::new(label);
        for table in tables {
            let subtotal = self.sum_table(&table, bottom)?;
            contributions.total = contributions.total.add(&subtotal)?;
            if insert_total {
                self.insert(
                    &table,
                    SUMMED_TOTAL_KEY,
                    SUMMED_TOTAL_VALUE,
                    subtotal.clone(),
                    "sum_all_tables",
                );
            }
            contributions.data.insert(table, subtotal);
        }
        Ok((contributions.total.clone(), contributions))
    }

    fn row_names(&self, top: &str) -> ResolveResult<Vec<String>> {
        let table = self
            .store
            .table(top)
            .ok_or_else(|| h2cost_core::Error::MissingTable(top.to_string()))?;
        Ok(table.row_names())
    }
}
