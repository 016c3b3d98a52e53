//! The working model: a private copy of the table store plus its memo

use ahash::AHashSet;
use h2cost_core::{CellPath, TableStore, Value};
use tracing::{debug, warn};

/// Tables exempt from the unprocessed-input audit
const AUDIT_EXEMPT_TABLES: [&str; 2] = ["Workflow", "Display Parameters"];

/// Table name fragment exempt from the unprocessed-input audit
const AUDIT_EXEMPT_FRAGMENT: &str = "Analysis";

/// Options for cell resolution
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Column holding the optional multiplier of a cell (default: "Path")
    pub path_key: String,
    /// Fail instead of warn when a reference targets a cell that has not
    /// been finalized yet
    pub strict_references: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            path_key: "Path".to_string(),
            strict_references: false,
        }
    }
}

/// Statistics from a model build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Number of reference lookups performed
    pub lookups: usize,
    /// Number of reference warnings emitted
    pub warnings: usize,
    /// Number of references to cells that were not finalized yet
    pub unprocessed_reads: usize,
    /// Number of cells finalized
    pub cells_finalized: usize,
}

/// A table store being resolved
///
/// The model owns its store; the caller's input is never modified.
/// Finalized cells are recorded in a memo set and are never re-derived.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) store: TableStore,
    pub(crate) memo: AHashSet<CellPath>,
    processed_rows: AHashSet<(String, String)>,
    pub(crate) options: ResolveOptions,
    pub(crate) stats: ResolveStats,
}

impl Model {
    /// Create a model with default options
    pub fn new(store: TableStore) -> Self {
        Self::with_options(store, ResolveOptions::default())
    }

    /// Create a model with custom options
    pub fn with_options(store: TableStore, options: ResolveOptions) -> Self {
        Self {
            store,
            memo: AHashSet::new(),
            processed_rows: AHashSet::new(),
            options,
            stats: ResolveStats::default(),
        }
    }

    /// Get the working store
    pub fn store(&self) -> &TableStore {
        &self.store
    }

    /// Consume the model, returning the annotated store
    pub fn into_store(self) -> TableStore {
        self.store
    }

    /// Get the options
    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Get the statistics gathered so far
    pub fn stats(&self) -> &ResolveStats {
        &self.stats
    }

    /// Check if a cell has been finalized
    pub fn is_processed(&self, path: &CellPath) -> bool {
        self.memo.contains(path)
    }

    /// Check if any cell of a row has been finalized
    pub fn is_row_processed(&self, top: &str, middle: &str) -> bool {
        self.processed_rows
            .contains(&(top.to_string(), middle.to_string()))
    }

    pub(crate) fn finalize(&mut self, path: CellPath) {
        self.processed_rows
            .insert((path.top.clone(), path.middle.clone()));
        if self.memo.insert(path) {
            self.stats.cells_finalized += 1;
        }
    }

    /// Write a computed value into the store and finalize it.
    ///
    /// Tables and rows are created as needed. The row's path column is set
    /// to `None` so the value is not scaled again.
    pub fn insert(
        &mut self,
        top: &str,
        middle: &str,
        bottom: &str,
        value: impl Into<Value>,
        origin: &str,
    ) {
        let path_key = self.options.path_key.clone();
        let row_exists = self.store.row(top, middle).is_some();
        let previous = self.store.set(top, middle, bottom, value);
        if bottom != path_key {
            self.store.set(top, middle, &path_key, Value::text("None"));
        }

        if previous.is_some() {
            debug!(origin, "'{} > {} > {}' is being overwritten", top, middle, bottom);
        } else if row_exists {
            debug!(origin, "'{} > {} > {}' is being created", top, middle, bottom);
        } else {
            debug!(origin, "'{} > {}' is being created", top, middle);
        }

        self.finalize(CellPath::new(top, middle, bottom));
    }

    /// Rows without any finalized cell.
    ///
    /// `Workflow`, `Display Parameters` and tables whose name contains
    /// `Analysis` are not audited.
    pub fn unprocessed_rows(&self) -> Vec<(String, String)> {
        self.store
            .tables()
            .filter(|(name, _)| {
                !AUDIT_EXEMPT_TABLES.contains(name) && !name.contains(AUDIT_EXEMPT_FRAGMENT)
            })
            .flat_map(|(name, table)| {
                table
                    .rows()
                    .filter(|(row, _)| !self.is_row_processed(name, row))
                    .map(|(row, _)| (name.to_string(), row.to_string()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Warn about every unprocessed row and return them
    pub fn check_processing(&self) -> Vec<(String, String)> {
        let rows = self.unprocessed_rows();
        for (table, row) in &rows {
            warn!("'{} > {}' has not been processed", table, row);
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_creates_and_finalizes() {
        let mut model = Model::new(TableStore::new());
        model.insert("Scaling", "Capital Scaling Factor", "Value", 1.5, "test");

        let path = CellPath::new("Scaling", "Capital Scaling Factor", "Value");
        assert!(model.is_processed(&path));
        assert_eq!(model.store().get_path(&path), Some(&Value::Number(1.5)));
        assert_eq!(model.stats().cells_finalized, 1);
    }

    #[test]
    fn test_insert_clears_path_column() {
        let mut store = TableStore::new();
        store.set("Fixed Operating Costs", "Total", "Value", 10.0);
        store.set("Fixed Operating Costs", "Total", "Path", "Scaling > Factor > Value");
        let mut model = Model::new(store);

        model.insert("Fixed Operating Costs", "Total", "Value", 20.0, "test");

        assert_eq!(
            model.store().get("Fixed Operating Costs", "Total", "Path"),
            Some(&Value::text("None"))
        );
    }

    #[test]
    fn test_insert_adds_path_column() {
        let mut model = Model::new(TableStore::new());
        model.insert("Replacement", "Total", "Value", vec![0.0, 1.0], "test");
        assert_eq!(
            model.store().get("Replacement", "Total", "Path"),
            Some(&Value::text("None"))
        );

        model.insert("Replacement", "Total", "Path", "Scaling > Factor > Value", "test");
        assert_eq!(
            model.store().get("Replacement", "Total", "Path"),
            Some(&Value::text("Scaling > Factor > Value"))
        );
    }

    #[test]
    fn test_unprocessed_rows() {
        let mut store = TableStore::new();
        store.set("Workflow", "step", "Type", "function");
        store.set("Monte Carlo Analysis", "x", "Value", 1.0);
        store.set("Costs", "a", "Value", 1.0);
        store.set("Costs", "b", "Value", 2.0);
        let mut model = Model::new(store);
        model.insert("Costs", "a", "Value", 1.0, "test");

        assert_eq!(
            model.unprocessed_rows(),
            vec![("Costs".to_string(), "b".to_string())]
        );
        assert_eq!(model.check_processing().len(), 1);
    }

    #[test]
    fn test_input_store_untouched() {
        let mut store = TableStore::new();
        store.set("Costs", "a", "Value", 1.0);
        let original = store.clone();

        let mut model = Model::new(store.clone());
        model.insert("Costs", "a", "Value", 5.0, "test");

        assert_eq!(store, original);
    }
}
