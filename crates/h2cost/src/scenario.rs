//! Scenarios: one shared base store plus a list of overridden cells

use std::sync::Arc;

use h2cost_core::{CellPath, TableStore, Value};
use tracing::debug;

use crate::dcf::DiscountedCashFlow;
use crate::error::DcfResult;
use crate::options::DcfOptions;
use crate::plugin::PluginRegistry;

/// A variation of a base model.
///
/// The base store is never modified. Each run starts from a copy of it in
/// which only the tables holding an override are duplicated, so sensitivity
/// and Monte Carlo drivers can evaluate many scenarios over one large input.
///
/// ```ignore
/// let base = Arc::new(load_input("project.md", &Defaults::Bundled, &options)?);
/// let low = Scenario::new(base.clone())
///     .with_override(CellPath::new("Financial Input Values", "irr", "Value"), 0.06);
/// let cost = low.run(&DcfOptions::default())?.h2_cost();
/// ```
#[derive(Debug, Clone)]
pub struct Scenario {
    base: Arc<TableStore>,
    overrides: Vec<(CellPath, Value)>,
}

impl Scenario {
    /// Scenario without overrides
    pub fn new(base: Arc<TableStore>) -> Self {
        Self {
            base,
            overrides: Vec::new(),
        }
    }

    /// Add an override, builder style
    pub fn with_override(mut self, path: CellPath, value: impl Into<Value>) -> Self {
        self.set(path, value);
        self
    }

    /// Add an override; a later override of the same cell wins
    pub fn set(&mut self, path: CellPath, value: impl Into<Value>) {
        let value = value.into();
        match self.overrides.iter_mut().find(|(existing, _)| *existing == path) {
            Some((_, existing)) => *existing = value,
            None => self.overrides.push((path, value)),
        }
    }

    /// Overridden cells in insertion order
    pub fn overrides(&self) -> &[(CellPath, Value)] {
        &self.overrides
    }

    /// The shared base store
    pub fn base(&self) -> &Arc<TableStore> {
        &self.base
    }

    /// The base store with every override applied
    pub fn store(&self) -> TableStore {
        let mut store = TableStore::clone(&self.base);
        for (path, value) in &self.overrides {
            store.set_path(path, value.clone());
        }
        store
    }

    /// Run the scenario with the standard plugins
    pub fn run(&self, options: &DcfOptions) -> DcfResult<DiscountedCashFlow> {
        self.run_with_registry(options, &PluginRegistry::new())
    }

    /// Run the scenario resolving plugin names in `plugins`
    pub fn run_with_registry(
        &self,
        options: &DcfOptions,
        plugins: &PluginRegistry,
    ) -> DcfResult<DiscountedCashFlow> {
        debug!(overrides = self.overrides.len(), "running scenario");
        DiscountedCashFlow::run_with_registry(self.store(), options, plugins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Arc<TableStore> {
        let mut store = TableStore::new();
        store.set("A", "x", "Value", 1.0);
        store.set("B", "y", "Value", 2.0);
        Arc::new(store)
    }

    #[test]
    fn test_overrides_leave_base_untouched() {
        let base = base();
        let scenario = Scenario::new(base.clone())
            .with_override(CellPath::new("A", "x", "Value"), 5.0)
            .with_override(CellPath::new("C", "z", "Value"), "new");

        let store = scenario.store();
        assert_eq!(store.get("A", "x", "Value"), Some(&Value::Number(5.0)));
        assert_eq!(store.get("C", "z", "Value"), Some(&Value::text("new")));
        assert_eq!(store.get("B", "y", "Value"), Some(&Value::Number(2.0)));

        assert_eq!(base.get("A", "x", "Value"), Some(&Value::Number(1.0)));
        assert!(!base.contains_table("C"));
    }

    #[test]
    fn test_later_override_wins() {
        let mut scenario = Scenario::new(base());
        scenario.set(CellPath::new("A", "x", "Value"), 3.0);
        scenario.set(CellPath::new("A", "x", "Value"), 4.0);

        assert_eq!(scenario.overrides().len(), 1);
        assert_eq!(
            scenario.store().get("A", "x", "Value"),
            Some(&Value::Number(4.0))
        );
    }
}
