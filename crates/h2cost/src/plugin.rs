//! Plugin interface and registry
//!
//! A plugin is a named workflow step that reads input tables through the
//! model and inserts the values later steps consume. Plugins are created by
//! name from a [`PluginRegistry`]; the standard plugins are registered by
//! [`PluginRegistry::new`].

use std::collections::HashMap;

use h2cost_core::Value;
use h2cost_resolve::Contributions;
use indexmap::IndexMap;

use crate::dcf::DiscountedCashFlow;
use crate::error::DcfResult;
use crate::plugins;
use crate::workflow::StepSchema;

/// A workflow step provided outside the cash flow engine
pub trait Plugin: Send {
    /// Name used in the `Workflow` table
    fn name(&self) -> &'static str;

    /// Cells the plugin requires and produces
    fn schema(&self) -> StepSchema;

    /// Run the plugin against a model under construction
    fn apply(&self, dcf: &mut DiscountedCashFlow) -> DcfResult<PluginReport>;
}

/// Values a plugin exposes after it ran
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginReport {
    /// Named scalar or yearly results
    pub attributes: IndexMap<String, Value>,
    /// Cost breakdowns by name
    pub contributions: IndexMap<String, Contributions>,
}

impl PluginReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a named breakdown
    pub fn with_contributions(mut self, name: impl Into<String>, contributions: Contributions) -> Self {
        self.contributions.insert(name.into(), contributions);
        self
    }

    /// Get an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

/// Plugin constructor
pub type PluginFactory = fn() -> Box<dyn Plugin>;

/// Plugin definition
pub struct PluginDef {
    /// Plugin name
    pub name: &'static str,
    /// Constructor
    pub factory: PluginFactory,
}

/// Plugin registry
pub struct PluginRegistry {
    plugins: HashMap<String, PluginDef>,
}

impl PluginRegistry {
    /// Create a registry with the standard plugins
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register(PluginDef {
            name: plugins::PRODUCTION_SCALING,
            factory: || -> Box<dyn Plugin> { Box::new(plugins::ProductionScalingPlugin) },
        });
        registry.register(PluginDef {
            name: plugins::CAPITAL_COST,
            factory: || -> Box<dyn Plugin> { Box::new(plugins::CapitalCostPlugin) },
        });
        registry.register(PluginDef {
            name: plugins::REPLACEMENT,
            factory: || -> Box<dyn Plugin> { Box::new(plugins::ReplacementPlugin) },
        });
        registry.register(PluginDef {
            name: plugins::FIXED_OPERATING_COST,
            factory: || -> Box<dyn Plugin> { Box::new(plugins::FixedOperatingCostPlugin) },
        });
        registry.register(PluginDef {
            name: plugins::VARIABLE_OPERATING_COST,
            factory: || -> Box<dyn Plugin> { Box::new(plugins::VariableOperatingCostPlugin) },
        });

        registry
    }

    /// Create a registry without any plugin
    pub fn empty() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    /// Register a plugin, replacing one of the same name
    pub fn register(&mut self, def: PluginDef) {
        self.plugins.insert(def.name.to_string(), def);
    }

    /// Look up a plugin by name
    pub fn get(&self, name: &str) -> Option<&PluginDef> {
        self.plugins.get(name)
    }

    /// Create a plugin instance by name
    pub fn create(&self, name: &str) -> Option<Box<dyn Plugin>> {
        self.get(name).map(|def| (def.factory)())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.plugins.values().map(|def| def.name).collect();
        names.sort_unstable();
        names
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Noop;

    impl Plugin for Noop {
        fn name(&self) -> &'static str {
            "Noop_Plugin"
        }

        fn schema(&self) -> StepSchema {
            StepSchema::default()
        }

        fn apply(&self, _dcf: &mut DiscountedCashFlow) -> DcfResult<PluginReport> {
            Ok(PluginReport::new().with_attribute("ran", 1.0))
        }
    }

    #[test]
    fn test_standard_plugins() {
        let registry = PluginRegistry::new();
        assert_eq!(
            registry.names(),
            vec![
                "Capital_Cost_Plugin",
                "Fixed_Operating_Cost_Plugin",
                "Production_Scaling_Plugin",
                "Replacement_Plugin",
                "Variable_Operating_Cost_Plugin",
            ]
        );
        for name in registry.names() {
            assert_eq!(registry.create(name).map(|p| p.name()), Some(name));
        }
    }

    #[test]
    fn test_register_custom() {
        let mut registry = PluginRegistry::empty();
        assert!(registry.create("Noop_Plugin").is_none());

        registry.register(PluginDef {
            name: "Noop_Plugin",
            factory: || -> Box<dyn Plugin> { Box::new(Noop) },
        });
        assert_eq!(registry.names(), vec!["Noop_Plugin"]);
    }
}
