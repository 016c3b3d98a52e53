//! Workflow validation and custom plugins

mod common;

use std::sync::Arc;

use h2cost::dcf::DiscountedCashFlow;
use h2cost::{
    CellPath, DcfError, DcfOptions, Plugin, PluginDef, PluginRegistry, PluginReport, Scenario,
    StepSchema, TableStore, Value,
};
use pretty_assertions::assert_eq;

struct Forward;
struct Backward;

impl Plugin for Forward {
    fn name(&self) -> &'static str {
        "Forward_Plugin"
    }

    fn schema(&self) -> StepSchema {
        StepSchema::new(&[("Loop", "x", "Value")], &[("Loop", "y", "Value")])
    }

    fn apply(&self, _dcf: &mut DiscountedCashFlow) -> h2cost::DcfResult<PluginReport> {
        Ok(PluginReport::new())
    }
}

impl Plugin for Backward {
    fn name(&self) -> &'static str {
        "Backward_Plugin"
    }

    fn schema(&self) -> StepSchema {
        StepSchema::new(&[("Loop", "y", "Value")], &[("Loop", "x", "Value")])
    }

    fn apply(&self, _dcf: &mut DiscountedCashFlow) -> h2cost::DcfResult<PluginReport> {
        Ok(PluginReport::new())
    }
}

/// Doubles the fixed operating total before the builtin function reads it
struct DoubleFixedCosts;

impl Plugin for DoubleFixedCosts {
    fn name(&self) -> &'static str {
        "Double_Fixed_Costs_Plugin"
    }

    fn schema(&self) -> StepSchema {
        StepSchema::new(
            &[("Fixed Operating Costs", "Total", "Value")],
            &[("Fixed Operating Costs", "Total", "Value")],
        )
    }

    fn apply(&self, dcf: &mut DiscountedCashFlow) -> h2cost::DcfResult<PluginReport> {
        let model = dcf.model_mut();
        let total = model.process_number("Fixed Operating Costs", "Total", "Value")?;
        model.insert(
            "Fixed Operating Costs",
            "Total",
            "Value",
            total * 2.0,
            "Double_Fixed_Costs_Plugin",
        );
        Ok(PluginReport::new().with_attribute("total", total * 2.0))
    }
}

fn registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register(PluginDef {
        name: "Forward_Plugin",
        factory: || -> Box<dyn Plugin> { Box::new(Forward) },
    });
    registry.register(PluginDef {
        name: "Backward_Plugin",
        factory: || -> Box<dyn Plugin> { Box::new(Backward) },
    });
    registry.register(PluginDef {
        name: "Double_Fixed_Costs_Plugin",
        factory: || -> Box<dyn Plugin> { Box::new(DoubleFixedCosts) },
    });
    registry
}

fn add_step(store: &mut TableStore, name: &str, kind: &str, position: f64) {
    store.set("Workflow", name, "Type", kind);
    store.set("Workflow", name, "Position", position);
}

#[test]
fn test_unknown_step() {
    let mut store = common::closed_form();
    add_step(&mut store, "Missing_Plugin", "plugin", 7.0);

    let err = DiscountedCashFlow::run(store, &DcfOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        DcfError::UnknownStep { ref name, kind: "plugin" } if name == "Missing_Plugin"
    ));
}

#[test]
fn test_unknown_function() {
    let mut store = common::closed_form();
    add_step(&mut store, "h2_price", "function", 7.0);

    let err = DiscountedCashFlow::run(store, &DcfOptions::default()).unwrap_err();
    assert!(matches!(err, DcfError::UnknownStep { kind: "function", .. }));
}

#[test]
fn test_plugin_cycle() {
    let mut store = common::closed_form();
    add_step(&mut store, "Forward_Plugin", "plugin", 6.0);
    add_step(&mut store, "Backward_Plugin", "plugin", 7.0);

    let err = DiscountedCashFlow::run_with_registry(store, &DcfOptions::default(), &registry())
        .unwrap_err();
    match err {
        DcfError::WorkflowCycle(mut names) => {
            names.sort();
            assert_eq!(names, vec!["Backward_Plugin", "Forward_Plugin"]);
        }
        other => panic!("expected a workflow cycle, got {:?}", other),
    }
}

#[test]
fn test_custom_plugin_is_ordered_before_consumer() {
    let mut store = common::closed_form();
    // declared after the function that consumes its output
    add_step(&mut store, "Double_Fixed_Costs_Plugin", "plugin", 9.0);

    let dcf = DiscountedCashFlow::run_with_registry(store, &DcfOptions::default(), &registry())
        .unwrap();
    let names: Vec<&str> = dcf.workflow().iter().map(|step| step.name.as_str()).collect();
    let plugin = names
        .iter()
        .position(|name| *name == "Double_Fixed_Costs_Plugin")
        .unwrap();
    let consumer = names
        .iter()
        .position(|name| *name == "fixed_operating_costs")
        .unwrap();
    assert!(plugin < consumer, "{:?}", names);

    // (1000 + 100 + 100 + 30) / 10
    assert!((dcf.h2_cost() - 123.0).abs() < 1e-9, "{}", dcf.h2_cost());
    assert_eq!(
        dcf.plugin_report("Double_Fixed_Costs_Plugin")
            .and_then(|report| report.attribute("total")),
        Some(&Value::Number(100.0))
    );
}

#[test]
fn test_scenario_override() {
    let base = Arc::new(common::closed_form());
    let cheaper = Scenario::new(base.clone()).with_override(
        CellPath::new("Depreciable Capital Costs", "Inflated", "Value"),
        500.0,
    );

    let base_cost = Scenario::new(base.clone())
        .run(&DcfOptions::default())
        .unwrap()
        .h2_cost();
    let cheaper_cost = cheaper.run(&DcfOptions::default()).unwrap().h2_cost();

    assert!((base_cost - 118.0).abs() < 1e-9);
    // (500 + 100 + 50 + 30) / 10
    assert!((cheaper_cost - 68.0).abs() < 1e-9);
    assert_eq!(
        base.get("Depreciable Capital Costs", "Inflated", "Value"),
        Some(&Value::Number(1000.0))
    );
}

#[test]
fn test_scenarios_on_threads() {
    let base = Arc::new(common::plant());
    let handles: Vec<_> = [0.06, 0.08, 0.10]
        .into_iter()
        .map(|irr| {
            let scenario = Scenario::new(base.clone())
                .with_override(CellPath::new("Financial Input Values", "irr", "Value"), irr);
            std::thread::spawn(move || scenario.run(&DcfOptions::default()).unwrap().h2_cost())
        })
        .collect();
    let costs: Vec<f64> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert!(costs[0] < costs[1] && costs[1] < costs[2], "{:?}", costs);
}
