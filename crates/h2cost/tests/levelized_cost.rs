//! End-to-end runs of the discounted cash flow model

mod common;

use h2cost::{DcfError, DcfOptions, DiscountedCashFlow, Value};
use h2cost_markdown::MarkdownReadOptions;
use pretty_assertions::assert_eq;

fn close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * b.abs().max(1.0)
}

#[test]
fn test_closed_form_cost() {
    let dcf = DiscountedCashFlow::run(common::closed_form(), &DcfOptions::default()).unwrap();

    // (1000 + 100 + 50 + 30) / 10
    assert!(close(dcf.h2_cost(), 118.0, 1e-12), "{}", dcf.h2_cost());
    assert_eq!(dcf.results().residual, 0.0);
    assert_eq!(dcf.cash_flows().cash_flow, vec![-1100.0, 1100.0]);
    assert_eq!(dcf.cash_flows().sales, vec![0.0, 10.0]);
}

#[test]
fn test_closed_form_breakdown() {
    let dcf = DiscountedCashFlow::run(common::closed_form(), &DcfOptions::default()).unwrap();
    let data = &dcf.contributions().data;
    let share = |label: &str| data.get(label).and_then(Value::as_number).unwrap();

    assert!(close(share("Initial equity depreciable capital"), 100.0, 1e-12));
    assert!(close(share("Non depreciable capital"), 10.0, 1e-12));
    assert!(close(share("Fixed operating costs"), 5.0, 1e-12));
    assert!(close(share("Variable operating costs"), 3.0, 1e-12));
    assert_eq!(share("Taxes"), 0.0);
    assert_eq!(data.len(), 11);
}

#[test]
fn test_discounted_closed_form_cost() {
    let mut store = common::closed_form();
    store.set("Financial Input Values", "irr", "Value", 0.1);

    let dcf = DiscountedCashFlow::run(store, &DcfOptions::default()).unwrap();

    // (1100 + 80 / 1.1) / (10 / 1.1)
    assert!(close(dcf.h2_cost(), 129.0, 1e-12), "{}", dcf.h2_cost());
    assert!(dcf.results().residual.abs() < 1e-9, "{}", dcf.results().residual);

    let flows = &dcf.cash_flows().cash_flow;
    assert_eq!(flows.len(), 2);
    assert!(close(flows[0], -1100.0, 1e-12), "{:?}", flows);
    assert!(close(flows[1], 1210.0, 1e-12), "{:?}", flows);

    let data = &dcf.contributions().data;
    let share = |label: &str| data.get(label).and_then(Value::as_number).unwrap();
    assert!(close(share("Initial equity depreciable capital"), 110.0, 1e-12));
    assert!(close(share("Non depreciable capital"), 11.0, 1e-12));
    assert!(close(share("Fixed operating costs"), 5.0, 1e-12));
    assert!(close(share("Variable operating costs"), 3.0, 1e-12));

    let sum: f64 = data.values().filter_map(Value::as_number).sum();
    assert!(close(sum, dcf.h2_cost(), 1e-12), "{} != {}", sum, dcf.h2_cost());
}

#[test]
fn test_discounted_closed_form_two_years() {
    let mut store = common::closed_form();
    store.set("Financial Input Values", "irr", "Value", 0.1);
    store.set("Financial Input Values", "plant life", "Value", 2.0);

    let dcf = DiscountedCashFlow::run(store, &DcfOptions::default()).unwrap();

    // (1100 + 80 / 1.1 + 80 / 1.21) / (10 / 1.1 + 10 / 1.21) = 1499 / 21
    let expected = 1499.0 / 21.0;
    assert!(close(dcf.h2_cost(), expected, 1e-12), "{}", dcf.h2_cost());
    assert!(dcf.results().residual.abs() < 1e-9, "{}", dcf.results().residual);
    assert_eq!(dcf.cash_flows().sales, vec![0.0, 10.0, 10.0]);

    let operating = 10.0 * expected - 80.0;
    let flows = &dcf.cash_flows().cash_flow;
    assert_eq!(flows.len(), 3);
    assert!(close(flows[0], -1100.0, 1e-12), "{:?}", flows);
    assert!(close(flows[1], operating, 1e-12), "{:?}", flows);
    assert!(close(flows[2], operating, 1e-12), "{:?}", flows);

    let sum: f64 = dcf
        .contributions()
        .data
        .values()
        .filter_map(Value::as_number)
        .sum();
    assert!(close(sum, dcf.h2_cost(), 1e-12), "{} != {}", sum, dcf.h2_cost());
}

#[test]
fn test_missing_function_step() {
    let text = common::CLOSED_FORM.replace("fixed_operating_costs | function | 4\n", "");
    let store = h2cost::load_input_str(
        &text,
        &h2cost::Defaults::None,
        &MarkdownReadOptions::default(),
    )
    .unwrap();

    let err = DiscountedCashFlow::run(store, &DcfOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        DcfError::MissingStep {
            step: "fixed_operating_costs",
            ..
        }
    ));
}

#[test]
fn test_standard_workflow_residual() {
    let dcf = DiscountedCashFlow::run(common::plant(), &DcfOptions::default()).unwrap();
    let results = dcf.results();

    assert!(results.h2_cost > 0.0);
    assert!(results.residual.abs() < 1e-6, "residual {}", results.residual);
    assert!(results.unprocessed.is_empty(), "{:?}", results.unprocessed);
}

#[test]
fn test_breakdown_sums_to_cost() {
    let dcf = DiscountedCashFlow::run(common::plant(), &DcfOptions::default()).unwrap();
    let contributions = dcf.contributions();

    let sum: f64 = contributions
        .data
        .values()
        .filter_map(Value::as_number)
        .sum();
    assert!(close(sum, dcf.h2_cost(), 1e-9), "{} != {}", sum, dcf.h2_cost());
    assert_eq!(contributions.total, Value::Number(dcf.h2_cost()));
}

#[test]
fn test_standard_workflow_order() {
    let dcf = DiscountedCashFlow::run(common::plant(), &DcfOptions::default()).unwrap();
    let names: Vec<&str> = dcf.workflow().iter().map(|step| step.name.as_str()).collect();

    assert_eq!(
        names,
        vec![
            "Production_Scaling_Plugin",
            "production_scaling",
            "Capital_Cost_Plugin",
            "initial_equity_depreciable_capital",
            "non_depreciable_capital_costs",
            "Replacement_Plugin",
            "replacement_costs",
            "Fixed_Operating_Cost_Plugin",
            "fixed_operating_costs",
            "Variable_Operating_Cost_Plugin",
            "variable_operating_costs",
        ]
    );
}

#[test]
fn test_plugin_outputs() {
    let dcf = DiscountedCashFlow::run(common::plant(), &DcfOptions::default()).unwrap();
    let store = dcf.store();

    // 1000 kg/day * 365 * 0.9
    assert_eq!(
        store.get(
            "Technical Operating Parameters and Specifications",
            "Output per Year",
            "Value"
        ),
        Some(&Value::Number(328_500.0))
    );
    assert_eq!(
        store.get("Depreciable Capital Costs", "Total", "Value"),
        Some(&Value::Number(1_650_000.0))
    );
    assert_eq!(
        store.get("Non-Depreciable Capital Costs", "Total", "Value"),
        Some(&Value::Number(250_000.0))
    );
    assert_eq!(
        store.get("Fixed Operating Costs", "Labor Cost - Uninflated", "Value"),
        Some(&Value::Number(208_000.0))
    );
    assert_eq!(
        store.get("Direct Capital Cost - Electrolyzer", "Summed Total", "Value"),
        Some(&Value::Number(1_500_000.0))
    );
}

#[test]
fn test_fractional_replacement_frequency() {
    let mut store = common::plant();
    store.set("Planned Replacement", "Stack", "Frequency (years)", 3.5);
    store.set("Planned Replacement", "Stack", "Cost ($)", 1000.0);

    let dcf = DiscountedCashFlow::run(store, &DcfOptions::default()).unwrap();
    let report = dcf.plugin_report("Replacement_Plugin").unwrap();
    let planned = report.attribute("planned").and_then(Value::as_array).unwrap();

    let expected = 1000.0 * 4.0 / 3.5;
    let events: Vec<usize> = planned
        .iter()
        .enumerate()
        .filter(|(_, cost)| **cost != 0.0)
        .map(|(idx, _)| idx)
        .collect();
    // plant years 4, 8, ..., 36 after one construction year
    assert_eq!(events, vec![5, 9, 13, 17, 21, 25, 29, 33, 37]);
    for idx in events {
        assert!(close(planned[idx], expected, 1e-12));
    }
}

#[test]
fn test_higher_return_raises_cost() {
    let base = DiscountedCashFlow::run(common::plant(), &DcfOptions::default()).unwrap();

    let mut store = common::plant();
    store.set("Financial Input Values", "irr", "Value", 0.12);
    let higher = DiscountedCashFlow::run(store, &DcfOptions::default()).unwrap();

    assert!(higher.h2_cost() > base.h2_cost());
    assert!(higher.results().residual.abs() < 1e-6);
}
