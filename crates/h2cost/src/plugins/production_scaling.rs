//! Plant output and capacity scaling

use h2cost_resolve::Model;

use crate::dcf::DiscountedCashFlow;
use crate::error::DcfResult;
use crate::plugin::{Plugin, PluginReport};
use crate::plugins::{PRODUCTION_SCALING, SCALING, TECHNICAL_PARAMETERS};
use crate::workflow::StepSchema;

const DESIGN_CAPACITY: &str = "Plant Design Capacity (kg of H2/day)";
const NEW_DESIGN_CAPACITY: &str = "New Plant Design Capacity (kg of H2/day)";
const MAXIMUM_OUTPUT_AT_GATE: &str = "Maximum Output at Gate";
const SCALING_RATIO: &str = "Scaling Ratio";
const CAPACITY_FACTOR: &str = "Operating Capacity Factor (%)";
const CAPITAL_EXPONENT: &str = "Capital Scaling Exponent";
const LABOR_EXPONENT: &str = "Labor Scaling Exponent";

/// Default exponent of the capital cost scaling law
pub const DEFAULT_CAPITAL_EXPONENT: f64 = 0.78;
/// Default exponent of the labor cost scaling law
pub const DEFAULT_LABOR_EXPONENT: f64 = 0.25;

const DAYS_PER_YEAR: f64 = 365.0;

/// Computes daily and yearly output, scaling the plant when requested.
///
/// A plant is scaled when the parameters carry either a new design capacity
/// or a scaling ratio. Scaling writes `Scaling > Capital Scaling Factor` and
/// `Scaling > Labor Scaling Factor`, which cost rows reference through their
/// path column.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductionScalingPlugin;

impl Plugin for ProductionScalingPlugin {
    fn name(&self) -> &'static str {
        PRODUCTION_SCALING
    }

    fn schema(&self) -> StepSchema {
        StepSchema::new(
            &[
                (TECHNICAL_PARAMETERS, DESIGN_CAPACITY, "Value"),
                (TECHNICAL_PARAMETERS, CAPACITY_FACTOR, "Value"),
            ],
            &[
                (TECHNICAL_PARAMETERS, MAXIMUM_OUTPUT_AT_GATE, "Value"),
                (TECHNICAL_PARAMETERS, SCALING_RATIO, "Value"),
                (TECHNICAL_PARAMETERS, "Design Output per Day", "Value"),
                (TECHNICAL_PARAMETERS, "Max Gate Output per Day", "Value"),
                (TECHNICAL_PARAMETERS, "Output per Year", "Value"),
                (TECHNICAL_PARAMETERS, "Output per Year at Gate", "Value"),
                (SCALING, "Capital Scaling Factor", "Value"),
                (SCALING, "Labor Scaling Factor", "Value"),
            ],
        )
    }

    fn apply(&self, dcf: &mut DiscountedCashFlow) -> DcfResult<PluginReport> {
        let model = dcf.model_mut();
        model.process_column(TECHNICAL_PARAMETERS, "Value")?;

        let design_capacity = parameter(model, DESIGN_CAPACITY)?;
        if !has(model, MAXIMUM_OUTPUT_AT_GATE) {
            model.insert(
                TECHNICAL_PARAMETERS,
                MAXIMUM_OUTPUT_AT_GATE,
                "Value",
                design_capacity,
                PRODUCTION_SCALING,
            );
        }
        if has(model, NEW_DESIGN_CAPACITY) {
            let ratio = parameter(model, NEW_DESIGN_CAPACITY)? / design_capacity;
            model.insert(
                TECHNICAL_PARAMETERS,
                SCALING_RATIO,
                "Value",
                ratio,
                PRODUCTION_SCALING,
            );
        }

        let max_gate = parameter(model, MAXIMUM_OUTPUT_AT_GATE)?;
        let mut report = PluginReport::new();
        let (design_per_day, max_gate_per_day) = if has(model, SCALING_RATIO) {
            let ratio = parameter(model, SCALING_RATIO)?;
            let capital_exponent = if has(model, CAPITAL_EXPONENT) {
                parameter(model, CAPITAL_EXPONENT)?
            } else {
                DEFAULT_CAPITAL_EXPONENT
            };
            let labor_exponent = if has(model, LABOR_EXPONENT) {
                parameter(model, LABOR_EXPONENT)?
            } else {
                DEFAULT_LABOR_EXPONENT
            };

            let capital_factor = ratio.powf(capital_exponent);
            let labor_factor = ratio.powf(labor_exponent);
            model.insert(
                SCALING,
                "Capital Scaling Factor",
                "Value",
                capital_factor,
                PRODUCTION_SCALING,
            );
            model.insert(
                SCALING,
                "Labor Scaling Factor",
                "Value",
                labor_factor,
                PRODUCTION_SCALING,
            );
            report = report
                .with_attribute("capital_scaling_factor", capital_factor)
                .with_attribute("labor_scaling_factor", labor_factor);

            (design_capacity * ratio, max_gate * ratio)
        } else {
            (design_capacity, max_gate)
        };

        let capacity_factor = parameter(model, CAPACITY_FACTOR)?;
        let output_per_year = design_per_day * DAYS_PER_YEAR * capacity_factor;
        let output_per_year_at_gate = max_gate_per_day * DAYS_PER_YEAR * capacity_factor;

        for (row, value) in [
            ("Design Output per Day", design_per_day),
            ("Max Gate Output per Day", max_gate_per_day),
            ("Output per Year", output_per_year),
            ("Output per Year at Gate", output_per_year_at_gate),
        ] {
            model.insert(TECHNICAL_PARAMETERS, row, "Value", value, PRODUCTION_SCALING);
        }

        Ok(report
            .with_attribute("design_output_per_day", design_per_day)
            .with_attribute("max_gate_output_per_day", max_gate_per_day)
            .with_attribute("output_per_year", output_per_year)
            .with_attribute("output_per_year_at_gate", output_per_year_at_gate))
    }
}

fn has(model: &Model, row: &str) -> bool {
    model.store().row(TECHNICAL_PARAMETERS, row).is_some()
}

fn parameter(model: &mut Model, row: &str) -> DcfResult<f64> {
    Ok(model.process_number(TECHNICAL_PARAMETERS, row, "Value")?)
}
