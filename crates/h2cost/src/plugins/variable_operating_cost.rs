//! Utilities and other variable operating costs

use std::path::{Path, PathBuf};

use h2cost_core::{CellPath, TableGroup, Value};
use h2cost_markdown::{LookupTable, LOOKUP_DELIMITER};

use crate::dcf::functions::VARIABLE_OPERATING;
use crate::dcf::DiscountedCashFlow;
use crate::error::DcfResult;
use crate::plugin::{Plugin, PluginReport};
use crate::plugins::{group_total, TECHNICAL_PARAMETERS, VARIABLE_OPERATING_COST};
use crate::workflow::StepSchema;

/// Table of consumed utilities
pub const UTILITIES: &str = "Utilities";

const COST: &str = "Cost";
const USAGE: &str = "Usage per kg H2";
const USAGE_PATH: &str = "Usage Path";
const CONVERSION: &str = "Price Conversion Factor";

/// Yearly utility cost for the plant output, plus the other variable cost group.
///
/// A utility's `Cost` is either a number or the name of a `(year, price)`
/// lookup file, in which case every model year takes the price of the
/// nearest listed year.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableOperatingCostPlugin;

impl Plugin for VariableOperatingCostPlugin {
    fn name(&self) -> &'static str {
        VARIABLE_OPERATING_COST
    }

    fn schema(&self) -> StepSchema {
        StepSchema::new(
            &[(TECHNICAL_PARAMETERS, "Output per Year", "Value")],
            &[
                (VARIABLE_OPERATING, "Total", "Value"),
                (VARIABLE_OPERATING, "Utilities", "Value"),
                (VARIABLE_OPERATING, "Other", "Value"),
            ],
        )
    }

    fn apply(&self, dcf: &mut DiscountedCashFlow) -> DcfResult<PluginReport> {
        let years = dcf.timeline().years.clone();
        let correction = dcf.inflation().correction;
        let chemical = dcf.inflation().chemical_inflator;
        let lookup_dir = dcf.options().lookup_dir.clone();
        let model = dcf.model_mut();

        model.process_column(TECHNICAL_PARAMETERS, "Value")?;
        let path_key = model.options().path_key.clone();

        let utilities = model
            .store()
            .table(UTILITIES)
            .map(|table| table.row_names())
            .unwrap_or_default();
        if !utilities.is_empty() {
            model.process_table(UTILITIES, &[(COST, path_key.as_str()), (USAGE, USAGE_PATH)])?;
        }

        let mut per_kg = vec![0.0; years.len()];
        for utility in &utilities {
            let usage = model.process_number(UTILITIES, utility, USAGE)?;
            let conversion = model.process_number(UTILITIES, utility, CONVERSION)?;
            let scale = correction * conversion * usage;

            let prices = match model.process_input(UTILITIES, utility, COST)? {
                Value::Text(file) => yearly_prices(&file, lookup_dir.as_deref(), &years)?,
                cost => cost.to_series(years.len(), &CellPath::new(UTILITIES, utility, COST))?,
            };
            for (total, price) in per_kg.iter_mut().zip(prices) {
                *total += price * scale;
            }
        }

        let output = model.process_number(TECHNICAL_PARAMETERS, "Output per Year", "Value")?;
        let utilities_cost: Vec<f64> = per_kg.iter().map(|cost| cost * output).collect();

        let (other, contributions) = group_total(model, TableGroup::OtherVariableOperatingCost)?;
        let other = other * chemical;
        let total: Vec<f64> = utilities_cost.iter().map(|cost| cost + other).collect();

        model.insert(
            VARIABLE_OPERATING,
            "Total",
            "Value",
            total.clone(),
            VARIABLE_OPERATING_COST,
        );
        model.insert(
            VARIABLE_OPERATING,
            "Utilities",
            "Value",
            utilities_cost.clone(),
            VARIABLE_OPERATING_COST,
        );
        model.insert(
            VARIABLE_OPERATING,
            "Other",
            "Value",
            other,
            VARIABLE_OPERATING_COST,
        );

        Ok(PluginReport::new()
            .with_attribute("utilities", utilities_cost)
            .with_attribute("other", other)
            .with_attribute("total", total)
            .with_contributions("other", contributions))
    }
}

/// Price of every model year from a `(year, price)` file, by nearest year
fn yearly_prices(file: &str, lookup_dir: Option<&Path>, years: &[f64]) -> DcfResult<Vec<f64>> {
    let table = LookupTable::read_cached(price_file(file, lookup_dir), LOOKUP_DELIMITER)?;
    Ok(years
        .iter()
        .map(|year| table.value_at(*year).unwrap_or(f64::NAN))
        .collect())
}

/// Relative file names are looked up in the lookup directory first
fn price_file(file: &str, lookup_dir: Option<&Path>) -> PathBuf {
    let path = Path::new(file.trim());
    match lookup_dir {
        Some(dir) if path.is_relative() && dir.join(path).exists() => dir.join(path),
        _ => path.to_path_buf(),
    }
}
