//! Planned and unplanned replacement costs

use h2cost_core::{nearest_index, TableGroup};
use tracing::debug;

use crate::dcf::functions::REPLACEMENT as REPLACEMENT_TABLE;
use crate::dcf::DiscountedCashFlow;
use crate::error::{DcfError, DcfResult};
use crate::plugin::{Plugin, PluginReport};
use crate::plugins::{group_total, REPLACEMENT};
use crate::workflow::StepSchema;

/// Table of components replaced on a fixed schedule
pub const PLANNED_REPLACEMENT: &str = "Planned Replacement";

const FREQUENCY: &str = "Frequency (years)";
const COST: &str = "Cost ($)";

/// Builds the yearly replacement cost series.
///
/// A planned replacement with frequency `f` is billed every `ceil(f)` years,
/// starting at plant year `ceil(f)`. Each event costs `cost * ceil(f) / f`,
/// so a fractional frequency is charged at its true average rate. The
/// unplanned replacement group is added every year.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplacementPlugin;

impl Plugin for ReplacementPlugin {
    fn name(&self) -> &'static str {
        REPLACEMENT
    }

    fn schema(&self) -> StepSchema {
        StepSchema::new(&[], &[(REPLACEMENT_TABLE, "Total", "Value")])
    }

    fn apply(&self, dcf: &mut DiscountedCashFlow) -> DcfResult<PluginReport> {
        let plant_years = dcf.timeline().plant_years.clone();
        let factor = dcf.inflation().factor.clone();
        let correction = dcf.inflation().correction;
        let combined = dcf.inflation().combined_inflator;
        let model = dcf.model_mut();

        let mut yearly = vec![0.0; plant_years.len()];
        let components = model
            .store()
            .table(PLANNED_REPLACEMENT)
            .map(|table| table.row_names())
            .unwrap_or_default();

        for component in &components {
            let frequency = model.process_number(PLANNED_REPLACEMENT, component, FREQUENCY)?;
            let cost = model.process_number(PLANNED_REPLACEMENT, component, COST)?;
            let schedule = replacement_schedule(&plant_years, frequency).ok_or_else(|| {
                DcfError::division_by_zero(format!(
                    "replacement frequency of '{}' is {}",
                    component, frequency
                ))
            })?;

            let event_cost = cost * non_integer_correction(frequency) * combined;
            debug!(
                component = component.as_str(),
                events = schedule.len(),
                "planned replacement"
            );
            for idx in schedule {
                yearly[idx] += event_cost;
            }
        }

        let (unplanned, contributions) = group_total(model, TableGroup::UnplannedReplacement)?;
        let inflated: Vec<f64> = yearly
            .iter()
            .zip(&factor)
            .map(|(cost, factor)| (cost + unplanned) * correction * factor)
            .collect();

        model.insert(
            REPLACEMENT_TABLE,
            "Total",
            "Value",
            inflated.clone(),
            REPLACEMENT,
        );

        Ok(PluginReport::new()
            .with_attribute("planned", yearly)
            .with_attribute("unplanned", unplanned)
            .with_attribute("total", inflated)
            .with_contributions("unplanned", contributions))
    }
}

/// `ceil(f) / f`
pub fn non_integer_correction(frequency: f64) -> f64 {
    frequency.ceil() / frequency
}

/// Indices of the years in which a replacement of `frequency` is billed.
///
/// Returns `None` for a frequency that is not positive.
pub fn replacement_schedule(plant_years: &[f64], frequency: f64) -> Option<Vec<usize>> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return None;
    }
    let interval = frequency.ceil();
    let first = nearest_index(plant_years, interval)?;
    Some((first..plant_years.len()).step_by(interval as usize).collect())
}
