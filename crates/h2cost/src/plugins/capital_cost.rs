//! Capital cost aggregation

use h2cost_core::TableGroup;
use h2cost_resolve::Model;

use crate::dcf::functions::{DEPRECIABLE_CAPITAL, NON_DEPRECIABLE_CAPITAL};
use crate::dcf::DiscountedCashFlow;
use crate::error::DcfResult;
use crate::plugin::{Plugin, PluginReport};
use crate::plugins::{group_total, CAPITAL_COST};
use crate::workflow::StepSchema;

const DIRECT_CAPITAL: &str = "Direct Capital Costs";
const INDIRECT_CAPITAL: &str = "Indirect Capital Costs";
const TOTAL_CAPITAL: &str = "Total Capital Costs";
const LAND_COST: &str = "Cost of land ($ per acre)";
const LAND_REQUIRED: &str = "Land required (acres)";

/// Sums the capital cost table groups and inflates them to the reference year.
///
/// Direct and indirect capital are depreciable and inflated with the
/// combined plant cost and GDP inflator. Non-depreciable capital (land plus
/// the other non-depreciable group) only gets the GDP inflator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalCostPlugin;

impl Plugin for CapitalCostPlugin {
    fn name(&self) -> &'static str {
        CAPITAL_COST
    }

    fn schema(&self) -> StepSchema {
        StepSchema::new(
            &[
                (NON_DEPRECIABLE_CAPITAL, LAND_COST, "Value"),
                (NON_DEPRECIABLE_CAPITAL, LAND_REQUIRED, "Value"),
            ],
            &[
                (DIRECT_CAPITAL, "Total", "Value"),
                (DIRECT_CAPITAL, "Inflated", "Value"),
                (INDIRECT_CAPITAL, "Total", "Value"),
                (INDIRECT_CAPITAL, "Inflated", "Value"),
                (DEPRECIABLE_CAPITAL, "Total", "Value"),
                (DEPRECIABLE_CAPITAL, "Inflated", "Value"),
                (NON_DEPRECIABLE_CAPITAL, "Total", "Value"),
                (NON_DEPRECIABLE_CAPITAL, "Inflated", "Value"),
                (TOTAL_CAPITAL, "Total", "Value"),
                (TOTAL_CAPITAL, "Inflated", "Value"),
            ],
        )
    }

    fn apply(&self, dcf: &mut DiscountedCashFlow) -> DcfResult<PluginReport> {
        let combined = dcf.inflation().combined_inflator;
        let ci = dcf.inflation().ci_inflator;
        let model = dcf.model_mut();

        let (direct, direct_contributions) = group_total(model, TableGroup::DirectCapitalCost)?;
        let direct_inflated = direct * combined;
        insert_pair(model, DIRECT_CAPITAL, direct, direct_inflated);

        let (indirect, indirect_contributions) =
            group_total(model, TableGroup::IndirectCapitalCost)?;
        let indirect_inflated = indirect * combined;
        insert_pair(model, INDIRECT_CAPITAL, indirect, indirect_inflated);

        let depreciable = direct + indirect;
        let depreciable_inflated = direct_inflated + indirect_inflated;
        insert_pair(model, DEPRECIABLE_CAPITAL, depreciable, depreciable_inflated);

        model.process_column(NON_DEPRECIABLE_CAPITAL, "Value")?;
        let land = model.process_number(NON_DEPRECIABLE_CAPITAL, LAND_COST, "Value")?
            * model.process_number(NON_DEPRECIABLE_CAPITAL, LAND_REQUIRED, "Value")?;
        let (other, _) = group_total(model, TableGroup::OtherNonDepreciableCapitalCost)?;
        let non_depreciable = land + other;
        let non_depreciable_inflated = non_depreciable * ci;
        insert_pair(
            model,
            NON_DEPRECIABLE_CAPITAL,
            non_depreciable,
            non_depreciable_inflated,
        );

        insert_pair(
            model,
            TOTAL_CAPITAL,
            depreciable + non_depreciable,
            depreciable_inflated + non_depreciable_inflated,
        );

        Ok(PluginReport::new()
            .with_attribute("direct", direct)
            .with_attribute("indirect", indirect)
            .with_attribute("depreciable_inflated", depreciable_inflated)
            .with_attribute("non_depreciable_inflated", non_depreciable_inflated)
            .with_contributions("direct", direct_contributions)
            .with_contributions("indirect", indirect_contributions))
    }
}

fn insert_pair(model: &mut Model, top: &str, total: f64, inflated: f64) {
    model.insert(top, "Total", "Value", total, CAPITAL_COST);
    model.insert(top, "Inflated", "Value", inflated, CAPITAL_COST);
}
