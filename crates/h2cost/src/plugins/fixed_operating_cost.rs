//! Labor and other fixed operating costs

use h2cost_core::TableGroup;

use crate::dcf::functions::FIXED_OPERATING;
use crate::dcf::DiscountedCashFlow;
use crate::error::DcfResult;
use crate::plugin::{Plugin, PluginReport};
use crate::plugins::{group_total, FIXED_OPERATING_COST};
use crate::workflow::StepSchema;

/// Paid labor hours per staff member and year
pub const HOURS_PER_YEAR: f64 = 2080.0;

/// Yearly labor cost from staff and hourly rate, plus the other fixed cost group
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedOperatingCostPlugin;

impl Plugin for FixedOperatingCostPlugin {
    fn name(&self) -> &'static str {
        FIXED_OPERATING_COST
    }

    fn schema(&self) -> StepSchema {
        StepSchema::new(
            &[
                (FIXED_OPERATING, "staff", "Value"),
                (FIXED_OPERATING, "hourly labor cost", "Value"),
            ],
            &[
                (FIXED_OPERATING, "Labor Cost - Uninflated", "Value"),
                (FIXED_OPERATING, "Labor Cost", "Value"),
                (FIXED_OPERATING, "Total", "Value"),
            ],
        )
    }

    fn apply(&self, dcf: &mut DiscountedCashFlow) -> DcfResult<PluginReport> {
        let labor_inflator = dcf.inflation().labor_inflator;
        let combined = dcf.inflation().combined_inflator;
        let model = dcf.model_mut();

        model.process_column(FIXED_OPERATING, "Value")?;
        let staff = model.process_number(FIXED_OPERATING, "staff", "Value")?;
        let hourly = model.process_number(FIXED_OPERATING, "hourly labor cost", "Value")?;

        let labor_uninflated = staff * hourly * HOURS_PER_YEAR;
        let labor = labor_uninflated * labor_inflator;
        model.insert(
            FIXED_OPERATING,
            "Labor Cost - Uninflated",
            "Value",
            labor_uninflated,
            FIXED_OPERATING_COST,
        );
        model.insert(FIXED_OPERATING, "Labor Cost", "Value", labor, FIXED_OPERATING_COST);

        let (other, contributions) = group_total(model, TableGroup::OtherFixedOperatingCost)?;
        let other = other * combined;
        model.insert(
            FIXED_OPERATING,
            "Total",
            "Value",
            labor + other,
            FIXED_OPERATING_COST,
        );

        Ok(PluginReport::new()
            .with_attribute("labor", labor)
            .with_attribute("other", other)
            .with_contributions("other", contributions))
    }
}
