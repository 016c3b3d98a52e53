//! Standard plugins
//!
//! - [`ProductionScalingPlugin`]: plant output per day and year, capacity scaling
//! - [`CapitalCostPlugin`]: direct, indirect and non-depreciable capital
//! - [`ReplacementPlugin`]: planned and unplanned replacement by year
//! - [`FixedOperatingCostPlugin`]: labor and other fixed costs
//! - [`VariableOperatingCostPlugin`]: utilities and other variable costs

use h2cost_core::{CellPath, TableGroup};
use h2cost_resolve::{Contributions, Model, SUMMED_TOTAL_KEY, SUMMED_TOTAL_VALUE};

use crate::error::DcfResult;

mod capital_cost;
mod fixed_operating_cost;
mod production_scaling;
mod replacement;
mod variable_operating_cost;

pub use capital_cost::CapitalCostPlugin;
pub use fixed_operating_cost::FixedOperatingCostPlugin;
pub use production_scaling::ProductionScalingPlugin;
pub use replacement::ReplacementPlugin;
pub use variable_operating_cost::VariableOperatingCostPlugin;

/// Name of [`ProductionScalingPlugin`]
pub const PRODUCTION_SCALING: &str = "Production_Scaling_Plugin";
/// Name of [`CapitalCostPlugin`]
pub const CAPITAL_COST: &str = "Capital_Cost_Plugin";
/// Name of [`ReplacementPlugin`]
pub const REPLACEMENT: &str = "Replacement_Plugin";
/// Name of [`FixedOperatingCostPlugin`]
pub const FIXED_OPERATING_COST: &str = "Fixed_Operating_Cost_Plugin";
/// Name of [`VariableOperatingCostPlugin`]
pub const VARIABLE_OPERATING_COST: &str = "Variable_Operating_Cost_Plugin";

/// Table of plant design and operating parameters
pub const TECHNICAL_PARAMETERS: &str = "Technical Operating Parameters and Specifications";

/// Table of scaling factors referenced by scaled cost rows
pub const SCALING: &str = "Scaling";

/// Sum the `Value` column of a table group, writing each table's subtotal
pub(crate) fn group_total(
    model: &mut Model,
    group: TableGroup,
) -> DcfResult<(f64, Contributions)> {
    let (total, contributions) = model.sum_group(group, "Value", true)?;
    let path = CellPath::new(group.marker(), SUMMED_TOTAL_KEY, SUMMED_TOTAL_VALUE);
    Ok((total.expect_number(&path)?, contributions))
}
