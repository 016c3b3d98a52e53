//! Builtin workflow functions
//!
//! Each function reads the values produced by earlier steps, stores its
//! yearly series on the engine and returns a net present value, which is
//! recorded under the function's name.

use std::collections::HashMap;

use h2cost_core::{CellPath, Value};

use crate::dcf::financial::CONSTRUCTION;
use crate::dcf::npv::npv;
use crate::dcf::DiscountedCashFlow;
use crate::error::DcfResult;
use crate::plugins::TECHNICAL_PARAMETERS;
use crate::workflow::StepSchema;

/// Function implementation signature
pub type FunctionImpl = fn(&mut DiscountedCashFlow) -> DcfResult<f64>;

/// Function definition
pub struct FunctionDef {
    /// Name used in the `Workflow` table
    pub name: &'static str,
    /// Cells that must exist before the function runs
    pub reads: &'static [(&'static str, &'static str, &'static str)],
    /// Implementation
    pub implementation: FunctionImpl,
}

impl FunctionDef {
    /// Data schema of the function
    pub fn schema(&self) -> StepSchema {
        StepSchema::new(self.reads, &[])
    }
}

/// Function registry
pub struct FunctionRegistry {
    functions: HashMap<&'static str, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a registry with all builtin functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };

        registry.register(FunctionDef {
            name: "production_scaling",
            reads: &[(TECHNICAL_PARAMETERS, "Output per Year at Gate", "Value")],
            implementation: production_scaling,
        });
        registry.register(FunctionDef {
            name: "initial_equity_depreciable_capital",
            reads: &[(DEPRECIABLE_CAPITAL, "Inflated", "Value")],
            implementation: initial_equity_depreciable_capital,
        });
        registry.register(FunctionDef {
            name: "non_depreciable_capital_costs",
            reads: &[(NON_DEPRECIABLE_CAPITAL, "Inflated", "Value")],
            implementation: non_depreciable_capital_costs,
        });
        registry.register(FunctionDef {
            name: "replacement_costs",
            reads: &[(REPLACEMENT, "Total", "Value")],
            implementation: replacement_costs,
        });
        registry.register(FunctionDef {
            name: "fixed_operating_costs",
            reads: &[(FIXED_OPERATING, "Total", "Value")],
            implementation: fixed_operating_costs,
        });
        registry.register(FunctionDef {
            name: "variable_operating_costs",
            reads: &[(VARIABLE_OPERATING, "Total", "Value")],
            implementation: variable_operating_costs,
        });

        registry
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name, def);
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Table of inflated depreciable capital
pub const DEPRECIABLE_CAPITAL: &str = "Depreciable Capital Costs";
/// Table of inflated non-depreciable capital
pub const NON_DEPRECIABLE_CAPITAL: &str = "Non-Depreciable Capital Costs";
/// Table of yearly replacement costs
pub const REPLACEMENT: &str = "Replacement";
/// Table of fixed operating costs
pub const FIXED_OPERATING: &str = "Fixed Operating Costs";
/// Table of variable operating costs
pub const VARIABLE_OPERATING: &str = "Variable Operating Costs";

fn production_scaling(dcf: &mut DiscountedCashFlow) -> DcfResult<f64> {
    let output = dcf
        .model
        .process_number(TECHNICAL_PARAMETERS, "Output per Year at Gate", "Value")?;
    dcf.outputs.output_per_year_at_gate = Some(output);
    Ok(0.0)
}

fn initial_equity_depreciable_capital(dcf: &mut DiscountedCashFlow) -> DcfResult<f64> {
    let capital = dcf
        .model
        .process_number(DEPRECIABLE_CAPITAL, "Inflated", "Value")?
        * dcf.inflation.correction;

    dcf.model.process_column(CONSTRUCTION, "Value")?;
    let years = dcf
        .model
        .store()
        .table(CONSTRUCTION)
        .map(|table| table.row_names())
        .unwrap_or_default();

    let mut annual = dcf.timeline.zeros();
    for (idx, year) in years.iter().enumerate() {
        let share = dcf.model.process_number(CONSTRUCTION, year, "Value")?;
        if let (Some(slot), Some(factor)) = (annual.get_mut(idx), dcf.inflation.factor.get(idx)) {
            *slot = share * dcf.financial.equity * capital * factor;
        }
    }

    dcf.outputs.depreciable_capital = Some(capital);
    dcf.outputs.initial_depreciable_capital = Some(annual.iter().sum());
    let value = npv(dcf.financial.nominal_irr(), &annual);
    dcf.outputs.annual_initial_depreciable_capital = Some(annual);
    Ok(value)
}

fn non_depreciable_capital_costs(dcf: &mut DiscountedCashFlow) -> DcfResult<f64> {
    let capital = dcf
        .model
        .process_number(NON_DEPRECIABLE_CAPITAL, "Inflated", "Value")?
        * dcf.inflation.correction;
    let first_year = capital * dcf.inflation.factor.first().copied().unwrap_or(1.0);

    let mut annual = dcf.timeline.zeros();
    if let Some(slot) = annual.first_mut() {
        *slot = first_year;
    }

    dcf.outputs.non_depreciable_capital = Some(capital);
    dcf.outputs.annual_non_depreciable_capital = Some(annual);
    Ok(first_year)
}

fn replacement_costs(dcf: &mut DiscountedCashFlow) -> DcfResult<f64> {
    let mut yearly = yearly_series(dcf, REPLACEMENT)?;
    dcf.timeline.zero_before_start(&mut yearly);

    let value = npv(dcf.financial.nominal_irr(), &yearly);
    dcf.outputs.replacement = Some(yearly);
    Ok(value)
}

fn fixed_operating_costs(dcf: &mut DiscountedCashFlow) -> DcfResult<f64> {
    let correction = dcf.inflation.correction;
    let mut yearly: Vec<f64> = yearly_series(dcf, FIXED_OPERATING)?
        .iter()
        .zip(&dcf.inflation.factor)
        .map(|(cost, factor)| cost * correction * factor)
        .collect();
    dcf.timeline
        .scale_startup(&mut yearly, dcf.financial.startup_cost_fixed);
    dcf.timeline.zero_before_start(&mut yearly);

    let value = npv(dcf.financial.nominal_irr(), &yearly);
    dcf.outputs.fixed_operating = Some(yearly);
    Ok(value)
}

fn variable_operating_costs(dcf: &mut DiscountedCashFlow) -> DcfResult<f64> {
    let mut yearly: Vec<f64> = yearly_series(dcf, VARIABLE_OPERATING)?
        .iter()
        .zip(&dcf.inflation.factor)
        .map(|(cost, factor)| cost * factor)
        .collect();
    dcf.timeline
        .scale_startup(&mut yearly, dcf.financial.startup_cost_variable);
    dcf.timeline.zero_before_start(&mut yearly);

    let value = npv(dcf.financial.nominal_irr(), &yearly);
    dcf.outputs.variable_operating = Some(yearly);
    Ok(value)
}

/// `<top> > Total > Value` as a series over the time axis
fn yearly_series(dcf: &mut DiscountedCashFlow, top: &str) -> DcfResult<Vec<f64>> {
    let value: Value = dcf.model.process_input(top, "Total", "Value")?;
    let path = CellPath::new(top, "Total", "Value");
    Ok(value.to_series(dcf.timeline.len(), &path)?)
}
