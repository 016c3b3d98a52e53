//! Financial input values

use h2cost_core::CellPath;
use h2cost_resolve::Model;
use tracing::warn;

use crate::error::{DcfError, DcfResult};

/// Table holding the financial parameters
pub const FINANCIAL_INPUTS: &str = "Financial Input Values";

/// Table whose rows are the construction years
pub const CONSTRUCTION: &str = "Construction";

/// Resolved `Financial Input Values`
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialInputs {
    /// Reference year of the reported cost
    pub ref_year: f64,
    /// First year of operation
    pub startup_year: f64,
    /// Basis year of labor and chemical costs
    pub basis_year: f64,
    /// Year of the capital cost figures
    pub current_year_capital_costs: f64,
    /// Years of reduced operation after startup
    pub startup_time: usize,
    /// Years of operation
    pub plant_life: usize,
    /// Number of construction years
    pub construction_time: usize,
    /// Recovery period used to select the depreciation schedule
    pub depreciation_length: f64,
    /// Depreciation method (only MACRS)
    pub depreciation_type: String,
    /// Share of capital financed by equity
    pub equity: f64,
    /// Interest rate on debt
    pub interest: f64,
    /// Debt period label (only constant debt)
    pub debt: String,
    /// Share of fixed operating costs during startup
    pub startup_cost_fixed: f64,
    /// Share of revenues during startup
    pub startup_revenues: f64,
    /// Share of variable operating costs during startup
    pub startup_cost_variable: f64,
    /// Decommissioning cost as a share of depreciable capital
    pub decommissioning: f64,
    /// Salvage value as a share of total capital
    pub salvage: f64,
    /// Yearly inflation rate
    pub inflation: f64,
    /// Real after-tax internal rate of return
    pub irr: f64,
    /// State income tax rate
    pub state_tax: f64,
    /// Federal income tax rate
    pub federal_tax: f64,
    /// Working capital as a share of the yearly change in operating costs
    pub working_capital: f64,
}

impl FinancialInputs {
    /// Read the (already processed) financial inputs from a model
    pub fn from_model(model: &mut Model) -> DcfResult<Self> {
        let mut number = |key: &str| model.process_number(FINANCIAL_INPUTS, key, "Value");

        let inputs = Self {
            ref_year: number("ref year")?,
            startup_year: number("startup year")?,
            basis_year: number("basis year")?,
            current_year_capital_costs: number("current year capital costs")?,
            startup_time: count(number("startup time")?, "startup time")?,
            plant_life: count(number("plant life")?, "plant life")?,
            construction_time: count(number("construction time")?, "construction time")?,
            depreciation_length: number("depreciation length")?,
            depreciation_type: String::new(),
            equity: number("equity")?,
            interest: number("interest")?,
            debt: String::new(),
            startup_cost_fixed: number("startup cost fixed")?,
            startup_revenues: number("startup revenues")?,
            startup_cost_variable: number("startup cost variable")?,
            decommissioning: number("decommissioning")?,
            salvage: number("salvage")?,
            inflation: number("inflation")?,
            irr: number("irr")?,
            state_tax: number("state tax")?,
            federal_tax: number("federal tax")?,
            working_capital: number("working capital")?,
        };

        let depreciation_type = label(model, "depreciation type")?;
        if !depreciation_type.eq_ignore_ascii_case("MACRS") {
            return Err(DcfError::UnsupportedDepreciation(depreciation_type));
        }
        let debt = label(model, "debt")?;
        if !debt.eq_ignore_ascii_case("Constant") {
            warn!("debt type '{}' is treated as constant debt", debt);
        }
        if inputs.plant_life == 0 {
            return Err(DcfError::InvalidParameter {
                path: CellPath::new(FINANCIAL_INPUTS, "plant life", "Value"),
                message: "plant life must be at least one year".to_string(),
            });
        }

        Ok(Self {
            depreciation_type,
            debt,
            ..inputs
        })
    }

    /// After-tax nominal discount rate: `(1 + irr)(1 + inflation) - 1`
    pub fn nominal_irr(&self) -> f64 {
        (1.0 + self.irr) * (1.0 + self.inflation) - 1.0
    }

    /// Combined tax rate: `federal + state (1 - federal)`
    pub fn total_tax_rate(&self) -> f64 {
        self.federal_tax + self.state_tax * (1.0 - self.federal_tax)
    }
}

fn label(model: &mut Model, key: &str) -> DcfResult<String> {
    Ok(model
        .process_input(FINANCIAL_INPUTS, key, "Value")?
        .to_string())
}

/// Convert a year count to an index, rejecting negative or fractional values
pub(crate) fn count(value: f64, key: &str) -> DcfResult<usize> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(DcfError::InvalidParameter {
            path: CellPath::new(FINANCIAL_INPUTS, key, "Value"),
            message: format!("expected a whole number of years, got {}", value),
        });
    }
    Ok(value as usize)
}
