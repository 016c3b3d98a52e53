//! Discounted cash flow engine
//!
//! A run goes through four phases:
//! 1. Preparation: financial inputs, time axis and inflators
//! 2. Workflow: builtin functions and plugins in their validated order
//! 3. Tail: salvage, working capital, debt, depreciation, sales, the cost
//!    solve, income and cash flow
//! 4. Audit: rows of the input that no step used

pub mod depreciation;
pub mod financial;
pub mod functions;
pub mod inflation;
pub mod npv;
pub mod timeline;

use h2cost_core::TableStore;
use h2cost_resolve::{Contributions, Model};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::error::{DcfError, DcfResult};
use crate::options::DcfOptions;
use crate::plugin::{PluginRegistry, PluginReport};
use crate::workflow::{self, StepKind, WorkflowStep};

use self::depreciation::{depreciation_charge, MacrsTable};
use self::financial::{FinancialInputs, CONSTRUCTION, FINANCIAL_INPUTS};
use self::functions::FunctionRegistry;
use self::inflation::{Inflation, ReferenceTables};
use self::npv::npv;
use self::timeline::Timeline;

/// Table group label of the cost breakdown
pub const COST_BREAKDOWN_GROUP: &str = "Total cost of hydrogen";

/// Values produced by the builtin workflow functions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutputs {
    /// Yearly output sold at the plant gate
    pub output_per_year_at_gate: Option<f64>,
    /// Depreciable capital in startup-year money
    pub depreciable_capital: Option<f64>,
    /// Equity-financed depreciable capital spent during construction
    pub initial_depreciable_capital: Option<f64>,
    /// Equity-financed depreciable capital by year
    pub annual_initial_depreciable_capital: Option<Vec<f64>>,
    /// Non-depreciable capital in startup-year money
    pub non_depreciable_capital: Option<f64>,
    /// Non-depreciable capital by year (first year only)
    pub annual_non_depreciable_capital: Option<Vec<f64>>,
    /// Replacement costs by year
    pub replacement: Option<Vec<f64>>,
    /// Fixed operating costs by year
    pub fixed_operating: Option<Vec<f64>>,
    /// Variable operating costs by year
    pub variable_operating: Option<Vec<f64>>,
}

/// Yearly series of the cash flow tail
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CashFlows {
    pub salvage: Vec<f64>,
    pub decommissioning: Vec<f64>,
    pub working_capital_reserve: Vec<f64>,
    pub interest: Vec<f64>,
    pub principal_payment: Vec<f64>,
    pub depreciation_charge: Vec<f64>,
    pub sales: Vec<f64>,
    pub revenue: Vec<f64>,
    pub pre_depreciation_income: Vec<f64>,
    pub taxable_income: Vec<f64>,
    pub taxes: Vec<f64>,
    pub after_tax_income: Vec<f64>,
    /// After-tax post-depreciation cash flow
    pub cash_flow: Vec<f64>,
    pub cumulative_cash_flow: Vec<f64>,
}

/// Results of a run
#[derive(Debug, Clone, PartialEq)]
pub struct DcfResults {
    /// Levelized cost in reference-year money
    pub h2_cost: f64,
    /// Levelized cost in startup-year money
    pub h2_cost_nominal: f64,
    /// `federal + state (1 - federal)`
    pub total_tax_rate: f64,
    /// `(1 + irr)(1 + inflation) - 1`
    pub after_tax_nominal_irr: f64,
    /// Net present value of every cash flow component, by name
    pub npv: IndexMap<String, f64>,
    /// Cost per unit of each component; sums to `h2_cost`
    pub contributions: Contributions,
    /// NPV of the after-tax post-depreciation cash flow (0 for a consistent model)
    pub residual: f64,
    /// NPV of the cumulative cash flow
    pub cumulative_cash_flow_npv: f64,
    /// Input rows no step used
    pub unprocessed: Vec<(String, String)>,
}

impl Default for DcfResults {
    fn default() -> Self {
        Self {
            h2_cost: 0.0,
            h2_cost_nominal: 0.0,
            total_tax_rate: 0.0,
            after_tax_nominal_irr: 0.0,
            npv: IndexMap::new(),
            contributions: Contributions::new(COST_BREAKDOWN_GROUP),
            residual: 0.0,
            cumulative_cash_flow_npv: 0.0,
            unprocessed: Vec::new(),
        }
    }
}

/// A discounted cash flow model built from a table store
#[derive(Debug)]
pub struct DiscountedCashFlow {
    pub(crate) model: Model,
    pub(crate) options: DcfOptions,
    pub(crate) financial: FinancialInputs,
    pub(crate) timeline: Timeline,
    pub(crate) inflation: Inflation,
    pub(crate) workflow: Vec<WorkflowStep>,
    pub(crate) outputs: StepOutputs,
    pub(crate) reports: IndexMap<String, PluginReport>,
    pub(crate) flows: CashFlows,
    pub(crate) results: DcfResults,
}

impl DiscountedCashFlow {
    /// Run a model with the standard plugins
    pub fn run(store: TableStore, options: &DcfOptions) -> DcfResult<Self> {
        Self::run_with_registry(store, options, &PluginRegistry::new())
    }

    /// Run a model resolving plugin names in `plugins`
    pub fn run_with_registry(
        store: TableStore,
        options: &DcfOptions,
        plugins: &PluginRegistry,
    ) -> DcfResult<Self> {
        let functions = FunctionRegistry::new();
        let steps = workflow::plan(&store, &functions, plugins)?;

        let mut dcf = Self::prepare(store, options)?;
        dcf.workflow = steps;
        dcf.execute_workflow(&functions, plugins)?;
        dcf.calculate_tail()?;

        if options.check_processing {
            dcf.results.unprocessed = dcf.model.check_processing();
        }

        info!(
            h2_cost = dcf.results.h2_cost,
            residual = dcf.results.residual,
            cells = dcf.model.stats().cells_finalized,
            "levelized cost computed"
        );
        Ok(dcf)
    }

    fn prepare(store: TableStore, options: &DcfOptions) -> DcfResult<Self> {
        let mut model = Model::with_options(store, options.resolve.clone());
        model.process_column(FINANCIAL_INPUTS, "Value")?;

        let construction_years = model
            .store()
            .table(CONSTRUCTION)
            .map(|table| table.len())
            .ok_or_else(|| h2cost_core::Error::MissingTable(CONSTRUCTION.to_string()))?;
        model.insert(
            FINANCIAL_INPUTS,
            "construction time",
            "Value",
            construction_years as f64,
            "DiscountedCashFlow",
        );

        let financial = FinancialInputs::from_model(&mut model)?;
        let timeline = Timeline::new(
            financial.startup_year,
            financial.construction_time,
            financial.plant_life,
            financial.startup_time,
        );
        let tables = ReferenceTables::load(options.lookup_dir.as_deref())?;
        let inflation = Inflation::new(&financial, &timeline, &tables)?;
        debug!(
            years = timeline.len(),
            correction = inflation.correction,
            combined_inflator = inflation.combined_inflator,
            "time axis and inflators ready"
        );

        Ok(Self {
            model,
            options: options.clone(),
            financial,
            timeline,
            inflation,
            workflow: Vec::new(),
            outputs: StepOutputs::default(),
            reports: IndexMap::new(),
            flows: CashFlows::default(),
            results: DcfResults::default(),
        })
    }

    fn execute_workflow(
        &mut self,
        functions: &FunctionRegistry,
        plugins: &PluginRegistry,
    ) -> DcfResult<()> {
        let unknown = |step: &WorkflowStep| DcfError::UnknownStep {
            name: step.name.clone(),
            kind: step.kind.as_str(),
        };

        for step in self.workflow.clone() {
            match step.kind {
                StepKind::Function => {
                    let def = functions.get(&step.name).ok_or_else(|| unknown(&step))?;
                    let value = (def.implementation)(self)?;
                    debug!(value, "function {} executed", step.name);
                    self.results.npv.insert(step.name.clone(), value);
                }
                StepKind::Plugin => {
                    let plugin = plugins.create(&step.name).ok_or_else(|| unknown(&step))?;
                    let report = plugin.apply(self)?;
                    debug!("plugin {} executed", step.name);
                    self.reports.insert(step.name.clone(), report);
                }
            }
        }
        Ok(())
    }

    fn calculate_tail(&mut self) -> DcfResult<()> {
        let fin = &self.financial;
        let timeline = &self.timeline;
        let factor = &self.inflation.factor;
        let n = timeline.len();
        let last = n.saturating_sub(1);
        let rate = fin.nominal_irr();

        let outputs = &self.outputs;
        let depreciable = require(
            outputs.depreciable_capital,
            "Depreciable capital",
            "initial_equity_depreciable_capital",
        )?;
        let initial_depreciable = require(
            outputs.initial_depreciable_capital,
            "Initial equity depreciable capital",
            "initial_equity_depreciable_capital",
        )?;
        let non_depreciable = require(
            outputs.non_depreciable_capital,
            "Non-depreciable capital",
            "non_depreciable_capital_costs",
        )?;
        let output_at_gate = require(
            outputs.output_per_year_at_gate,
            "Output per year at gate",
            "production_scaling",
        )?;
        let replacement = require_series(&outputs.replacement, "Replacement costs", "replacement_costs")?;
        let fixed = require_series(
            &outputs.fixed_operating,
            "Fixed operating costs",
            "fixed_operating_costs",
        )?;
        let variable = require_series(
            &outputs.variable_operating,
            "Variable operating costs",
            "variable_operating_costs",
        )?;
        let annual_initial = require_series(
            &outputs.annual_initial_depreciable_capital,
            "Initial equity depreciable capital",
            "initial_equity_depreciable_capital",
        )?;
        let annual_non_depreciable = require_series(
            &outputs.annual_non_depreciable_capital,
            "Non-depreciable capital",
            "non_depreciable_capital_costs",
        )?;

        let final_factor = factor.last().copied().unwrap_or(1.0);
        let first_factor = factor.first().copied().unwrap_or(1.0);

        let mut salvage = timeline.zeros();
        let mut decommissioning = timeline.zeros();
        if let (Some(s), Some(d)) = (salvage.get_mut(last), decommissioning.get_mut(last)) {
            *s = (depreciable + non_depreciable) * fin.salvage * final_factor;
            *d = depreciable * fin.decommissioning * final_factor;
        }

        let working_capital =
            working_capital_reserve(fixed, variable, fin.working_capital);

        let debt = depreciable * (1.0 - fin.equity) * first_factor;
        let interest = vec![debt * fin.interest; n];
        let mut principal = timeline.zeros();
        if let Some(p) = principal.get_mut(last) {
            *p = debt;
        }

        let mut depreciable_by_year = replacement.to_vec();
        if let Some(year) = depreciable_by_year.get_mut(timeline.start_idx) {
            *year += debt + initial_depreciable;
        }
        let schedule = MacrsTable::load(self.options.lookup_dir.as_deref())?
            .schedule(fin.depreciation_length)?;
        let depreciation = depreciation_charge(&depreciable_by_year, &schedule);

        let mut sales = vec![output_at_gate; n];
        timeline.scale_startup(&mut sales, fin.startup_revenues);
        timeline.zero_before_start(&mut sales);

        let mut components = IndexMap::new();
        components.insert("salvage", npv(rate, &salvage));
        components.insert("decomissioning", npv(rate, &decommissioning));
        components.insert("working_capital_reserve", -npv(rate, &working_capital));
        components.insert("interest", npv(rate, &interest));
        components.insert("principal_payment", npv(rate, &principal));
        components.insert("depreciation_charge", npv(rate, &depreciation));
        components.insert("h2_sales", npv(fin.irr, &sales));

        let npv_of = |name: &'static str| -> DcfResult<f64> {
            components
                .get(name)
                .or_else(|| self.results.npv.get(name))
                .copied()
                .ok_or(DcfError::MissingStep {
                    what: "Net present value",
                    step: name,
                })
        };

        let tax = fin.total_tax_rate();
        let sales_npv = npv_of("h2_sales")?;
        if sales_npv == 0.0 {
            return Err(DcfError::division_by_zero(
                "net present value of hydrogen sales is zero",
            ));
        }
        if tax == 1.0 {
            return Err(DcfError::division_by_zero("total tax rate is 100%"));
        }

        let capital_costs = npv_of("initial_equity_depreciable_capital")?
            + npv_of("non_depreciable_capital_costs")?
            + npv_of("replacement_costs")?
            + npv_of("working_capital_reserve")?;
        let depreciation_shield = -npv_of("depreciation_charge")? * tax;
        let operating_costs = (-npv_of("salvage")?
            + npv_of("decomissioning")?
            + npv_of("fixed_operating_costs")?
            + npv_of("variable_operating_costs")?
            + npv_of("interest")?)
            * (1.0 - tax);
        let construction_growth = (1.0 + fin.inflation).powf(fin.construction_time as f64);

        let h2_cost_nominal = (capital_costs
            + depreciation_shield
            + npv_of("principal_payment")?
            + operating_costs)
            / (sales_npv * (1.0 - tax))
            * construction_growth;
        let h2_cost = h2_cost_nominal / self.inflation.correction;

        let revenue: Vec<f64> = sales
            .iter()
            .zip(factor)
            .map(|(units, factor)| units * h2_cost_nominal * factor)
            .collect();
        let pre_depreciation_income: Vec<f64> = (0..n)
            .map(|k| {
                revenue[k] + salvage[k]
                    - decommissioning[k]
                    - fixed[k]
                    - variable[k]
                    - interest[k]
            })
            .collect();
        let taxable_income: Vec<f64> = pre_depreciation_income
            .iter()
            .zip(&depreciation)
            .map(|(income, charge)| income - charge)
            .collect();
        let taxes: Vec<f64> = taxable_income.iter().map(|income| income * tax).collect();
        let after_tax_income: Vec<f64> = pre_depreciation_income
            .iter()
            .zip(&taxes)
            .map(|(income, taxes)| income - taxes)
            .collect();

        let cash_flow: Vec<f64> = (0..n)
            .map(|k| {
                -annual_initial[k] - replacement[k] + working_capital[k]
                    - annual_non_depreciable[k]
                    + pre_depreciation_income[k]
                    - principal[k]
                    - taxes[k]
            })
            .collect();
        let residual = npv(rate, &cash_flow);
        if residual.abs() > self.options.residual_tolerance {
            warn!(
                residual,
                "NPV of the after-tax post-depreciation cash flow is not 0, possible error"
            );
        }
        let cumulative_cash_flow: Vec<f64> = cash_flow
            .iter()
            .scan(0.0, |sum, value| {
                *sum += value;
                Some(*sum)
            })
            .collect();
        let cumulative_cash_flow_npv = npv(rate, &cumulative_cash_flow);

        components.insert("revenue", npv(rate, &revenue));
        components.insert("pre_depreciation_income", npv(rate, &pre_depreciation_income));
        components.insert("taxable_income", npv(rate, &taxable_income));
        components.insert("taxes", npv(rate, &taxes));
        components.insert("after_tax_income", npv(rate, &after_tax_income));

        let per_unit = construction_growth / self.inflation.correction / sales_npv;
        let mut contributions = Contributions::new(COST_BREAKDOWN_GROUP);
        for (label, name, sign) in COST_COMPONENTS {
            let value = components
                .get(name)
                .or_else(|| self.results.npv.get(name))
                .copied()
                .unwrap_or(0.0);
            contributions
                .data
                .insert(label.to_string(), (sign * value * per_unit).into());
        }
        contributions.total = h2_cost.into();

        let flows = CashFlows {
            salvage,
            decommissioning,
            working_capital_reserve: working_capital,
            interest,
            principal_payment: principal,
            depreciation_charge: depreciation,
            sales,
            revenue,
            pre_depreciation_income,
            taxable_income,
            taxes,
            after_tax_income,
            cash_flow,
            cumulative_cash_flow,
        };

        let after_tax_nominal_irr = rate;
        let results = &mut self.results;
        for (name, value) in components {
            results.npv.insert(name.to_string(), value);
        }
        results.h2_cost = h2_cost;
        results.h2_cost_nominal = h2_cost_nominal;
        results.total_tax_rate = tax;
        results.after_tax_nominal_irr = after_tax_nominal_irr;
        results.contributions = contributions;
        results.residual = residual;
        results.cumulative_cash_flow_npv = cumulative_cash_flow_npv;
        self.flows = flows;
        Ok(())
    }

    /// Mutable access to the model, for plugins
    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    /// The model
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The working store, including every inserted and resolved value
    pub fn store(&self) -> &TableStore {
        self.model.store()
    }

    /// Consume the model, returning the working store
    pub fn into_store(self) -> TableStore {
        self.model.into_store()
    }

    /// Options of this run
    pub fn options(&self) -> &DcfOptions {
        &self.options
    }

    /// Resolved financial inputs
    pub fn financial(&self) -> &FinancialInputs {
        &self.financial
    }

    /// Time axis
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Inflation factors and inflators
    pub fn inflation(&self) -> &Inflation {
        &self.inflation
    }

    /// Steps in execution order
    pub fn workflow(&self) -> &[WorkflowStep] {
        &self.workflow
    }

    /// Values produced by the builtin functions
    pub fn outputs(&self) -> &StepOutputs {
        &self.outputs
    }

    /// Report of a plugin that ran
    pub fn plugin_report(&self, name: &str) -> Option<&PluginReport> {
        self.reports.get(name)
    }

    /// Net present values by component name
    pub fn npv_components(&self) -> &IndexMap<String, f64> {
        &self.results.npv
    }

    /// Yearly series of the cash flow tail
    pub fn cash_flows(&self) -> &CashFlows {
        &self.flows
    }

    /// Results of the run
    pub fn results(&self) -> &DcfResults {
        &self.results
    }

    /// Cost breakdown per unit
    pub fn contributions(&self) -> &Contributions {
        &self.results.contributions
    }

    /// Levelized cost in reference-year money
    pub fn h2_cost(&self) -> f64 {
        self.results.h2_cost
    }
}

/// `(label, npv component, sign)` of the cost breakdown
const COST_COMPONENTS: [(&str, &str, f64); 11] = [
    ("Initial equity depreciable capital", "initial_equity_depreciable_capital", 1.0),
    ("Non depreciable capital", "non_depreciable_capital_costs", 1.0),
    ("Replacement costs", "replacement_costs", 1.0),
    ("Salvage", "salvage", -1.0),
    ("Decomissioning", "decomissioning", 1.0),
    ("Fixed operating costs", "fixed_operating_costs", 1.0),
    ("Variable operating costs", "variable_operating_costs", 1.0),
    ("Working capital reserve", "working_capital_reserve", 1.0),
    ("Interest", "interest", 1.0),
    ("Principal payment", "principal_payment", 1.0),
    ("Taxes", "taxes", 1.0),
];

fn require(value: Option<f64>, what: &'static str, step: &'static str) -> DcfResult<f64> {
    value.ok_or(DcfError::MissingStep { what, step })
}

fn require_series<'a>(
    value: &'a Option<Vec<f64>>,
    what: &'static str,
    step: &'static str,
) -> DcfResult<&'a [f64]> {
    value.as_deref().ok_or(DcfError::MissingStep { what, step })
}

/// Yearly change in working capital.
///
/// A share of each year's increase in operating costs is set aside; the
/// reserve is released in the final year. The first year carries no entry.
pub fn working_capital_reserve(fixed: &[f64], variable: &[f64], share: f64) -> Vec<f64> {
    let operating: Vec<f64> = fixed.iter().zip(variable).map(|(f, v)| f + v).collect();
    let mut reserve: Vec<f64> = operating
        .windows(2)
        .map(|pair| -share * (pair[1] - pair[0]))
        .collect();
    if let Some((last, rest)) = reserve.split_last_mut() {
        *last = -rest.iter().sum::<f64>();
    }
    reserve.insert(0, 0.0);
    reserve
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_working_capital_reserve() {
        let reserve = working_capital_reserve(&[0.0, 10.0, 10.0, 12.0], &[0.0; 4], 0.5);
        assert_eq!(reserve, vec![0.0, -5.0, 0.0, 5.0]);
        assert_eq!(reserve.iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn test_working_capital_reserve_short() {
        assert_eq!(working_capital_reserve(&[3.0], &[1.0], 0.15), vec![0.0]);
        assert_eq!(working_capital_reserve(&[0.0, 3.0], &[0.0, 1.0], 0.15), vec![0.0, 0.0]);
    }

    #[test]
    fn test_missing_step() {
        let outputs = StepOutputs::default();
        assert!(matches!(
            require_series(&outputs.replacement, "Replacement costs", "replacement_costs"),
            Err(DcfError::MissingStep {
                step: "replacement_costs",
                ..
            })
        ));
    }
}
