//! Inflation factors and price index inflators

use std::path::Path;
use std::sync::Arc;

use h2cost_markdown::{LookupTable, LOOKUP_DELIMITER};
use tracing::warn;

use crate::dcf::financial::FinancialInputs;
use crate::dcf::timeline::Timeline;
use crate::error::{DcfError, DcfResult};

/// Plant cost index file (CEPCI)
pub const PLANT_COST_INDEX: &str = "Plant_Cost_Index.csv";
/// GDP implicit price deflator file
pub const GDP_DEFLATOR_INDEX: &str = "GDP_Implicit_Deflator_Price_Index.csv";
/// Labor cost index file
pub const LABOR_INDEX: &str = "Labor_Index.csv";
/// Chemical price index file
pub const CHEMICAL_INDEX: &str = "SRI_Chemical_Price_Index.csv";

/// Price index tables, any of which may be absent
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    /// Plant cost index
    pub plant_cost: Option<Arc<LookupTable>>,
    /// GDP implicit price deflator
    pub gdp_deflator: Option<Arc<LookupTable>>,
    /// Labor cost index
    pub labor: Option<Arc<LookupTable>>,
    /// Chemical price index
    pub chemical: Option<Arc<LookupTable>>,
}

impl ReferenceTables {
    /// Load the index files present in `dir`
    pub fn load(dir: Option<&Path>) -> DcfResult<Self> {
        let Some(dir) = dir else {
            return Ok(Self::default());
        };
        Ok(Self {
            plant_cost: load_optional(dir, PLANT_COST_INDEX)?,
            gdp_deflator: load_optional(dir, GDP_DEFLATOR_INDEX)?,
            labor: load_optional(dir, LABOR_INDEX)?,
            chemical: load_optional(dir, CHEMICAL_INDEX)?,
        })
    }
}

fn load_optional(dir: &Path, file: &str) -> DcfResult<Option<Arc<LookupTable>>> {
    let path = dir.join(file);
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(LookupTable::read_cached(&path, LOOKUP_DELIMITER)?))
}

/// Yearly inflation factors and category inflators
#[derive(Debug, Clone, PartialEq)]
pub struct Inflation {
    /// `(1 + inflation)^plant_year` for every year of the axis
    pub factor: Vec<f64>,
    /// `(1 + inflation)^(startup year - ref year)`
    pub correction: f64,
    /// Plant cost index, current year capital costs over basis year
    pub cepci_inflator: f64,
    /// GDP deflator, ref year over current year capital costs
    pub ci_inflator: f64,
    /// `cepci_inflator * ci_inflator`, applied to capital costs
    pub combined_inflator: f64,
    /// Labor index, ref year over basis year
    pub labor_inflator: f64,
    /// Chemical index, ref year over basis year
    pub chemical_inflator: f64,
}

impl Inflation {
    /// Compute factors for `timeline` from the financial inputs and indices
    pub fn new(
        fin: &FinancialInputs,
        timeline: &Timeline,
        tables: &ReferenceTables,
    ) -> DcfResult<Self> {
        let rate = 1.0 + fin.inflation;
        let factor = timeline
            .plant_years
            .iter()
            .map(|year| rate.powf(*year))
            .collect();
        let correction = rate.powf(fin.startup_year - fin.ref_year);

        let cepci_inflator = index_ratio(
            tables.plant_cost.as_deref(),
            PLANT_COST_INDEX,
            fin.current_year_capital_costs,
            fin.basis_year,
        )?;
        let ci_inflator = index_ratio(
            tables.gdp_deflator.as_deref(),
            GDP_DEFLATOR_INDEX,
            fin.ref_year,
            fin.current_year_capital_costs,
        )?;
        let labor_inflator = index_ratio(
            tables.labor.as_deref(),
            LABOR_INDEX,
            fin.ref_year,
            fin.basis_year,
        )?;
        let chemical_inflator = index_ratio(
            tables.chemical.as_deref(),
            CHEMICAL_INDEX,
            fin.ref_year,
            fin.basis_year,
        )?;

        Ok(Self {
            factor,
            correction,
            cepci_inflator,
            ci_inflator,
            combined_inflator: cepci_inflator * ci_inflator,
            labor_inflator,
            chemical_inflator,
        })
    }
}

/// `index(numerator_year) / index(denominator_year)`, by nearest year
fn index_ratio(
    table: Option<&LookupTable>,
    name: &str,
    numerator_year: f64,
    denominator_year: f64,
) -> DcfResult<f64> {
    let Some(table) = table else {
        warn!("{} not available, using an inflator of 1", name);
        return Ok(1.0);
    };

    let numerator = table.value_at(numerator_year).unwrap_or(f64::NAN);
    let denominator = table.value_at(denominator_year).unwrap_or(f64::NAN);
    if denominator == 0.0 || denominator.is_nan() {
        return Err(DcfError::division_by_zero(format!(
            "{} has no usable value for {}",
            name, denominator_year
        )));
    }
    Ok(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> LookupTable {
        LookupTable::new(vec![
            vec![2015.0, 100.0],
            vec![2016.0, 110.0],
            vec![2020.0, 125.0],
        ])
    }

    #[test]
    fn test_index_ratio() {
        let table = index();
        let ratio = index_ratio(Some(&table), "test", 2020.0, 2015.0).unwrap();
        assert!((ratio - 1.25).abs() < 1e-12);

        // nearest year
        let ratio = index_ratio(Some(&table), "test", 2019.0, 2016.2).unwrap();
        assert!((ratio - 125.0 / 110.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_index_is_neutral() {
        assert_eq!(index_ratio(None, "test", 2020.0, 2015.0).unwrap(), 1.0);
    }

    #[test]
    fn test_zero_index_is_error() {
        let table = LookupTable::new(vec![vec![2015.0, 0.0]]);
        assert!(matches!(
            index_ratio(Some(&table), "test", 2015.0, 2015.0),
            Err(DcfError::DivisionByZero(_))
        ));
    }
}
