//! MACRS depreciation
//!
//! The MACRS table holds one column of yearly percentages per recovery
//! period. The schedule of the period nearest to the requested depreciation
//! length is convolved with the depreciable capital of every year: capital
//! placed in year `i` is charged `schedule[j]` in year `i + j`.

use std::path::Path;

use h2cost_core::nearest_index;
use h2cost_markdown::{LookupTable, LOOKUP_DELIMITER};

use crate::error::{DcfError, DcfResult};

/// File name of a MACRS table in a lookup directory
pub const MACRS_FILE: &str = "MACRS.csv";

const BUNDLED_MACRS: &str = include_str!("../../data/MACRS.csv");

/// Depreciation percentages by recovery period
#[derive(Debug, Clone, PartialEq)]
pub struct MacrsTable {
    periods: Vec<f64>,
    columns: Vec<Vec<f64>>,
}

impl MacrsTable {
    /// Build from a lookup table.
    ///
    /// Row 0 holds the recovery periods after a label cell, the following
    /// rows a year index and one percentage per period.
    pub fn from_lookup(table: &LookupTable) -> DcfResult<Self> {
        let Some((header, body)) = table.rows().split_first() else {
            return Err(DcfError::EmptySchedule(f64::NAN));
        };

        let periods: Vec<f64> = header.iter().skip(1).copied().collect();
        let columns = (0..periods.len())
            .map(|col| {
                body.iter()
                    .map(|row| row.get(col + 1).copied().unwrap_or(0.0) / 100.0)
                    .collect()
            })
            .collect();

        Ok(Self { periods, columns })
    }

    /// The half-year convention table shipped with the crate
    pub fn bundled() -> DcfResult<Self> {
        let table = LookupTable::read(BUNDLED_MACRS.as_bytes(), LOOKUP_DELIMITER)?;
        Self::from_lookup(&table)
    }

    /// Use `MACRS.csv` from `dir` when present, the bundled table otherwise
    pub fn load(dir: Option<&Path>) -> DcfResult<Self> {
        match dir.map(|dir| dir.join(MACRS_FILE)) {
            Some(path) if path.exists() => {
                let table = LookupTable::read_cached(&path, LOOKUP_DELIMITER)?;
                Self::from_lookup(&table)
            }
            _ => Self::bundled(),
        }
    }

    /// Recovery periods of the table
    pub fn periods(&self) -> &[f64] {
        &self.periods
    }

    /// Non-zero yearly fractions for the period nearest to `length`
    pub fn schedule(&self, length: f64) -> DcfResult<Vec<f64>> {
        let column = nearest_index(&self.periods, length)
            .and_then(|idx| self.columns.get(idx))
            .ok_or(DcfError::EmptySchedule(length))?;

        let schedule: Vec<f64> = column.iter().copied().filter(|x| *x != 0.0).collect();
        if schedule.is_empty() {
            return Err(DcfError::EmptySchedule(length));
        }
        Ok(schedule)
    }
}

/// Yearly depreciation charge of `capital` under `schedule`.
///
/// The result has the length of `capital`; charges that fall beyond the
/// last year are added to the last year.
pub fn depreciation_charge(capital: &[f64], schedule: &[f64]) -> Vec<f64> {
    let horizon = capital.len();
    let mut charge = vec![0.0; horizon];
    let Some(last) = horizon.checked_sub(1) else {
        return charge;
    };

    for (i, amount) in capital.iter().enumerate() {
        for (j, fraction) in schedule.iter().enumerate() {
            charge[(i + j).min(last)] += amount * fraction;
        }
    }
    charge
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_bundled_table() {
        let macrs = MacrsTable::bundled().unwrap();
        assert_eq!(macrs.periods(), &[3.0, 5.0, 7.0, 10.0, 15.0, 20.0]);

        let five = macrs.schedule(5.0).unwrap();
        assert_eq!(five.len(), 6);
        assert!((five[0] - 0.2).abs() < 1e-12);

        // nearest period
        assert_eq!(macrs.schedule(19.0).unwrap().len(), 21);
        assert_eq!(macrs.schedule(4.0).unwrap().len(), 6);
    }

    #[test]
    fn test_every_column_sums_to_one() {
        let macrs = MacrsTable::bundled().unwrap();
        for period in macrs.periods().to_vec() {
            let total: f64 = macrs.schedule(period).unwrap().iter().sum();
            assert!((total - 1.0).abs() < 1e-9, "period {}", period);
        }
    }

    #[test]
    fn test_empty_schedule() {
        let table = LookupTable::new(vec![vec![f64::NAN, 3.0], vec![1.0, 0.0]]);
        let macrs = MacrsTable::from_lookup(&table).unwrap();
        assert!(matches!(
            macrs.schedule(3.0),
            Err(DcfError::EmptySchedule(_))
        ));
    }

    #[test]
    fn test_malformed_table_in_lookup_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MACRS_FILE), "Year\t3\n1\t33.33\n2\tn/a\n").unwrap();

        let err = MacrsTable::load(Some(dir.path())).unwrap_err();
        assert!(
            matches!(
                err,
                DcfError::Markdown(h2cost_markdown::MarkdownError::Parse { line: 3, .. })
            ),
            "{:?}",
            err
        );
    }

    #[test]
    fn test_charge_convolution() {
        let charge = depreciation_charge(&[0.0, 100.0, 0.0, 0.0, 0.0], &[0.5, 0.3, 0.2]);
        assert_eq!(charge, vec![0.0, 50.0, 30.0, 20.0, 0.0]);
    }

    #[test]
    fn test_charge_tail_folded() {
        let charge = depreciation_charge(&[0.0, 100.0, 10.0], &[0.5, 0.3, 0.2]);
        // year 2: 100 * 0.3 + 10 * 0.5, plus the 100 * 0.2 + 10 * 0.3 + 10 * 0.2 tail
        assert!((charge[2] - 60.0).abs() < 1e-12);
        assert_eq!(charge[0], 0.0);
        assert!((charge[1] - 50.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn test_charge_conserves_capital(
            capital in proptest::collection::vec(0.0f64..1e6, 1..30),
            period in prop::sample::select(vec![3.0, 5.0, 7.0, 10.0, 15.0, 20.0]),
        ) {
            let schedule = MacrsTable::bundled().unwrap().schedule(period).unwrap();
            let charge = depreciation_charge(&capital, &schedule);

            let expected: f64 = capital.iter().sum::<f64>() * schedule.iter().sum::<f64>();
            let actual: f64 = charge.iter().sum();
            prop_assert_eq!(charge.len(), capital.len());
            prop_assert!((actual - expected).abs() <= 1e-6 * expected.max(1.0));
        }
    }
}
