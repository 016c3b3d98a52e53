//! Time axis of the cash flow

use h2cost_core::nearest_index;

/// Calendar and plant years of the analysis
///
/// All yearly series of a model have the length of this axis: construction
/// years followed by operating years.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    /// Calendar years, `startup year - construction time` up to end of life
    pub years: Vec<f64>,
    /// Years relative to startup, negative during construction
    pub plant_years: Vec<f64>,
    /// Index of plant year 0 (first year of operation)
    pub start_idx: usize,
    /// Index of the first year after the startup period
    pub startup_idx: usize,
}

impl Timeline {
    /// Build the axis
    pub fn new(
        startup_year: f64,
        construction_time: usize,
        plant_life: usize,
        startup_time: usize,
    ) -> Self {
        let construction = construction_time as i64;
        let life = plant_life as i64;

        let plant_years: Vec<f64> = (-construction..life).map(|year| year as f64).collect();
        let years = plant_years
            .iter()
            .map(|year| startup_year + year)
            .collect();
        let start_idx = nearest_index(&plant_years, 0.0).unwrap_or(0);
        let startup_idx = (start_idx + startup_time).min(plant_years.len());

        Self {
            years,
            plant_years,
            start_idx,
            startup_idx,
        }
    }

    /// Number of years on the axis
    pub fn len(&self) -> usize {
        self.plant_years.len()
    }

    /// Check if the axis is empty
    pub fn is_empty(&self) -> bool {
        self.plant_years.is_empty()
    }

    /// A series of zeros on this axis
    pub fn zeros(&self) -> Vec<f64> {
        vec![0.0; self.len()]
    }

    /// Zero every year before operation starts
    pub fn zero_before_start(&self, series: &mut [f64]) {
        for value in series.iter_mut().take(self.start_idx) {
            *value = 0.0;
        }
    }

    /// Scale the years before the end of the startup period
    pub fn scale_startup(&self, series: &mut [f64], factor: f64) {
        for value in series.iter_mut().take(self.startup_idx) {
            *value *= factor;
        }
    }
}
