//! Net present value

/// Discounted sum of a yearly series; the first element is not discounted
pub fn npv(rate: f64, values: &[f64]) -> f64 {
    let base = 1.0 + rate;
    values
        .iter()
        .enumerate()
        .map(|(year, value)| value / base.powi(year as i32))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_npv() {
        assert_eq!(npv(0.0, &[1.0, 2.0, 3.0]), 6.0);
        assert!((npv(0.1, &[0.0, 110.0]) - 100.0).abs() < 1e-9);
        assert_eq!(npv(0.05, &[]), 0.0);
    }
}
