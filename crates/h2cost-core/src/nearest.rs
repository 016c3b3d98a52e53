//! Nearest-value lookup in a sorted axis

/// Index of the entry of `sorted` closest to `value`.
///
/// `sorted` must be ascending. On a tie the larger entry wins. Returns `None`
/// for an empty slice.
pub fn nearest_index(sorted: &[f64], value: f64) -> Option<usize> {
    if sorted.is_empty() {
        return None;
    }
    // first index whose entry is >= value
    let idx = sorted.partition_point(|x| *x < value);
    if idx > 0 && (idx == sorted.len() || (value - sorted[idx - 1]).abs() < (value - sorted[idx]).abs())
    {
        Some(idx - 1)
    } else {
        Some(idx)
    }
}
