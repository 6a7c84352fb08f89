use grain_core::types::GradingRange;

/// Indices of every class whose range contains `size`.
///
/// Overlapping ranges may yield more than one class.
pub fn classes_for(size: f64, ranges: &[GradingRange]) -> impl Iterator<Item = usize> + '_ {
    ranges
        .iter()
        .enumerate()
        .filter(move |(_, range)| range.contains(size))
        .map(|(idx, _)| idx)
}

/// Ranges with both bounds divided by `factor`.
pub fn rescale_ranges(ranges: &[GradingRange], factor: f64) -> Vec<GradingRange> {
    ranges
        .iter()
        .map(|r| GradingRange::new(r.lower / factor, r.upper / factor))
        .collect()
}
