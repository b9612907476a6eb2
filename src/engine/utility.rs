/// Distance-weighted mean of `(value, weight)` pairs.
///
/// Returns `None` when the weights sum to zero; a zero-weight series carries no signal.
pub fn weighted_mean(pairs: &[(f64, f64)]) -> Option<f64> {
    let weight_sum: f64 = pairs.iter().map(|(_, w)| w).sum();
    if weight_sum == 0.0 {
        return None;
    }
    let weighted: f64 = pairs.iter().map(|(v, w)| v * w).sum();
    let mean = weighted / weight_sum;
    mean.is_finite().then_some(mean)
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Number of hyphen-delimited segments in a route label, at least 1.
pub fn segment_count(route: &str) -> usize {
    route
        .split('-')
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1)
}
