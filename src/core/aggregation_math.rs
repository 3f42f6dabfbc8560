//! Shared numeric primitives for phases 4-7: weighted means with equal-weight
//! fallback, population standard deviation, and the imbalance penalty.
//!
//! Kept as plain, allocation-light functions (rather than methods on the
//! score types) so every aggregation gate calls the same tested arithmetic.

use statrs::statistics::Statistics;

use crate::core::errors::{PipelineError, Result};

/// Computes the weighted mean of `values`, falling back to an unweighted
/// mean when `weights` is empty, shorter than `values`, sums to a
/// non-positive total, or contains a non-finite entry (spec §4.4 step d,
/// §4.5, §4.6 step c).
///
/// Returns `(mean, used_fallback)`. Errors only if `values` is empty, since
/// there is no sensible mean of zero items.
pub fn weighted_mean_with_fallback(values: &[f64], weights: &[f64]) -> Result<(f64, bool)> {
    if values.is_empty() {
        return Err(PipelineError::internal(
            "weighted_mean_with_fallback called with no values",
        ));
    }

    let weights_usable = weights.len() == values.len()
        && weights.iter().all(|w| w.is_finite() && *w > 0.0)
        && weights.iter().sum::<f64>() > 0.0;

    if weights_usable {
        let total: f64 = weights.iter().sum();
        let weighted: f64 = values.iter().zip(weights).map(|(v, w)| v * w).sum();
        Ok((weighted / total, false))
    } else {
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Ok((mean, true))
    }
}

/// Clamps `value` into `[low, high]`.
pub fn clamp(value: f64, low: f64, high: f64) -> f64 {
    value.max(low).min(high)
}

/// Population mean of `values`. Returns `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().mean()
}

/// Population standard deviation (dividing by `n` rather than `n - 1`,
/// matching the cluster/macro penalty formulas), via `statrs`'s
/// `Statistics::population_std_dev`.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().population_std_dev()
}

/// `sigma_norm = min(sigma / 3, 1)`, the normalized spread used by both the
/// cluster penalty and the macro cross-cutting coherence.
pub fn normalized_spread(sigma: f64) -> f64 {
    (sigma / 3.0).min(1.0)
}

/// The cluster-level imbalance penalty factor `1 - 0.3 * min(sigma/3, 1)`.
pub fn imbalance_penalty_factor(sigma: f64) -> f64 {
    1.0 - 0.3 * normalized_spread(sigma)
}

/// The cluster-level coherence diagnostic `1 / (1 + sigma)`. Distinct from
/// [`cross_cutting_coherence`]; the two aggregation levels report different
/// spread diagnostics by design.
pub fn cluster_coherence(sigma: f64) -> f64 {
    1.0 / (1.0 + sigma)
}

/// The macro-level cross-cutting coherence `1 - min(sigma/3, 1)`, clipped
/// into `[0, 1]`.
pub fn cross_cutting_coherence(sigma: f64) -> f64 {
    clamp(1.0 - normalized_spread(sigma), 0.0, 1.0)
}

/// Index of the minimum value in `values`, tie-broken by the lowest index
/// (callers pass values pre-sorted by a lexicographic key when they need
/// `argmin` tie-break by id).
pub fn argmin(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(idx, _)| idx)
}
