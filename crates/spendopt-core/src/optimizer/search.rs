//! Optimal-spend search over a fitted response curve

use super::regression::RegressionModel;

/// Forward-difference derivative of predicted leads at `spend`
///
/// `step` is relative: the perturbation is `step · spend`. Zero when the
/// perturbation vanishes.
pub fn marginal_leads_per_dollar(model: &RegressionModel, spend: f64, step: f64) -> f64 {
    let delta = step * spend;
    if delta.is_nan() || delta <= 0.0 {
        return 0.0;
    }
    (model.predict(spend + delta) - model.predict(spend)) / delta
}

/// Marginal leads per dollar, per dollar already spent
pub fn marginal_efficiency(model: &RegressionModel, spend: f64, step: f64) -> f64 {
    if spend.is_nan() || spend <= 0.0 {
        return 0.0;
    }
    marginal_leads_per_dollar(model, spend, step) / spend
}

/// `count` evenly spaced spends covering `[min, max]`, both ends included
pub fn scan_candidates(min: f64, max: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step = (max - min) / (count - 1) as f64;
            (0..count)
                .map(|i| if i + 1 == count { max } else { min + step * i as f64 })
                .collect()
        }
    }
}

/// Spend level with the best incremental return inside the observed range
///
/// A concave quadratic has its optimum at the vertex (clamped to the observed
/// range). A quadratic whose curvature is rounding noise is treated as the
/// line it is. Every other curve is scanned at `scan_points` spends, keeping the
/// first candidate with the highest marginal efficiency.
pub fn find_optimal_spend(
    model: &RegressionModel,
    min_spend: f64,
    max_spend: f64,
    scan_points: usize,
    step: f64,
) -> f64 {
    if let Some(vertex) = model.vertex() {
        if vertex.is_finite() && model.has_curvature(max_spend) {
            return vertex.clamp(min_spend, max_spend);
        }
    }

    let mut best_spend = min_spend;
    let mut best_ratio = f64::NEG_INFINITY;
    for spend in scan_candidates(min_spend, max_spend, scan_points) {
        let ratio = marginal_efficiency(model, spend, step);
        if ratio > best_ratio {
            best_ratio = ratio;
            best_spend = spend;
        }
    }
    best_spend
}
