//! Result building for curve-based (`advanced` / `low_confidence`) analyses

use super::basic::round_cents;
use super::recommendation::describe;
use super::regression::RegressionModel;
use super::search::{find_optimal_spend, marginal_leads_per_dollar};
use super::window::SpendWindow;
use crate::config::OptimizerConfig;
use spendopt_types::{AnalysisType, OptimizationResult, SpendAction};

/// Optimize spend on `model` and package the recommendation
pub fn model_result(
    model: &RegressionModel,
    window: &SpendWindow,
    analysis_type: AnalysisType,
    config: &OptimizerConfig,
) -> OptimizationResult {
    let optimal = find_optimal_spend(
        model,
        window.min_spend(),
        window.max_spend(),
        config.scan_points,
        config.derivative_step,
    );
    let current = window.avg_spend();

    let predicted_current = model.predict(current);
    let predicted_optimal = model.predict(optimal);

    let efficiency = if predicted_optimal > 0.0 {
        (100.0 * predicted_current / predicted_optimal).min(100.0)
    } else {
        0.0
    };

    let action = SpendAction::between(current, optimal, config.hold_band);

    tracing::debug!(
        model = %model.kind(),
        r_squared = model.r_squared(),
        analysis = %analysis_type,
        current,
        optimal,
        "Curve-based spend optimization"
    );

    OptimizationResult {
        optimal_daily_spend: round_cents(optimal),
        current_efficiency: efficiency.round(),
        confidence_score: confidence_score(model.r_squared(), analysis_type, config),
        recommendation: describe(&action),
        marginal_leads_per_dollar: marginal_leads_per_dollar(
            model,
            optimal,
            config.derivative_step,
        ),
        projected_lead_increase: (predicted_optimal - predicted_current).round() as i64,
        analysis_type,
        action,
    }
}

/// R² as a percentage, capped for low-confidence fits
pub fn confidence_score(
    r_squared: f64,
    analysis_type: AnalysisType,
    config: &OptimizerConfig,
) -> u8 {
    let score = (100.0 * r_squared.clamp(0.0, 1.0)).round() as u8;
    if analysis_type == AnalysisType::LowConfidence {
        score.min(config.low_confidence_cap)
    } else {
        score
    }
}
