//! Best-fit selection and confidence classification

use super::regression::RegressionModel;
use crate::config::OptimizerConfig;
use spendopt_types::AnalysisType;

/// Model with the strictly highest R²; on exact ties the earliest wins
///
/// Returns `None` only for an empty slice.
pub fn select_best(models: &[RegressionModel]) -> Option<&RegressionModel> {
    models.iter().fold(None, |best, model| match best {
        Some(current) if model.r_squared() <= current.r_squared() => Some(current),
        _ => Some(model),
    })
}

/// Map the winning R² onto an analysis state
pub fn classify(r_squared: f64, config: &OptimizerConfig) -> AnalysisType {
    if r_squared < config.basic_threshold {
        AnalysisType::Basic
    } else if r_squared < config.advanced_threshold {
        AnalysisType::LowConfidence
    } else {
        AnalysisType::Advanced
    }
}
