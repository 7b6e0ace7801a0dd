//! Spend optimization engine
//!
//! Infers the spend → leads response curve of one campaign and recommends the
//! daily spend with the best marginal lead yield. The pipeline is linear:
//!
//! 1. [`window`] keeps the most recent usable days
//! 2. the variation gate skips fitting when spend barely moved
//! 3. [`regression`] fits logarithmic, quadratic and linear curves
//! 4. [`selector`] picks the best R² and classifies confidence
//! 5. [`search`] finds the optimal spend, [`builder`] / [`basic`] package it
//!
//! Everything here is pure and synchronous: inputs are borrowed read-only and
//! every call recomputes from scratch, so identical history always yields an
//! identical result.

use serde::Serialize;
use spendopt_types::{AnalysisType, HistoryPoint, OptimizationResult, SpendAction};

use crate::config::OptimizerConfig;

pub mod basic;
pub mod builder;
pub mod recommendation;
pub mod regression;
pub mod search;
pub mod selector;
pub mod window;


pub use basic::{basic_analysis, SpendSummary};
pub use builder::{confidence_score, model_result};
pub use recommendation::{describe, format_dollars};
pub use regression::{
    fit_all, fit_linear, fit_logarithmic, fit_quadratic, RegressionKind, RegressionModel,
};
pub use search::{find_optimal_spend, marginal_efficiency, marginal_leads_per_dollar};
pub use selector::{classify, select_best};
pub use window::SpendWindow;

/// Spend recommendation with the stock tuning
///
/// Returns `None` only when there is no history reference at all; empty or
/// short history yields a `gathering` result.
pub fn compute_optimal_spend(history: Option<&[HistoryPoint]>) -> Option<OptimizationResult> {
    SpendOptimizer::default().optimize(history)
}

/// Diagnostic view of one optimization run (for `spendopt fit`)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitDiagnostics {
    /// Usable points in the window
    pub points: usize,
    pub min_spend: f64,
    pub max_spend: f64,
    /// Spend range the variation gate required
    pub variation_threshold: f64,
    /// Fitted curves, empty when fitting was skipped
    pub models: Vec<RegressionModel>,
    /// Kind of the winning curve, if any were fitted
    pub selected: Option<RegressionKind>,
    pub analysis_type: AnalysisType,
}

/// Spend optimizer with explicit tuning
#[derive(Debug, Clone, Default)]
pub struct SpendOptimizer {
    config: OptimizerConfig,
}

impl SpendOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Optimize an optional history reference (`None` in, `None` out)
    pub fn optimize(&self, history: Option<&[HistoryPoint]>) -> Option<OptimizationResult> {
        history.map(|h| self.analyze(h))
    }

    /// Run the full pipeline over one campaign's history
    pub fn analyze(&self, history: &[HistoryPoint]) -> OptimizationResult {
        let window = SpendWindow::select(history, self.config.window_size);

        if window.len() < self.config.min_data_points {
            tracing::debug!(
                points = window.len(),
                required = self.config.min_data_points,
                "Not enough usable history, still gathering"
            );
            return OptimizationResult::gathering(describe(&SpendAction::Collecting));
        }

        if !self.has_sufficient_variation(&window) {
            tracing::debug!(
                min_spend = window.min_spend(),
                max_spend = window.max_spend(),
                "Spend variation below threshold, skipping curve fitting"
            );
            return basic_analysis(&window, AnalysisType::InsufficientVariation, &self.config);
        }

        let models = fit_all(window.points());
        let Some(best) = select_best(&models) else {
            return basic_analysis(&window, AnalysisType::Basic, &self.config);
        };

        match classify(best.r_squared(), &self.config) {
            AnalysisType::Basic => {
                tracing::debug!(
                    model = %best.kind(),
                    r_squared = best.r_squared(),
                    "Best fit too weak, falling back to benchmark analysis"
                );
                basic_analysis(&window, AnalysisType::Basic, &self.config)
            }
            analysis_type => model_result(best, &window, analysis_type, &self.config),
        }
    }

    /// Same pipeline as [`Self::analyze`], reporting the intermediate steps
    pub fn diagnose(&self, history: &[HistoryPoint]) -> FitDiagnostics {
        let window = SpendWindow::select(history, self.config.window_size);
        let variation_threshold = window.variation_threshold(
            self.config.relative_variation_floor,
            self.config.absolute_variation_floor,
        );

        let fitted = window.len() >= self.config.min_data_points
            && self.has_sufficient_variation(&window);
        let models: Vec<RegressionModel> = if fitted {
            fit_all(window.points()).into()
        } else {
            Vec::new()
        };
        let selected = select_best(&models).map(RegressionModel::kind);

        FitDiagnostics {
            points: window.len(),
            min_spend: window.min_spend(),
            max_spend: window.max_spend(),
            variation_threshold,
            selected,
            analysis_type: self.analyze(history).analysis_type,
            models,
        }
    }

    fn has_sufficient_variation(&self, window: &SpendWindow) -> bool {
        window.has_sufficient_variation(
            self.config.relative_variation_floor,
            self.config.absolute_variation_floor,
        )
    }
}
