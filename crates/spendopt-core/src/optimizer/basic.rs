//! Benchmark-based analysis when no response curve can be trusted
//!
//! Used both when spend barely varied (nothing to fit) and when the best fit
//! explains too little of the lead variance. Compares the window's cost per lead
//! against the industry benchmark and nudges spend accordingly.

use super::recommendation::describe;
use super::window::SpendWindow;
use crate::config::OptimizerConfig;
use spendopt_types::{AnalysisType, OptimizationResult, SpendAction};

/// Spend multiplier suggested to create variation
const VARIATION_STEP: f64 = 1.2;
/// CPL above `benchmark × this` is expensive
const EXPENSIVE_CPL_RATIO: f64 = 1.2;
/// CPL below `benchmark × this` is cheap
const CHEAP_CPL_RATIO: f64 = 0.8;
/// Efficiency needed before scaling a cheap campaign
const SCALE_UP_MIN_EFFICIENCY: f64 = 70.0;
/// Spend multiplier for an expensive campaign
const SCALE_DOWN: f64 = 0.8;
/// Spend multiplier for a cheap, efficient campaign
const SCALE_UP: f64 = 1.3;
/// Efficiency reported when there is no CPL to compare
const NEUTRAL_EFFICIENCY: f64 = 50.0;
/// Confidence of a deliberate spend change
const VARIATION_CONFIDENCE: u8 = 30;
/// Confidence of a benchmark comparison
const BASIC_CONFIDENCE: u8 = 45;

/// Summary averages of a window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpendSummary {
    pub avg_spend: f64,
    pub avg_leads: f64,
    /// Average cost per lead, 0 when no leads were generated
    pub cost_per_lead: f64,
}

impl SpendSummary {
    pub fn from_window(window: &SpendWindow) -> Self {
        let avg_spend = window.avg_spend();
        let avg_leads = window.avg_leads();
        let cost_per_lead = if avg_leads > 0.0 {
            avg_spend / avg_leads
        } else {
            0.0
        };
        Self {
            avg_spend,
            avg_leads,
            cost_per_lead,
        }
    }

    /// Benchmark CPL as a share of actual CPL, capped at 100
    pub fn efficiency(&self, benchmark_cpl: f64) -> f64 {
        if self.cost_per_lead > 0.0 {
            (100.0 * benchmark_cpl / self.cost_per_lead).min(100.0)
        } else {
            NEUTRAL_EFFICIENCY
        }
    }

    /// Average leads per average dollar
    pub fn leads_per_dollar(&self) -> f64 {
        if self.avg_spend > 0.0 {
            self.avg_leads / self.avg_spend
        } else {
            0.0
        }
    }
}

/// Build a `basic` or `insufficient_variation` result from summary averages
pub fn basic_analysis(
    window: &SpendWindow,
    analysis_type: AnalysisType,
    config: &OptimizerConfig,
) -> OptimizationResult {
    let summary = SpendSummary::from_window(window);
    let efficiency = summary.efficiency(config.benchmark_cpl);
    let avg = summary.avg_spend;

    let (action, confidence) = if analysis_type == AnalysisType::InsufficientVariation {
        (
            SpendAction::VarySpend {
                target: avg * VARIATION_STEP,
            },
            VARIATION_CONFIDENCE,
        )
    } else {
        let cpl = summary.cost_per_lead;
        let action = if cpl > EXPENSIVE_CPL_RATIO * config.benchmark_cpl {
            SpendAction::Decrease {
                by: avg * (1.0 - SCALE_DOWN),
                target: avg * SCALE_DOWN,
            }
        } else if cpl < CHEAP_CPL_RATIO * config.benchmark_cpl
            && efficiency > SCALE_UP_MIN_EFFICIENCY
        {
            SpendAction::Increase {
                by: avg * (SCALE_UP - 1.0),
                target: avg * SCALE_UP,
            }
        } else {
            SpendAction::Hold { target: avg }
        };
        (action, BASIC_CONFIDENCE)
    };

    let optimal = action.target().unwrap_or(avg);
    let marginal = summary.leads_per_dollar();

    tracing::debug!(
        analysis = %analysis_type,
        avg_spend = avg,
        cpl = summary.cost_per_lead,
        efficiency,
        "Basic spend analysis"
    );

    OptimizationResult {
        optimal_daily_spend: round_cents(optimal),
        current_efficiency: efficiency.round(),
        confidence_score: confidence,
        recommendation: describe(&action),
        marginal_leads_per_dollar: marginal,
        projected_lead_increase: ((optimal - avg) * marginal).round() as i64,
        analysis_type,
        action,
    }
}

/// Round a dollar amount to cents
pub(crate) fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use spendopt_types::HistoryPoint;

    fn window(points: &[(f64, i64)]) -> SpendWindow {
        let history: Vec<HistoryPoint> = points
            .iter()
            .map(|&(spend, leads)| HistoryPoint::new("2026-01-01", spend, leads))
            .collect();
        SpendWindow::select(&history, 60)
    }

    #[test]
    fn test_insufficient_variation_tries_higher_spend() {
        let result = basic_analysis(
            &window(&[(100.0, 10); 8]),
            AnalysisType::InsufficientVariation,
            &OptimizerConfig::default(),
        );
        assert_eq!(result.analysis_type, AnalysisType::InsufficientVariation);
        assert_eq!(result.optimal_daily_spend, 120.0);
        assert_eq!(result.confidence_score, 30);
        // CPL $10 is far below the $125 benchmark
        assert_eq!(result.current_efficiency, 100.0);
        assert!((result.marginal_leads_per_dollar - 0.1).abs() < 1e-12);
        assert_eq!(result.projected_lead_increase, 2);
    }

    #[test]
    fn test_expensive_campaign_scales_down() {
        // CPL = 1000 / 5 = 200 > 150
        let result = basic_analysis(
            &window(&[(1000.0, 5); 6]),
            AnalysisType::Basic,
            &OptimizerConfig::default(),
        );
        assert_eq!(result.optimal_daily_spend, 800.0);
        assert_eq!(result.confidence_score, 45);
        assert!(matches!(result.action, SpendAction::Decrease { .. }));
        assert_eq!(result.current_efficiency, 63.0);
        assert_eq!(result.projected_lead_increase, -1);
    }

    #[test]
    fn test_cheap_campaign_scales_up() {
        // CPL = 50 < 100, efficiency capped at 100 > 70
        let result = basic_analysis(
            &window(&[(500.0, 10); 6]),
            AnalysisType::Basic,
            &OptimizerConfig::default(),
        );
        assert_eq!(result.optimal_daily_spend, 650.0);
        assert!(matches!(result.action, SpendAction::Increase { .. }));
        assert_eq!(result.projected_lead_increase, 3);
    }

    #[test]
    fn test_benchmark_campaign_holds() {
        // CPL = 125, right on the benchmark
        let result = basic_analysis(
            &window(&[(250.0, 2); 6]),
            AnalysisType::Basic,
            &OptimizerConfig::default(),
        );
        assert_eq!(result.optimal_daily_spend, 250.0);
        assert!(matches!(result.action, SpendAction::Hold { .. }));
        assert_eq!(result.projected_lead_increase, 0);
        assert!(result.recommendation.contains("optimal spend range"));
    }

    #[test]
    fn test_no_leads_uses_neutral_efficiency() {
        let result = basic_analysis(
            &window(&[(250.0, 0); 6]),
            AnalysisType::Basic,
            &OptimizerConfig::default(),
        );
        assert_eq!(result.current_efficiency, 50.0);
        assert_eq!(result.marginal_leads_per_dollar, 0.0);
        assert!(matches!(result.action, SpendAction::Hold { .. }));
    }
}
