//! Output of the spend optimization engine
//!
//! `analysis_type` is the discriminant of the result: it says which computation
//! path produced the numeric fields and how much trust they deserve. Consumers
//! (badges, tooltips, exports) should switch on it rather than inspect values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which analysis path produced an [`OptimizationResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    /// Too few usable days to say anything
    Gathering,
    /// Spend barely moved, so no curve can be fitted reliably
    InsufficientVariation,
    /// Curve fit too weak, summary averages against the CPL benchmark
    Basic,
    /// Curve fit usable but tentative (confidence capped)
    LowConfidence,
    /// Curve fit trusted
    Advanced,
}

impl AnalysisType {
    /// Wire value, matches the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gathering => "gathering",
            Self::InsufficientVariation => "insufficient_variation",
            Self::Basic => "basic",
            Self::LowConfidence => "low_confidence",
            Self::Advanced => "advanced",
        }
    }

    /// Short label for badges
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gathering => "Gathering data",
            Self::InsufficientVariation => "Needs spend variation",
            Self::Basic => "Basic",
            Self::LowConfidence => "Low confidence",
            Self::Advanced => "Advanced",
        }
    }

    /// True when the numbers come from a fitted response curve
    pub fn is_model_based(&self) -> bool {
        matches!(self, Self::LowConfidence | Self::Advanced)
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured recommendation behind the human-readable text
///
/// Dollar amounts are per day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpendAction {
    /// Not enough history yet
    Collecting,
    /// Vary daily spend around the current level so a curve can be fitted
    VarySpend { target: f64 },
    /// Raise daily spend
    Increase { by: f64, target: f64 },
    /// Lower daily spend
    Decrease { by: f64, target: f64 },
    /// Current spend is already in the optimal range
    Hold { target: f64 },
}

impl SpendAction {
    /// Build an increase/decrease/hold action from current and target spend
    ///
    /// Spend within `hold_band` (fraction of current) of the target is a hold.
    pub fn between(current: f64, target: f64, hold_band: f64) -> Self {
        let delta = target - current;
        if delta.abs() < hold_band * current {
            Self::Hold { target }
        } else if delta > 0.0 {
            Self::Increase { by: delta, target }
        } else {
            Self::Decrease {
                by: -delta,
                target,
            }
        }
    }

    /// Target daily spend, if the action carries one
    pub fn target(&self) -> Option<f64> {
        match self {
            Self::Collecting => None,
            Self::VarySpend { target }
            | Self::Increase { target, .. }
            | Self::Decrease { target, .. }
            | Self::Hold { target } => Some(*target),
        }
    }
}

/// Spend recommendation for one campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    /// Recommended daily spend in USD
    pub optimal_daily_spend: f64,
    /// How close current spend already is to the optimum (0-100)
    pub current_efficiency: f64,
    /// Trust in the recommendation (0-100)
    pub confidence_score: u8,
    /// Human-readable recommendation
    pub recommendation: String,
    /// Incremental leads per extra dollar at the recommended spend
    pub marginal_leads_per_dollar: f64,
    /// Expected daily lead change when moving to the recommended spend
    pub projected_lead_increase: i64,
    /// Computation path that produced this result
    pub analysis_type: AnalysisType,
    /// Structured form of `recommendation`
    pub action: SpendAction,
}

impl OptimizationResult {
    /// Placeholder while history is still accumulating: every number is zero
    pub fn gathering(recommendation: impl Into<String>) -> Self {
        Self {
            optimal_daily_spend: 0.0,
            current_efficiency: 0.0,
            confidence_score: 0,
            recommendation: recommendation.into(),
            marginal_leads_per_dollar: 0.0,
            projected_lead_increase: 0,
            analysis_type: AnalysisType::Gathering,
            action: SpendAction::Collecting,
        }
    }
}
