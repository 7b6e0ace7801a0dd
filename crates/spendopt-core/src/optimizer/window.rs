//! Usable history window and the spend-variation gate

use spendopt_types::HistoryPoint;

/// The most recent usable `(spend, leads)` observations of a campaign
///
/// Only days with positive spend and non-negative leads survive. The caller is
/// expected to pass history newest-first; the window keeps the first entries.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendWindow {
    points: Vec<(f64, f64)>,
    min_spend: f64,
    max_spend: f64,
}

impl SpendWindow {
    /// Select at most `window_size` usable points from `history`
    pub fn select(history: &[HistoryPoint], window_size: usize) -> Self {
        let points: Vec<(f64, f64)> = history
            .iter()
            .filter(|p| p.is_usable())
            .take(window_size)
            .map(|p| (p.ad_spend, p.leads as f64))
            .collect();

        let (min_spend, max_spend) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(x, _)| {
                (lo.min(x), hi.max(x))
            });

        if points.is_empty() {
            return Self {
                points,
                min_spend: 0.0,
                max_spend: 0.0,
            };
        }

        Self {
            points,
            min_spend,
            max_spend,
        }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn min_spend(&self) -> f64 {
        self.min_spend
    }

    pub fn max_spend(&self) -> f64 {
        self.max_spend
    }

    pub fn spend_range(&self) -> f64 {
        self.max_spend - self.min_spend
    }

    /// Mean daily spend (0 for an empty window)
    pub fn avg_spend(&self) -> f64 {
        mean(self.points.iter().map(|p| p.0), self.len())
    }

    /// Mean daily leads (0 for an empty window)
    pub fn avg_leads(&self) -> f64 {
        mean(self.points.iter().map(|p| p.1), self.len())
    }

    /// Smallest spend range worth fitting a curve to
    ///
    /// The relative floor matters for small budgets, the absolute one for large.
    pub fn variation_threshold(&self, relative_floor: f64, absolute_floor: f64) -> f64 {
        (relative_floor * self.min_spend).max(absolute_floor)
    }

    /// Variation gate: did spend move enough to fit a response curve?
    pub fn has_sufficient_variation(&self, relative_floor: f64, absolute_floor: f64) -> bool {
        self.spend_range() >= self.variation_threshold(relative_floor, absolute_floor)
    }
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}
