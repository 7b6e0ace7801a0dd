//! Spend → leads response curves
//!
//! Three closed-form least-squares fits share one result shape:
//! - logarithmic `leads = a·ln(spend) + b` (diminishing returns)
//! - quadratic `leads = a·spend² + b·spend + c` (rise then fall)
//! - linear `leads = a·spend + b` (baseline)
//!
//! Every model predicts non-negative leads and carries an R² in `[0, 1]`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Determinant below which the quadratic normal equations are treated as singular
pub const QUADRATIC_DET_EPSILON: f64 = 1e-10;

/// Share of the linear and constant terms below which `a·spend²` counts as rounding noise
pub const CURVATURE_EPSILON: f64 = 1e-6;

/// Shape of a fitted response curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionKind {
    Logarithmic,
    Quadratic,
    Linear,
}

impl RegressionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logarithmic => "logarithmic",
            Self::Quadratic => "quadratic",
            Self::Linear => "linear",
        }
    }
}

impl fmt::Display for RegressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fitted response curve
///
/// Coefficients are ordered from the highest-order term down:
/// `[a, b]` for logarithmic and linear, `[a, b, c]` for quadratic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionModel {
    kind: RegressionKind,
    coefficients: Vec<f64>,
    r_squared: f64,
}

impl RegressionModel {
    #[cfg(test)]
    pub(crate) fn unscored(kind: RegressionKind, coefficients: Vec<f64>) -> Self {
        Self {
            kind,
            coefficients,
            r_squared: 1.0,
        }
    }

    /// Build a model and score it against `points`
    fn scored(kind: RegressionKind, coefficients: Vec<f64>, points: &[(f64, f64)]) -> Self {
        let mut model = Self {
            kind,
            coefficients,
            r_squared: 0.0,
        };
        model.r_squared = r_squared(points, |x| model.predict(x));
        model
    }

    pub fn kind(&self) -> RegressionKind {
        self.kind
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Coefficient of determination, clamped to `[0, 1]`
    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    /// Leading coefficient `a` of a quadratic, if this is one
    fn quadratic_term(&self) -> Option<f64> {
        match (self.kind, self.coefficients.as_slice()) {
            (RegressionKind::Quadratic, [a, _, _]) => Some(*a),
            _ => None,
        }
    }

    /// True when the quadratic term is more than rounding noise up to `max_spend`
    ///
    /// A straight line fitted as a quadratic leaves `a` at float noise whose
    /// sign would otherwise decide between the vertex and the scan.
    pub fn has_curvature(&self, max_spend: f64) -> bool {
        match (self.quadratic_term(), self.coefficients.as_slice()) {
            (Some(a), [_, b, c]) => {
                a.abs() * max_spend * max_spend
                    >= CURVATURE_EPSILON * (b.abs() * max_spend + c.abs())
            }
            _ => false,
        }
    }

    /// Spend at the apex of a concave quadratic (`a < 0`)
    pub fn vertex(&self) -> Option<f64> {
        match (self.kind, self.coefficients.as_slice()) {
            (RegressionKind::Quadratic, [a, b, _]) if *a < 0.0 => Some(-b / (2.0 * a)),
            _ => None,
        }
    }

    /// Predicted leads at `spend`, never negative
    ///
    /// The logarithmic curve is undefined at zero spend and predicts 0 there.
    pub fn predict(&self, spend: f64) -> f64 {
        let raw = match (self.kind, self.coefficients.as_slice()) {
            (RegressionKind::Logarithmic, [a, b]) => {
                if spend > 0.0 {
                    a * spend.ln() + b
                } else {
                    0.0
                }
            }
            (RegressionKind::Quadratic, [a, b, c]) => a * spend * spend + b * spend + c,
            (RegressionKind::Linear, [a, b]) => a * spend + b,
            _ => 0.0,
        };
        // f64::max drops NaN, so a degenerate curve also predicts 0
        raw.max(0.0)
    }
}

/// Fit all three curves in evaluation order (logarithmic, quadratic, linear)
pub fn fit_all(points: &[(f64, f64)]) -> [RegressionModel; 3] {
    [
        fit_logarithmic(points),
        fit_quadratic(points),
        fit_linear(points),
    ]
}

/// Least squares on `(ln(spend), leads)`
///
/// Non-positive spends are skipped for the fit; the window never contains them.
pub fn fit_logarithmic(points: &[(f64, f64)]) -> RegressionModel {
    let transformed: Vec<(f64, f64)> = points
        .iter()
        .filter(|p| p.0 > 0.0)
        .map(|&(x, y)| (x.ln(), y))
        .collect();
    let (slope, intercept) = least_squares(&transformed);
    RegressionModel::scored(RegressionKind::Logarithmic, vec![slope, intercept], points)
}

/// Ordinary least squares line through `points`
pub fn fit_linear(points: &[(f64, f64)]) -> RegressionModel {
    let (slope, intercept) = least_squares(points);
    RegressionModel::scored(RegressionKind::Linear, vec![slope, intercept], points)
}

/// Quadratic least squares via the 3×3 normal equations (Cramer's rule)
///
/// Falls back to [`fit_linear`] when the system is singular, so the returned
/// model may be of kind `Linear`.
pub fn fit_quadratic(points: &[(f64, f64)]) -> RegressionModel {
    let n = points.len() as f64;
    let mut sx = 0.0;
    let mut sx2 = 0.0;
    let mut sx3 = 0.0;
    let mut sx4 = 0.0;
    let mut sy = 0.0;
    let mut sxy = 0.0;
    let mut sx2y = 0.0;
    for &(x, y) in points {
        let x2 = x * x;
        sx += x;
        sx2 += x2;
        sx3 += x2 * x;
        sx4 += x2 * x2;
        sy += y;
        sxy += x * y;
        sx2y += x2 * y;
    }

    // Unknowns ordered (c, b, a)
    let matrix = [[n, sx, sx2], [sx, sx2, sx3], [sx2, sx3, sx4]];
    let rhs = [sy, sxy, sx2y];

    let det = det3(&matrix);
    if !det.is_finite() || det.abs() < QUADRATIC_DET_EPSILON {
        tracing::warn!(det, points = points.len(), "Quadratic fit singular, using linear");
        return fit_linear(points);
    }

    let c = det3(&with_column(&matrix, 0, &rhs)) / det;
    let b = det3(&with_column(&matrix, 1, &rhs)) / det;
    let a = det3(&with_column(&matrix, 2, &rhs)) / det;

    RegressionModel::scored(RegressionKind::Quadratic, vec![a, b, c], points)
}

/// Slope and intercept of the least-squares line
///
/// With fewer than two distinct x values the best line is flat at the mean.
fn least_squares(points: &[(f64, f64)]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }

    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|p| p.0).sum();
    let sum_y: f64 = points.iter().map(|p| p.1).sum();
    let sum_xx: f64 = points.iter().map(|p| p.0 * p.0).sum();
    let sum_xy: f64 = points.iter().map(|p| p.0 * p.1).sum();

    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() <= f64::EPSILON * n * sum_xx.abs() {
        return (0.0, sum_y / n);
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;
    (slope, intercept)
}

/// R² of `predict` against the observed leads, clamped to `[0, 1]`
///
/// A fit worse than predicting the mean scores 0, as does a series with no
/// lead variance at all.
fn r_squared(points: &[(f64, f64)], predict: impl Fn(f64) -> f64) -> f64 {
    if points.is_empty() {
        return 0.0;
    }

    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / points.len() as f64;
    let ss_tot: f64 = points.iter().map(|p| (p.1 - mean_y).powi(2)).sum();
    let ss_res: f64 = points.iter().map(|p| (p.1 - predict(p.0)).powi(2)).sum();

    if ss_tot <= 0.0 {
        return 0.0;
    }

    let r2 = 1.0 - ss_res / ss_tot;
    if r2.is_finite() {
        r2.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

fn with_column(m: &[[f64; 3]; 3], col: usize, values: &[f64; 3]) -> [[f64; 3]; 3] {
    let mut out = *m;
    for (row, value) in out.iter_mut().zip(values) {
        row[col] = *value;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(f: impl Fn(f64) -> f64) -> Vec<(f64, f64)> {
        (0..20)
            .map(|i| {
                let x = 50.0 + i as f64 * 25.0;
                (x, f(x))
            })
            .collect()
    }

    #[test]
    fn test_linear_exact_fit() {
        let model = fit_linear(&series(|x| 2.0 * x + 3.0));
        let [a, b] = model.coefficients() else {
            panic!("linear model has two coefficients");
        };
        assert!((a - 2.0).abs() < 1e-9);
        assert!((b - 3.0).abs() < 1e-6);
        assert!(model.r_squared() > 0.999_999);
    }

    #[test]
    fn test_logarithmic_exact_fit() {
        let model = fit_logarithmic(&series(|x| 20.0 * x.ln() - 60.0));
        let [a, b] = model.coefficients() else {
            panic!("log model has two coefficients");
        };
        assert!((a - 20.0).abs() < 1e-6);
        assert!((b + 60.0).abs() < 1e-5);
        assert!(model.r_squared() > 0.999_999);
    }

    #[test]
    fn test_quadratic_recovers_concave_curve() {
        let model = fit_quadratic(&series(|x| -0.0004 * x * x + 0.4 * x + 10.0));
        assert_eq!(model.kind(), RegressionKind::Quadratic);
        assert!(model.quadratic_term().unwrap() < 0.0);
        assert!(model.has_curvature(525.0));
        let vertex = model.vertex().unwrap();
        assert!((vertex - 500.0).abs() < 1.0, "vertex was {vertex}");
        assert!(model.r_squared() > 0.9999);
    }

    #[test]
    fn test_rounding_noise_is_not_curvature() {
        let noisy =
            RegressionModel::unscored(RegressionKind::Quadratic, vec![-2.5e-17, 0.001, 0.0]);
        assert!(!noisy.has_curvature(59_000.0));

        let real = RegressionModel::unscored(RegressionKind::Quadratic, vec![-1e-8, 0.001, 0.0]);
        assert!(real.has_curvature(59_000.0));

        let line = RegressionModel::unscored(RegressionKind::Linear, vec![0.001, 0.0]);
        assert!(!line.has_curvature(59_000.0));
    }

    #[test]
    fn test_quadratic_singular_falls_back_to_linear() {
        // A single repeated spend makes the normal equations singular
        let points = vec![(100.0, 5.0); 6];
        let model = fit_quadratic(&points);
        assert_eq!(model.kind(), RegressionKind::Linear);
    }

    #[test]
    fn test_r_squared_zero_without_lead_variance() {
        let model = fit_linear(&series(|_| 7.0));
        assert_eq!(model.r_squared(), 0.0);
    }

    #[test]
    fn test_r_squared_clamped_for_bad_fit() {
        let points = series(|x| if (x as i64 / 25) % 2 == 0 { 0.0 } else { 100.0 });
        for model in fit_all(&points) {
            assert!((0.0..=1.0).contains(&model.r_squared()));
        }
    }

    #[test]
    fn test_predict_never_negative() {
        let model = fit_linear(&series(|x| 500.0 - x));
        assert_eq!(model.predict(10_000.0), 0.0);

        let log = fit_logarithmic(&series(|x| 20.0 * x.ln() - 60.0));
        assert_eq!(log.predict(0.0), 0.0);
        assert_eq!(log.predict(0.5), 0.0);
    }

    #[test]
    fn test_fit_all_order() {
        let kinds: Vec<_> = fit_all(&series(|x| x))
            .iter()
            .map(RegressionModel::kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                RegressionKind::Logarithmic,
                RegressionKind::Quadratic,
                RegressionKind::Linear
            ]
        );
    }
}
