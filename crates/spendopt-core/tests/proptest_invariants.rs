use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use spendopt_core::optimizer::{fit_all, SpendWindow};
use spendopt_core::{compute_optimal_spend, AnalysisType, HistoryPoint, SpendAction};

const MIN_PROPTEST_CASES: u32 = 256;
const CENT_TOL: f64 = 0.01;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

fn to_history(days: &[(f64, i64)]) -> Vec<HistoryPoint> {
    days.iter()
        .enumerate()
        .map(|(i, &(spend, leads))| {
            let date = format!("2026-{:02}-{:02}", 1 + i / 28, 1 + i % 28);
            HistoryPoint::new(date, spend, leads)
        })
        .collect()
}

fn usable_days(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<(f64, i64)>> {
    prop::collection::vec((10.0f64..2000.0, 0i64..200), len)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        max_shrink_iters: 1024,
        .. ProptestConfig::default()
    })]

    #[test]
    fn fitted_models_are_bounded(days in usable_days(5..80)) {
        let history = to_history(&days);
        let window = SpendWindow::select(&history, 60);

        for model in fit_all(window.points()) {
            let r2 = model.r_squared();
            prop_assert!((0.0..=1.0).contains(&r2), "{} r2 = {}", model.kind(), r2);

            for step in 0..=20 {
                let spend = window.max_spend() * 10.0 * step as f64 / 20.0;
                let predicted = model.predict(spend);
                prop_assert!(predicted >= 0.0, "{} predicted {} at {}", model.kind(), predicted, spend);
            }
        }
    }

    #[test]
    fn results_stay_in_range(days in usable_days(5..80)) {
        let history = to_history(&days);
        let result = compute_optimal_spend(Some(&history)).unwrap();

        prop_assert_ne!(result.analysis_type, AnalysisType::Gathering);
        prop_assert!(result.confidence_score <= 100);
        prop_assert!((0.0..=100.0).contains(&result.current_efficiency));
        prop_assert!(result.optimal_daily_spend > 0.0);
        prop_assert!(result.marginal_leads_per_dollar.is_finite());

        if result.analysis_type == AnalysisType::LowConfidence {
            prop_assert!(result.confidence_score <= 60);
        }

        if result.analysis_type.is_model_based() {
            let window = SpendWindow::select(&history, 60);
            prop_assert!(result.optimal_daily_spend >= window.min_spend() - CENT_TOL);
            prop_assert!(result.optimal_daily_spend <= window.max_spend() + CENT_TOL);
        }
    }

    #[test]
    fn optimization_is_idempotent(days in usable_days(0..80)) {
        let history = to_history(&days);
        let first = compute_optimal_spend(Some(&history)).unwrap();
        let second = compute_optimal_spend(Some(&history)).unwrap();

        prop_assert_eq!(first.optimal_daily_spend.to_bits(), second.optimal_daily_spend.to_bits());
        prop_assert_eq!(first.current_efficiency.to_bits(), second.current_efficiency.to_bits());
        prop_assert_eq!(
            first.marginal_leads_per_dollar.to_bits(),
            second.marginal_leads_per_dollar.to_bits()
        );
        prop_assert_eq!(first, second);
    }

    #[test]
    fn short_history_is_gathering(
        days in usable_days(0..5),
        padding in prop::collection::vec((-100.0f64..=0.0, 0i64..50), 0..20),
    ) {
        let mut history = to_history(&days);
        // Zero or negative spend never counts as a usable day
        history.extend(to_history(&padding));

        let result = compute_optimal_spend(Some(&history)).unwrap();
        prop_assert_eq!(result.analysis_type, AnalysisType::Gathering);
        prop_assert_eq!(result.optimal_daily_spend, 0.0);
        prop_assert_eq!(result.confidence_score, 0);
        prop_assert_eq!(result.projected_lead_increase, 0);
        prop_assert_eq!(result.action, SpendAction::Collecting);
    }

    #[test]
    fn narrow_spend_range_skips_fitting(
        base in 50.0f64..5000.0,
        offsets in prop::collection::vec((0.0f64..0.99, 0i64..100), 5..60),
    ) {
        let threshold = (0.15 * base).max(50.0);
        let days: Vec<(f64, i64)> = offsets
            .iter()
            .map(|&(fraction, leads)| (base + fraction * threshold, leads))
            .collect();
        let history = to_history(&days);

        let result = compute_optimal_spend(Some(&history)).unwrap();
        prop_assert_eq!(result.analysis_type, AnalysisType::InsufficientVariation);
        prop_assert_eq!(result.confidence_score, 30);
        let is_vary = matches!(result.action, SpendAction::VarySpend { .. });
        prop_assert!(is_vary);
    }
}
