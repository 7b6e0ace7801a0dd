//! Performance benchmarks for the spend optimizer
//!
//! One optimization runs on every dashboard refresh of every campaign, so
//! the full pipeline over a 60-day window should stay well under 100µs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use spendopt_core::optimizer::{fit_all, SpendWindow};
use spendopt_core::{HistoryPoint, SpendOptimizer};

/// Generate newest-first history with diminishing returns and some noise
fn generate_history(days: usize) -> Vec<HistoryPoint> {
    (0..days)
        .map(|i| {
            let spend = 80.0 + (i % 12) as f64 * 40.0;
            let leads = 18.0 * spend.ln() - 55.0 + (i % 5) as f64;
            HistoryPoint::new(
                format!("2026-{:02}-{:02}", 1 + i / 28, 1 + i % 28),
                spend,
                leads.round() as i64,
            )
        })
        .collect()
}

/// Benchmark 1: full pipeline with varying history lengths
fn optimize_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize");
    let optimizer = SpendOptimizer::default();

    for days in [5, 20, 60] {
        let history = generate_history(days);
        group.bench_with_input(BenchmarkId::new("days", days), &history, |b, history| {
            b.iter(|| {
                black_box(optimizer.analyze(black_box(history)));
            });
        });
    }

    group.finish();
}

/// Benchmark 2: curve fitting alone
fn fit_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_all");

    for days in [5, 20, 60] {
        let history = generate_history(days);
        let window = SpendWindow::select(&history, 60);
        group.bench_with_input(BenchmarkId::new("points", days), &window, |b, window| {
            b.iter(|| {
                black_box(fit_all(black_box(window.points())));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, optimize_benchmark, fit_benchmark);
criterion_main!(benches);
