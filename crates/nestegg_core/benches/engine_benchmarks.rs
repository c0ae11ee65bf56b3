//! Criterion benchmarks for nestegg_core
//!
//! Run with: cargo bench -p nestegg_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jiff::civil::date;
use nestegg_core::aggregate::{mean_series, median_series};
use nestegg_core::simulation::{monte_carlo_simulate, simulate_path};
use nestegg_core::{
    Comparison, MonteCarloConfig, PricePoint, ReturnSeries, SimulationParameters,
    SortedDistribution,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Forty years of synthetic monthly prices
fn create_returns() -> ReturnSeries {
    let mut price = 100.0;
    let prices: Vec<PricePoint> = (0..481)
        .map(|i| {
            if i > 0 {
                price *= ((((i * 11) % 23) as f64 - 10.5) * 0.004).exp();
            }
            PricePoint::new(date(1980 + (i / 12) as i16, (i % 12 + 1) as i8, 1), price)
        })
        .collect();
    ReturnSeries::from_prices(&prices).unwrap()
}

fn bench_single_path(c: &mut Criterion) {
    let returns = create_returns();
    let params = SimulationParameters::from_years(100_000.0, 1_000.0, 30);
    let mut rng = SmallRng::seed_from_u64(42);

    c.bench_function("single_path_30yr", |b| {
        b.iter(|| simulate_path(black_box(&returns), black_box(&params), &mut rng))
    });
}

fn bench_monte_carlo(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo");
    let returns = create_returns();
    let params = SimulationParameters::from_years(100_000.0, 1_000.0, 30);

    for iterations in [1_000, 10_000].iter() {
        let config = MonteCarloConfig::default()
            .with_iterations(*iterations)
            .with_seed(42);

        group.bench_with_input(
            BenchmarkId::new("iterations", iterations),
            iterations,
            |b, _| {
                b.iter(|| monte_carlo_simulate(black_box(&returns), &params, black_box(&config)))
            },
        );
    }

    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");
    let params = SimulationParameters::from_years(100_000.0, 1_000.0, 30);
    let config = MonteCarloConfig::default().with_seed(42);
    let batch = monte_carlo_simulate(&create_returns(), &params, &config).unwrap();

    group.bench_function("mean_series", |b| b.iter(|| mean_series(black_box(&batch))));
    group.bench_function("median_series", |b| {
        b.iter(|| median_series(black_box(&batch)))
    });
    group.bench_function("sorted_distribution", |b| {
        b.iter(|| SortedDistribution::from_batch(black_box(&batch)))
    });

    group.finish();
}

fn bench_inference(c: &mut Criterion) {
    let mut group = c.benchmark_group("inference");
    let params = SimulationParameters::from_years(100_000.0, 1_000.0, 30);
    let config = MonteCarloConfig::default().with_seed(42);
    let batch = monte_carlo_simulate(&create_returns(), &params, &config).unwrap();
    let distribution = SortedDistribution::from_batch(&batch);

    group.bench_function("reconcile", |b| {
        b.iter(|| distribution.reconcile(black_box(5.0), Comparison::AtMost))
    });
    group.bench_function("histogram", |b| b.iter(|| distribution.histogram()));

    group.finish();
}

criterion_group!(
    benches,
    bench_single_path,
    bench_monte_carlo,
    bench_aggregation,
    bench_inference,
);
criterion_main!(benches);
