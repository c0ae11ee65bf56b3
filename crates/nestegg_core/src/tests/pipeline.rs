//! End-to-end tests from price history to summary
//!
//! These tests verify that:
//! - A run from prices produces aligned series and a full distribution
//! - Invalid parameters are reported before bad data
//! - A cancelled run yields no summary
//! - Withdrawals can drive paths below zero without clamping

use super::{monthly_prices, prices_from};
use crate::config::MonteCarloConfig;
use crate::distribution::Comparison;
use crate::error::{DataError, ParameterError, SimulationError};
use crate::model::{AggregationMode, ReturnSeries, SimulationParameters};
use crate::progress::MonteCarloProgress;
use crate::simulation::{run_from_prices, run_with_progress};

#[test]
fn test_run_from_prices() {
    let params = SimulationParameters::from_years(50_000.0, 500.0, 20);
    let config = MonteCarloConfig::default()
        .with_iterations(2_000)
        .with_seed(8);

    let summary = run_from_prices(&monthly_prices(241), &params, &config).unwrap();

    assert_eq!(summary.iterations, 2_000);
    assert_eq!(summary.parameters, params);
    assert_eq!(summary.distribution.len(), 2_000);
    for mode in [AggregationMode::Mean, AggregationMode::Median] {
        let series = summary.series(mode);
        assert_eq!(series.mode, mode);
        assert_eq!(series.len(), 241);
        assert_eq!(series.points[0].value, 50_000.0);
        assert_eq!(series.yearly().len(), 21);
    }

    // Terminal median of the series is the middle of the distribution
    let sorted = summary.distribution.as_slice();
    assert_eq!(summary.final_median(), Some(sorted[sorted.len() / 2]));
    let mean = summary.distribution.mean().unwrap();
    assert!((summary.final_mean().unwrap() - mean).abs() < 1e-6 * mean.abs());

    let lower = summary
        .distribution
        .reconcile(5.0, Comparison::AtMost)
        .unwrap();
    let upper = summary
        .distribution
        .reconcile(5.0, Comparison::AtLeast)
        .unwrap();
    assert!(lower.value <= upper.value);
}

#[test]
fn test_seeded_runs_match() {
    let params = SimulationParameters::from_years(1_000.0, 10.0, 3);
    let config = MonteCarloConfig::default().with_iterations(300).with_seed(5);
    let prices = monthly_prices(48);

    let a = run_from_prices(&prices, &params, &config).unwrap();
    let b = run_from_prices(&prices, &params, &config).unwrap();
    assert_eq!(a.distribution, b.distribution);
    assert_eq!(a.median, b.median);
}

#[test]
fn test_parameters_checked_before_data() {
    let params = SimulationParameters::new(1_000.0, 0.0, 0);
    let err = run_from_prices(
        &prices_from(&[100.0]),
        &params,
        &MonteCarloConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err, SimulationError::Parameters(ParameterError::ZeroHorizon));

    let params = SimulationParameters::new(1_000.0, 0.0, 12);
    let err = run_from_prices(
        &prices_from(&[100.0]),
        &params,
        &MonteCarloConfig::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        SimulationError::Data(DataError::InsufficientData { points: 1 })
    );
}

#[test]
fn test_horizon_limit() {
    let params = SimulationParameters::from_years(1_000.0, 0.0, 101);
    let err = run_from_prices(
        &monthly_prices(24),
        &params,
        &MonteCarloConfig::default(),
    )
    .unwrap_err();

    assert_eq!(
        err,
        SimulationError::Parameters(ParameterError::HorizonTooLong {
            horizon: 1_212,
            max: 1_200
        })
    );
}

#[test]
fn test_cancelled_run_has_no_summary() {
    let returns = ReturnSeries::from_prices(&monthly_prices(60)).unwrap();
    let params = SimulationParameters::from_years(1_000.0, 0.0, 30);
    let progress = MonteCarloProgress::new();
    let handle = progress.clone();
    handle.cancel();

    let result = run_with_progress(&returns, &params, &MonteCarloConfig::default(), &progress);
    assert_eq!(result.unwrap_err(), SimulationError::Cancelled);
    assert!(progress.completed() < progress.total());
}

#[test]
fn test_withdrawals_go_negative() {
    let params = SimulationParameters::new(1_000.0, -200.0, 24);
    let config = MonteCarloConfig::default().with_iterations(200).with_seed(1);

    let summary = run_from_prices(&prices_from(&[100.0, 100.5, 100.0]), &params, &config)
        .unwrap();

    // Growth under 1% a month cannot cover 20% monthly withdrawals
    assert!(summary.distribution.max().unwrap() < 0.0);
    assert!(summary.final_mean().unwrap() < 0.0);
}
