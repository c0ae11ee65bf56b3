use std::time::Instant;

use rand::rngs::{SmallRng, StdRng};
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

use crate::aggregate::{mean_series, median_series};
use crate::config::MonteCarloConfig;
use crate::distribution::SortedDistribution;
use crate::error::SimulationError;
use crate::model::{
    PricePoint, ReturnSeries, SimulationBatch, SimulationParameters, SimulationSummary, Trajectory,
};
use crate::progress::MonteCarloProgress;

/// Simulate one portfolio path.
///
/// Each period draws a log return with replacement, compounds the running
/// value by `exp(return)`, then adds the periodic contribution. Values are
/// not clamped; withdrawals can drive a path below zero.
pub fn simulate_path<R: Rng + ?Sized>(
    returns: &ReturnSeries,
    params: &SimulationParameters,
    rng: &mut R,
) -> Trajectory {
    let mut trajectory = Trajectory::with_principal(params.principal, params.horizon_periods);
    let mut value = params.principal;

    for _ in 0..params.horizon_periods {
        let multiplier = returns.sample(rng).exp();
        value = value * multiplier + params.periodic_contribution;
        trajectory.push(value);
    }

    trajectory
}

/// Derive one seed per work unit from the run seed, so a seeded batch is
/// reproducible no matter how chunks are scheduled across threads.
fn chunk_seeds(base_seed: u64, num_chunks: usize) -> Vec<u64> {
    let mut seeder = StdRng::seed_from_u64(base_seed);
    (0..num_chunks).map(|_| seeder.random::<u64>()).collect()
}

pub fn monte_carlo_simulate(
    returns: &ReturnSeries,
    params: &SimulationParameters,
    config: &MonteCarloConfig,
) -> Result<SimulationBatch, SimulationError> {
    monte_carlo_simulate_with_progress(returns, params, config, &MonteCarloProgress::default())
}

/// Run `config.iterations` independent paths and collect them into a batch.
///
/// Inputs are validated before any path is simulated. The cancel flag on
/// `progress` is polled between paths; a cancelled run discards everything
/// and returns `SimulationError::Cancelled`.
pub fn monte_carlo_simulate_with_progress(
    returns: &ReturnSeries,
    params: &SimulationParameters,
    config: &MonteCarloConfig,
    progress: &MonteCarloProgress,
) -> Result<SimulationBatch, SimulationError> {
    config.validate()?;
    params.validate(config.max_horizon)?;

    let base_seed = config.seed.unwrap_or_else(|| rand::rng().random::<u64>());
    let seeds = chunk_seeds(base_seed, config.num_chunks());
    progress.reset(config.iterations);

    tracing::debug!(
        iterations = config.iterations,
        horizon = params.horizon_periods,
        chunks = seeds.len(),
        seed = ?config.seed,
        "Starting Monte Carlo batch"
    );
    let started = Instant::now();

    let run_chunk = |(index, seed): (usize, &u64)| -> Result<Vec<Trajectory>, SimulationError> {
        let mut rng = SmallRng::seed_from_u64(*seed);
        let len = config.chunk_len(index);
        let mut paths = Vec::with_capacity(len);

        for _ in 0..len {
            if progress.is_cancelled() {
                return Err(SimulationError::Cancelled);
            }
            paths.push(simulate_path(returns, params, &mut rng));
            progress.increment();
        }

        Ok(paths)
    };

    #[cfg(feature = "parallel")]
    let chunks: Result<Vec<Vec<Trajectory>>, SimulationError> =
        seeds.par_iter().enumerate().map(run_chunk).collect();
    #[cfg(not(feature = "parallel"))]
    let chunks: Result<Vec<Vec<Trajectory>>, SimulationError> =
        seeds.iter().enumerate().map(run_chunk).collect();

    let chunks = match chunks {
        Ok(chunks) => chunks,
        Err(SimulationError::Cancelled) => {
            tracing::warn!(
                completed = progress.completed(),
                total = config.iterations,
                "Monte Carlo batch cancelled"
            );
            return Err(SimulationError::Cancelled);
        }
        Err(e) => return Err(e),
    };

    let batch = SimulationBatch::from_trajectories(chunks.into_iter().flatten().collect())?;

    tracing::info!(
        iterations = batch.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Monte Carlo batch complete"
    );

    Ok(batch)
}

/// Reduce a batch to the products kept after a run.
#[must_use]
pub fn summarize(params: &SimulationParameters, batch: &SimulationBatch) -> SimulationSummary {
    SimulationSummary {
        parameters: *params,
        iterations: batch.len(),
        mean: mean_series(batch),
        median: median_series(batch),
        distribution: SortedDistribution::from_batch(batch),
    }
}

pub fn run(
    returns: &ReturnSeries,
    params: &SimulationParameters,
    config: &MonteCarloConfig,
) -> Result<SimulationSummary, SimulationError> {
    run_with_progress(returns, params, config, &MonteCarloProgress::default())
}

/// Simulate, aggregate and analyze in one call. The batch is dropped before
/// returning so only the summary stays in memory.
pub fn run_with_progress(
    returns: &ReturnSeries,
    params: &SimulationParameters,
    config: &MonteCarloConfig,
    progress: &MonteCarloProgress,
) -> Result<SimulationSummary, SimulationError> {
    let batch = monte_carlo_simulate_with_progress(returns, params, config, progress)?;
    Ok(summarize(params, &batch))
}

/// Full pipeline starting from raw prices.
pub fn run_from_prices(
    prices: &[PricePoint],
    params: &SimulationParameters,
    config: &MonteCarloConfig,
) -> Result<SimulationSummary, SimulationError> {
    // Checked here too so parameter errors are reported ahead of data errors
    config.validate()?;
    params.validate(config.max_horizon)?;
    let returns = ReturnSeries::from_prices(prices)?;
    run(&returns, params, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParameterError;

    fn returns() -> ReturnSeries {
        ReturnSeries::from_log_returns(vec![1.10f64.ln(), 0.9f64.ln()]).unwrap()
    }

    #[test]
    fn test_path_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let params = SimulationParameters::new(1_234.5, 10.0, 24);
        let path = simulate_path(&returns(), &params, &mut rng);

        assert_eq!(path.len(), 25);
        assert_eq!(path.initial_value(), 1_234.5);
        for (i, p) in path.points().iter().enumerate() {
            assert_eq!(p.period_index as usize, i);
        }
    }

    #[test]
    fn test_single_step_outcomes() {
        let params = SimulationParameters::new(1_000.0, 0.0, 1);
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..50 {
            let v = simulate_path(&returns(), &params, &mut rng).terminal_value();
            assert!(
                (v - 1_100.0).abs() < 1e-9 || (v - 900.0).abs() < 1e-9,
                "unexpected value {v}"
            );
        }
    }

    #[test]
    fn test_contribution_applied_after_growth() {
        let flat = ReturnSeries::from_log_returns(vec![0.0]).unwrap();
        let params = SimulationParameters::new(100.0, -40.0, 3);
        let mut rng = StdRng::seed_from_u64(0);

        let path = simulate_path(&flat, &params, &mut rng);
        let values: Vec<f64> = path.points().iter().map(|p| p.value).collect();

        // Goes negative without clamping
        assert_eq!(values, vec![100.0, 60.0, 20.0, -20.0]);
    }

    #[test]
    fn test_path_reproducible_with_same_draws() {
        let params = SimulationParameters::new(500.0, 25.0, 120);
        let a = simulate_path(&returns(), &params, &mut StdRng::seed_from_u64(5));
        let b = simulate_path(&returns(), &params, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_batch_size_exact() {
        let params = SimulationParameters::new(1_000.0, 0.0, 12);
        let config = MonteCarloConfig::default().with_iterations(257).with_seed(3);

        let batch = monte_carlo_simulate(&returns(), &params, &config).unwrap();
        assert_eq!(batch.len(), 257);
        assert!(batch.trajectories().iter().all(|t| t.len() == 13));
    }

    #[test]
    fn test_seeded_batch_reproducible() {
        let params = SimulationParameters::new(1_000.0, 50.0, 60);
        let config = MonteCarloConfig::default().with_iterations(500).with_seed(42);

        let a = monte_carlo_simulate(&returns(), &params, &config).unwrap();
        let b = monte_carlo_simulate(&returns(), &params, &config).unwrap();
        assert_eq!(a.terminal_values(), b.terminal_values());
    }

    #[test]
    fn test_chunks_use_distinct_streams() {
        let seeds = chunk_seeds(42, 10);
        let mut unique = seeds.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), seeds.len());
    }

    #[test]
    fn test_invalid_parameters_rejected_before_work() {
        let params = SimulationParameters::new(1_000.0, 0.0, 0);
        let progress = MonteCarloProgress::new();

        let err = monte_carlo_simulate_with_progress(
            &returns(),
            &params,
            &MonteCarloConfig::default(),
            &progress,
        )
        .unwrap_err();

        assert_eq!(err, SimulationError::Parameters(ParameterError::ZeroHorizon));
        assert_eq!(progress.completed(), 0);
        assert_eq!(progress.total(), 0);
    }

    #[test]
    fn test_cancelled_run_returns_no_batch() {
        let params = SimulationParameters::new(1_000.0, 0.0, 12);
        let progress = MonteCarloProgress::new();
        progress.cancel();

        let err = monte_carlo_simulate_with_progress(
            &returns(),
            &params,
            &MonteCarloConfig::default(),
            &progress,
        )
        .unwrap_err();

        assert_eq!(err, SimulationError::Cancelled);
    }

    #[test]
    fn test_progress_reaches_total() {
        let params = SimulationParameters::new(1_000.0, 0.0, 12);
        let config = MonteCarloConfig::default().with_iterations(321);
        let progress = MonteCarloProgress::new();

        monte_carlo_simulate_with_progress(&returns(), &params, &config, &progress).unwrap();
        assert_eq!(progress.completed(), 321);
        assert_eq!(progress.total(), 321);
    }
}
