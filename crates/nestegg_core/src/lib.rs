//! Bootstrap Monte Carlo engine for portfolio projections
//!
//! Historical prices become a series of monthly log returns. Each simulated
//! path starts from a principal and, every period, compounds by one return
//! drawn with replacement from that series before adding a fixed
//! contribution (negative for withdrawals). A batch of independent paths is
//! then reduced to:
//! - mean and median value per period
//! - the sorted distribution of terminal values
//! - tail-probability queries and an outlier-trimmed histogram over it
//!
//! ```ignore
//! use nestegg_core::{MonteCarloConfig, SimulationParameters, run_from_prices};
//!
//! let params = SimulationParameters::from_years(10_000.0, 500.0, 30);
//! let config = MonteCarloConfig::default().with_seed(42);
//! let summary = run_from_prices(&prices, &params, &config)?;
//!
//! let p5 = summary.distribution.reconcile(5.0, Comparison::AtMost)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Engine modules
// ============================================================================

pub mod aggregate;
pub mod distribution;
pub mod error;
pub mod progress;
pub mod simulation;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::MonteCarloConfig;
pub use distribution::{Comparison, Histogram, HistogramBucket, Inference, SortedDistribution};
pub use error::{BatchError, DataError, ParameterError, QueryError, SimulationError};
pub use model::{
    AggregatedSeries, AggregationMode, PeriodValue, PricePoint, ReturnSeries,
    SimulationBatch, SimulationParameters, SimulationSummary, Trajectory,
};
pub use progress::MonteCarloProgress;
pub use simulation::{monte_carlo_simulate, run, run_from_prices, run_with_progress};
