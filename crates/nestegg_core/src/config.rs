//! Run configuration for a Monte Carlo batch

use serde::{Deserialize, Serialize};

use crate::error::ParameterError;
use crate::model::DEFAULT_MAX_HORIZON;

pub const DEFAULT_ITERATIONS: usize = 10_000;

/// Paths simulated per seeded RNG stream
pub const DEFAULT_CHUNK_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Number of trajectories in the batch
    pub iterations: usize,
    /// Seed for reproducible batches (None = fresh entropy each run)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Trajectories per parallel work unit; each unit owns one RNG stream
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Longest accepted horizon, in periods
    #[serde(default = "default_max_horizon")]
    pub max_horizon: u32,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_max_horizon() -> u32 {
    DEFAULT_MAX_HORIZON
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            seed: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_horizon: DEFAULT_MAX_HORIZON,
        }
    }
}

impl MonteCarloConfig {
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_max_horizon(mut self, max_horizon: u32) -> Self {
        self.max_horizon = max_horizon;
        self
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.iterations == 0 {
            return Err(ParameterError::ZeroIterations);
        }
        if self.chunk_size == 0 {
            return Err(ParameterError::ZeroChunkSize);
        }
        Ok(())
    }

    /// Number of seeded work units needed to cover all iterations
    #[must_use]
    pub fn num_chunks(&self) -> usize {
        self.iterations.div_ceil(self.chunk_size)
    }

    /// Size of chunk `index`; the last chunk takes the remainder
    #[must_use]
    pub fn chunk_len(&self, index: usize) -> usize {
        let start = index * self.chunk_size;
        self.chunk_size.min(self.iterations.saturating_sub(start))
    }
}
