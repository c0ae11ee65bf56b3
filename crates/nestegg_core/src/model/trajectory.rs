//! Simulated portfolio paths and the batch that holds them

use serde::{Deserialize, Serialize};

use crate::error::BatchError;

/// Portfolio value at the end of a period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodValue {
    pub period_index: u32,
    pub value: f64,
}

/// One simulated path. Period indices run 0..=horizon with no gaps, and
/// period 0 holds the starting principal.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    points: Vec<PeriodValue>,
}

impl Trajectory {
    pub(crate) fn with_principal(principal: f64, horizon_periods: u32) -> Self {
        let mut points = Vec::with_capacity(horizon_periods as usize + 1);
        points.push(PeriodValue {
            period_index: 0,
            value: principal,
        });
        Self { points }
    }

    pub(crate) fn push(&mut self, value: f64) {
        let period_index = self.points.len() as u32;
        self.points.push(PeriodValue {
            period_index,
            value,
        });
    }

    /// Build a trajectory from per-period values, starting at period 0.
    /// Returns `None` for an empty input.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let points: Vec<PeriodValue> = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| PeriodValue {
                period_index: i as u32,
                value,
            })
            .collect();
        (!points.is_empty()).then_some(Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[PeriodValue] {
        &self.points
    }

    /// Number of points, i.e. horizon + 1
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn horizon_periods(&self) -> u32 {
        (self.points.len() - 1) as u32
    }

    #[must_use]
    pub fn initial_value(&self) -> f64 {
        self.points[0].value
    }

    #[must_use]
    pub fn terminal_value(&self) -> f64 {
        self.points[self.points.len() - 1].value
    }

    #[must_use]
    pub fn value_at(&self, period: u32) -> Option<f64> {
        self.points.get(period as usize).map(|p| p.value)
    }
}

/// A full set of independent trajectories sharing one horizon
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationBatch {
    trajectories: Vec<Trajectory>,
}

impl SimulationBatch {
    /// Assemble a batch, checking that every path has the same length.
    pub fn from_trajectories(trajectories: Vec<Trajectory>) -> Result<Self, BatchError> {
        let expected = trajectories.first().ok_or(BatchError::Empty)?.len();

        if let Some((index, t)) = trajectories
            .iter()
            .enumerate()
            .find(|(_, t)| t.len() != expected)
        {
            return Err(BatchError::Misaligned {
                index,
                expected,
                found: t.len(),
            });
        }

        Ok(Self { trajectories })
    }

    /// Number of trajectories
    #[must_use]
    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    #[must_use]
    pub fn horizon_periods(&self) -> u32 {
        self.trajectories[0].horizon_periods()
    }

    #[must_use]
    pub fn trajectories(&self) -> &[Trajectory] {
        &self.trajectories
    }

    /// Cross-sectional values at `period`, one per trajectory
    pub fn period_values(&self, period: u32) -> impl Iterator<Item = f64> + '_ {
        let idx = period as usize;
        self.trajectories.iter().map(move |t| t.points[idx].value)
    }

    #[must_use]
    pub fn terminal_values(&self) -> Vec<f64> {
        self.trajectories.iter().map(Trajectory::terminal_value).collect()
    }
}
