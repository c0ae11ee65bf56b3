//! Products retained after a batch has been reduced
//!
//! The batch itself is dropped once these are built; only the aggregated
//! series and the sorted terminal distribution survive a run.

use serde::{Deserialize, Serialize};

use super::params::{MONTHS_PER_YEAR, SimulationParameters};
use super::trajectory::PeriodValue;
use crate::distribution::SortedDistribution;

/// How a batch is collapsed into a single representative path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    #[default]
    Mean,
    /// Upper-middle element for even batch sizes, no interpolation
    Median,
}

impl AggregationMode {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mean => "Average",
            Self::Median => "Median",
        }
    }
}

/// One value per period, reduced across all trajectories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSeries {
    pub mode: AggregationMode,
    pub points: Vec<PeriodValue>,
}

impl AggregatedSeries {
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn final_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }

    /// Points that fall on whole years, as `(year, value)`
    #[must_use]
    pub fn yearly(&self) -> Vec<(u32, f64)> {
        self.points
            .iter()
            .filter(|p| p.period_index % MONTHS_PER_YEAR == 0)
            .map(|p| (p.period_index / MONTHS_PER_YEAR, p.value))
            .collect()
    }
}

/// Everything kept from one completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub parameters: SimulationParameters,
    pub iterations: usize,
    pub mean: AggregatedSeries,
    pub median: AggregatedSeries,
    pub distribution: SortedDistribution,
}

impl SimulationSummary {
    #[must_use]
    pub fn series(&self, mode: AggregationMode) -> &AggregatedSeries {
        match mode {
            AggregationMode::Mean => &self.mean,
            AggregationMode::Median => &self.median,
        }
    }

    #[must_use]
    pub fn final_mean(&self) -> Option<f64> {
        self.mean.final_value()
    }

    #[must_use]
    pub fn final_median(&self) -> Option<f64> {
        self.median.final_value()
    }
}
