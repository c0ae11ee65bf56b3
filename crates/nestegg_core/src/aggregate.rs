//! Per-period reduction of a batch into one representative path
//!
//! The median uses a selection pass per period rather than a full sort. It
//! picks the element a full ascending sort would place at index `n / 2`, which
//! for even `n` is the upper of the two middle values. There is no averaging
//! of the middle pair.

use crate::model::{AggregatedSeries, AggregationMode, PeriodValue, SimulationBatch};

#[must_use]
pub fn aggregate(batch: &SimulationBatch, mode: AggregationMode) -> AggregatedSeries {
    match mode {
        AggregationMode::Mean => mean_series(batch),
        AggregationMode::Median => median_series(batch),
    }
}

/// Arithmetic mean of every period across all trajectories
#[must_use]
pub fn mean_series(batch: &SimulationBatch) -> AggregatedSeries {
    let n = batch.len() as f64;
    let points = (0..=batch.horizon_periods())
        .map(|period| PeriodValue {
            period_index: period,
            value: batch.period_values(period).sum::<f64>() / n,
        })
        .collect();

    AggregatedSeries {
        mode: AggregationMode::Mean,
        points,
    }
}

/// Median of every period across all trajectories
#[must_use]
pub fn median_series(batch: &SimulationBatch) -> AggregatedSeries {
    let mut scratch = Vec::with_capacity(batch.len());
    let points = (0..=batch.horizon_periods())
        .map(|period| {
            scratch.clear();
            scratch.extend(batch.period_values(period));
            PeriodValue {
                period_index: period,
                // Batches are never empty
                value: upper_median(&mut scratch).unwrap_or(f64::NAN),
            }
        })
        .collect();

    AggregatedSeries {
        mode: AggregationMode::Median,
        points,
    }
}

/// Element at index `len / 2` of the ascending order. Reorders `values`.
pub fn upper_median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mid = values.len() / 2;
    let (_, median, _) = values.select_nth_unstable_by(mid, f64::total_cmp);
    Some(*median)
}
