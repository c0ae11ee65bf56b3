//! Terminal-value distribution and the inference queries built on it
//!
//! Two index conventions are fixed, and the reconciliation check relies on
//! both of them:
//! - `AtMost` cutoff index is `floor(n * p) - 1`, `AtLeast` is `floor(n * (1 - p))`
//! - probabilities count elements `<= value`

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::model::SimulationBatch;

/// Relative gap between a requested and a recomputed probability above which
/// the recomputed one is reported instead.
pub const RECONCILE_TOLERANCE: f64 = 0.05;

/// Upper bound on histogram buckets
pub const MAX_BUCKETS: usize = 100;

/// Tukey fence multiplier for outlier trimming
const IQR_FENCE: f64 = 1.5;

/// Which tail of the distribution a query refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Comparison {
    /// P(value <= x), the lower tail
    #[default]
    AtMost,
    /// P(value > x), the upper tail
    AtLeast,
}

impl Comparison {
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::AtMost => "<",
            Self::AtLeast => ">",
        }
    }

    #[must_use]
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::AtMost => "less than",
            Self::AtLeast => "more than",
        }
    }
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Terminal values of a batch in ascending order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f64>", into = "Vec<f64>")]
pub struct SortedDistribution {
    values: Vec<f64>,
}

impl From<Vec<f64>> for SortedDistribution {
    fn from(values: Vec<f64>) -> Self {
        Self::from_values(values)
    }
}

impl From<SortedDistribution> for Vec<f64> {
    fn from(distribution: SortedDistribution) -> Self {
        distribution.values
    }
}

impl SortedDistribution {
    /// Extract each trajectory's terminal value and sort ascending.
    #[must_use]
    pub fn from_batch(batch: &SimulationBatch) -> Self {
        Self::from_values(batch.terminal_values())
    }

    #[must_use]
    pub fn from_values(mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);
        Self { values }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn min(&self) -> Option<f64> {
        self.values.first().copied()
    }

    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.values.last().copied()
    }

    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
        }
    }

    fn checked_len(&self) -> Result<usize, QueryError> {
        if self.values.is_empty() {
            Err(QueryError::EmptyDistribution)
        } else {
            Ok(self.values.len())
        }
    }

    /// Value at index `floor(n * q)`, clamped into range. `q` is a fraction.
    pub fn quantile(&self, q: f64) -> Result<f64, QueryError> {
        let n = self.checked_len()?;
        if !q.is_finite() {
            return Err(QueryError::InvalidProbability(q));
        }
        let index = (n as f64 * q).floor().clamp(0.0, (n - 1) as f64) as usize;
        Ok(self.values[index])
    }

    /// Cutoff value for a tail probability `p`, given in percent.
    pub fn value_at_percentile(&self, p: f64, comparison: Comparison) -> Result<f64, QueryError> {
        let n = self.checked_len()?;
        if !p.is_finite() {
            return Err(QueryError::InvalidProbability(p));
        }

        let fraction = p / 100.0;
        let target = match comparison {
            Comparison::AtMost => (n as f64 * fraction).floor() - 1.0,
            Comparison::AtLeast => (n as f64 * (1.0 - fraction)).floor(),
        };
        let index = target.clamp(0.0, (n - 1) as f64) as usize;

        Ok(self.values[index])
    }

    /// Tail probability, in percent rounded to two decimals, of landing on
    /// the `comparison` side of `value`.
    pub fn probability_for(&self, value: f64, comparison: Comparison) -> Result<f64, QueryError> {
        let n = self.checked_len()?;
        if value.is_nan() {
            return Err(QueryError::InvalidValue(value));
        }

        let count = self.values.partition_point(|&x| x <= value);
        let at_most = count as f64 / n as f64 * 100.0;

        Ok(round_to_cents(match comparison {
            Comparison::AtMost => at_most,
            Comparison::AtLeast => 100.0 - at_most,
        }))
    }

    /// Derive a value from a requested probability, then check it by
    /// recomputing the probability of that value.
    ///
    /// When the two differ by more than [`RECONCILE_TOLERANCE`] (relative),
    /// the recomputed probability is the one to display. This happens when
    /// the cutoff lands inside a long run of equal values.
    pub fn reconcile(&self, probability: f64, comparison: Comparison) -> Result<Inference, QueryError> {
        let value = self.value_at_percentile(probability, comparison)?;
        let recomputed = self.probability_for(value, comparison)?;
        let adjusted = exceeds_tolerance(probability, recomputed);

        Ok(Inference {
            comparison,
            value,
            requested_probability: Some(probability),
            probability: if adjusted { recomputed } else { probability },
            adjusted,
        })
    }

    /// Probability for a given value; nothing to reconcile in this direction.
    pub fn infer_from_value(&self, value: f64, comparison: Comparison) -> Result<Inference, QueryError> {
        let probability = self.probability_for(value, comparison)?;
        Ok(Inference {
            comparison,
            value,
            requested_probability: None,
            probability,
            adjusted: false,
        })
    }

    pub fn histogram(&self) -> Result<Histogram, QueryError> {
        self.histogram_with_max_buckets(MAX_BUCKETS)
    }

    /// Equal-width histogram of the values inside the IQR fences.
    ///
    /// Fences are `Q1 - 1.5 * IQR` and `Q3 + 1.5 * IQR`, with quartiles taken
    /// at `floor(n * 0.25)` and `floor(n * 0.75)`. When the kept range spans
    /// fewer whole units than `max_buckets`, the bucket count drops to that
    /// span (at least one). Each kept value lands in exactly one bucket; the
    /// maximum goes in the last bucket.
    pub fn histogram_with_max_buckets(&self, max_buckets: usize) -> Result<Histogram, QueryError> {
        let q1 = self.quantile(0.25)?;
        let q3 = self.quantile(0.75)?;
        let iqr = q3 - q1;
        let lower_fence = q1 - IQR_FENCE * iqr;
        let upper_fence = q3 + IQR_FENCE * iqr;

        let start = self.values.partition_point(|&x| x < lower_fence);
        let end = self.values.partition_point(|&x| x <= upper_fence);
        let kept = &self.values[start..end.max(start)];
        let excluded = self.values.len() - kept.len();

        let (Some(&min), Some(&max)) = (kept.first(), kept.last()) else {
            return Ok(Histogram {
                buckets: Vec::new(),
                lower_fence,
                upper_fence,
                included: 0,
                excluded,
            });
        };

        let range = max - min;
        let bucket_count = if range <= 0.0 {
            1
        } else if range.floor() < max_buckets as f64 {
            (range.floor() as usize).max(1)
        } else {
            max_buckets.max(1)
        };
        let width = range / bucket_count as f64;

        let mut counts = vec![0usize; bucket_count];
        for &v in kept {
            let index = if width > 0.0 {
                (((v - min) / width).floor() as usize).min(bucket_count - 1)
            } else {
                0
            };
            counts[index] += 1;
        }

        let total = kept.len() as f64;
        let buckets = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBucket {
                lower: min + i as f64 * width,
                upper: if i + 1 == bucket_count {
                    max
                } else {
                    min + (i + 1) as f64 * width
                },
                count,
                frequency: count as f64 / total,
            })
            .collect();

        Ok(Histogram {
            buckets,
            lower_fence,
            upper_fence,
            included: kept.len(),
            excluded,
        })
    }
}

fn exceeds_tolerance(requested: f64, recomputed: f64) -> bool {
    if requested == 0.0 {
        recomputed != 0.0
    } else {
        (requested - recomputed).abs() / requested.abs() > RECONCILE_TOLERANCE
    }
}

/// Answer to a probability/value query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Inference {
    pub comparison: Comparison,
    pub value: f64,
    /// Probability the caller asked about, if the query started from one
    pub requested_probability: Option<f64>,
    /// Probability to display, in percent
    pub probability: f64,
    /// True when the requested probability was replaced by the recomputed one
    pub adjusted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    /// Share of the kept values, in [0, 1]
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub buckets: Vec<HistogramBucket>,
    pub lower_fence: f64,
    pub upper_fence: f64,
    /// Values inside the fences
    pub included: usize,
    /// Values trimmed as outliers
    pub excluded: usize,
}

impl Histogram {
    #[must_use]
    pub fn total_frequency(&self) -> f64 {
        self.buckets.iter().map(|b| b.frequency).sum()
    }

    /// Bucket holding the most values
    #[must_use]
    pub fn mode_bucket(&self) -> Option<&HistogramBucket> {
        self.buckets.iter().max_by_key(|b| b.count)
    }
}
