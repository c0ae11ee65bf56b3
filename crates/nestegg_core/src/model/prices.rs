//! Historical prices and the log-return series sampled by the simulator

use jiff::civil::Date;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Months per year, used to annualize monthly statistics
pub const PERIODS_PER_YEAR: f64 = 12.0;

/// One historical observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: Date,
    pub price: f64,
}

impl PricePoint {
    #[must_use]
    pub fn new(timestamp: Date, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Log returns between consecutive price points.
///
/// Element `i` is `ln(price[i + 1] / price[i])`. A series is never empty, so
/// sampling always yields a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ReturnSeries {
    returns: Vec<f64>,
}

impl TryFrom<Vec<f64>> for ReturnSeries {
    type Error = DataError;

    fn try_from(returns: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_log_returns(returns)
    }
}

impl From<ReturnSeries> for Vec<f64> {
    fn from(series: ReturnSeries) -> Self {
        series.returns
    }
}

impl ReturnSeries {
    /// Derive the return series from an ordered price history.
    ///
    /// Fails if there are fewer than two points, any price is not strictly
    /// positive, or timestamps are not strictly increasing.
    pub fn from_prices(prices: &[PricePoint]) -> Result<Self, DataError> {
        if prices.len() < 2 {
            return Err(DataError::InsufficientData {
                points: prices.len(),
            });
        }

        for (index, point) in prices.iter().enumerate() {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(DataError::NonPositivePrice {
                    index,
                    price: point.price,
                });
            }
        }

        if let Some(index) = prices
            .windows(2)
            .position(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(DataError::NonIncreasingTimestamp { index: index + 1 });
        }

        let returns = prices
            .windows(2)
            .map(|pair| (pair[1].price / pair[0].price).ln())
            .collect();

        Ok(Self { returns })
    }

    /// Build a series from log returns that were computed elsewhere.
    pub fn from_log_returns(returns: impl Into<Vec<f64>>) -> Result<Self, DataError> {
        let returns = returns.into();
        if returns.is_empty() {
            return Err(DataError::EmptyReturns);
        }
        if let Some(index) = returns.iter().position(|r| !r.is_finite()) {
            return Err(DataError::NonFiniteReturn { index });
        }
        Ok(Self { returns })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    /// Always false for a constructed series; kept for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.returns
    }

    /// Draw one log return uniformly, with replacement.
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.returns[rng.random_range(0..self.returns.len())]
    }

    /// Descriptive statistics of the monthly simple returns.
    #[must_use]
    pub fn statistics(&self) -> ReturnStatistics {
        let n = self.returns.len() as f64;
        let simple: Vec<f64> = self.returns.iter().map(|r| r.exp_m1()).collect();

        let arithmetic_mean = simple.iter().sum::<f64>() / n;
        // exp(mean log return) - 1 is the per-period compound growth rate
        let geometric_mean = (self.returns.iter().sum::<f64>() / n).exp_m1();

        let variance = simple
            .iter()
            .map(|r| (r - arithmetic_mean).powi(2))
            .sum::<f64>()
            / n;

        let min = simple.iter().copied().fold(f64::INFINITY, f64::min);
        let max = simple.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        ReturnStatistics {
            arithmetic_mean,
            geometric_mean,
            std_dev: variance.sqrt(),
            min,
            max,
            periods: self.returns.len(),
        }
    }
}

/// Summary of a return series, expressed as monthly simple returns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatistics {
    pub arithmetic_mean: f64,
    pub geometric_mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub periods: usize,
}

impl ReturnStatistics {
    /// Compound annual growth rate implied by the geometric mean
    #[must_use]
    pub fn annualized_growth(&self) -> f64 {
        (1.0 + self.geometric_mean).powf(PERIODS_PER_YEAR) - 1.0
    }

    /// Annual volatility under the square-root-of-time rule
    #[must_use]
    pub fn annualized_volatility(&self) -> f64 {
        self.std_dev * PERIODS_PER_YEAR.sqrt()
    }

    /// Years of history covered by the sample
    #[must_use]
    pub fn years(&self) -> f64 {
        self.periods as f64 / PERIODS_PER_YEAR
    }
}
