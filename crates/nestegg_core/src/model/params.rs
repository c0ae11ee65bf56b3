use serde::{Deserialize, Serialize};

use crate::error::ParameterError;

pub const MONTHS_PER_YEAR: u32 = 12;

/// Longest horizon accepted by default: 100 years of monthly steps
pub const DEFAULT_MAX_HORIZON: u32 = 100 * MONTHS_PER_YEAR;

/// Inputs for one simulation request.
///
/// `periodic_contribution` is added after each period's growth; a negative
/// value models a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub principal: f64,
    pub periodic_contribution: f64,
    pub horizon_periods: u32,
}

impl SimulationParameters {
    #[must_use]
    pub fn new(principal: f64, periodic_contribution: f64, horizon_periods: u32) -> Self {
        Self {
            principal,
            periodic_contribution,
            horizon_periods,
        }
    }

    /// Horizon given in whole years of monthly periods
    #[must_use]
    pub fn from_years(principal: f64, monthly_contribution: f64, years: u32) -> Self {
        Self::new(
            principal,
            monthly_contribution,
            years.saturating_mul(MONTHS_PER_YEAR),
        )
    }

    /// Reject inputs that cannot produce a meaningful run.
    pub fn validate(&self, max_horizon: u32) -> Result<(), ParameterError> {
        if !self.principal.is_finite() {
            return Err(ParameterError::NonFinite("principal"));
        }
        if !self.periodic_contribution.is_finite() {
            return Err(ParameterError::NonFinite("periodic_contribution"));
        }
        if self.principal < 0.0 {
            return Err(ParameterError::NegativePrincipal(self.principal));
        }
        if self.horizon_periods == 0 {
            return Err(ParameterError::ZeroHorizon);
        }
        if self.horizon_periods > max_horizon {
            return Err(ParameterError::HorizonTooLong {
                horizon: self.horizon_periods,
                max: max_horizon,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn horizon_years(&self) -> f64 {
        f64::from(self.horizon_periods) / f64::from(MONTHS_PER_YEAR)
    }

    #[must_use]
    pub fn is_withdrawal(&self) -> bool {
        self.periodic_contribution < 0.0
    }
}
