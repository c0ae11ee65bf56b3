//! Integration tests for the nestegg engine
//!
//! Tests are organized by topic:
//! - `returns` - Price history to log-return conversion
//! - `simulation` - Path generation and batch properties
//! - `inference` - Terminal distribution queries and histogram
//! - `pipeline` - End-to-end runs from prices, cancellation and errors

mod pipeline;

use jiff::civil::{Date, date};

use crate::model::PricePoint;

/// First of the month, `index` months after January 2000
fn month(index: usize) -> Date {
    date(2000 + (index / 12) as i16, (index % 12 + 1) as i8, 1)
}

/// Monthly price history with a spread of distinct returns
pub(crate) fn monthly_prices(count: usize) -> Vec<PricePoint> {
    let mut price = 100.0;
    (0..count)
        .map(|i| {
            if i > 0 {
                // Cycles through 17 distinct returns between roughly -6% and +6%
                let step = ((i * 7) % 17) as f64 - 8.0;
                price *= (step * 0.0075_f64).exp();
            }
            PricePoint::new(month(i), price)
        })
        .collect()
}

pub(crate) fn prices_from(values: &[f64]) -> Vec<PricePoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, &p)| PricePoint::new(month(i), p))
        .collect()
}
