mod params;
mod prices;
mod results;
mod trajectory;

pub use params::{DEFAULT_MAX_HORIZON, MONTHS_PER_YEAR, SimulationParameters};
pub use prices::{PERIODS_PER_YEAR, PricePoint, ReturnSeries, ReturnStatistics};
pub use results::{AggregatedSeries, AggregationMode, SimulationSummary};
pub use trajectory::{PeriodValue, SimulationBatch, Trajectory};
