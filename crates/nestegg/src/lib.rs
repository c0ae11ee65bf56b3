//! Command-line front end for the nestegg portfolio simulator
//!
//! Loads a price history, runs the bootstrap engine from `nestegg_core` on a
//! background worker, and renders the outcome as text or JSON.

pub mod logging;
pub mod prices;
pub mod report;
pub mod settings;
pub mod util;
pub mod worker;

pub use logging::init_logging;
pub use prices::{PriceLoadError, load_prices};
pub use report::{InferenceQuery, Report};
pub use settings::{Settings, SettingsError};
pub use worker::{SimulationRequest, SimulationResponse, SimulationWorker};
