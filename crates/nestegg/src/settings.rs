//! User defaults read from `~/.nestegg/config.yaml`
//!
//! Every field is optional in the file; missing ones fall back to the
//! built-in defaults. Command-line flags override whatever is loaded here.

use std::fs;
use std::path::{Path, PathBuf};

use nestegg_core::config::{DEFAULT_CHUNK_SIZE, DEFAULT_ITERATIONS};
use nestegg_core::model::MONTHS_PER_YEAR;
use nestegg_core::{AggregationMode, Comparison, MonteCarloConfig};
use serde::{Deserialize, Serialize};

/// Longest horizon the front end accepts, in years
pub const DEFAULT_MAX_YEARS: u32 = 100;

pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug)]
pub enum SettingsError {
    Io(String),
    Parse(String),
    Serialize(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(msg) => write!(f, "IO error: {}", msg),
            SettingsError::Parse(msg) => write!(f, "Parse error: {}", msg),
            SettingsError::Serialize(msg) => write!(f, "Serialize error: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub iterations: usize,
    /// Fixed seed for reproducible runs (None = random each run)
    pub seed: Option<u64>,
    pub chunk_size: usize,
    pub max_years: u32,

    pub principal: f64,
    /// Monthly amount; negative values are withdrawals
    pub contribution: f64,
    pub years: u32,

    pub aggregation: AggregationMode,
    /// Tail probability, in percent, for the report's inference line
    pub probability: f64,
    pub comparison: Comparison,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            seed: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_years: DEFAULT_MAX_YEARS,
            principal: 10_000.0,
            contribution: 0.0,
            years: 30,
            aggregation: AggregationMode::Mean,
            probability: 5.0,
            comparison: Comparison::AtMost,
        }
    }
}

impl Settings {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::Io(format!("Failed to read settings: {}", e)))?;

        // An empty file is a valid "all defaults" document
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_saphyr::from_str(&content)
            .map_err(|e| SettingsError::Parse(format!("Failed to parse settings: {}", e)))
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let yaml = serde_saphyr::to_string(self)
            .map_err(|e| SettingsError::Serialize(format!("Failed to serialize settings: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SettingsError::Io(format!("Failed to create directory: {}", e)))?;
        }
        fs::write(path, yaml)
            .map_err(|e| SettingsError::Io(format!("Failed to write settings: {}", e)))
    }

    #[must_use]
    pub fn to_monte_carlo_config(&self) -> MonteCarloConfig {
        MonteCarloConfig {
            iterations: self.iterations,
            seed: self.seed,
            chunk_size: self.chunk_size,
            ..Default::default()
        }
        .with_max_horizon(self.max_years.saturating_mul(MONTHS_PER_YEAR))
    }
}

/// `~/.nestegg/`, or `./.nestegg/` when there is no home directory
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".nestegg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestegg_core::{ParameterError, ReturnSeries, SimulationError, SimulationParameters, run};

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "iterations: 2500\nseed: 7\ncomparison: at-least\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.iterations, 2_500);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.comparison, Comparison::AtLeast);
        assert_eq!(settings.years, 30);
        assert_eq!(settings.max_years, DEFAULT_MAX_YEARS);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let settings = Settings {
            principal: 250_000.0,
            contribution: -1_500.0,
            aggregation: AggregationMode::Median,
            ..Default::default()
        };

        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "iterations: [not, a, number]\n").unwrap();

        assert!(matches!(
            Settings::load(&path),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_monte_carlo_config() {
        let settings = Settings {
            iterations: 500,
            seed: Some(1),
            max_years: 40,
            ..Default::default()
        };
        let config = settings.to_monte_carlo_config();
        assert_eq!(config.iterations, 500);
        assert_eq!(config.seed, Some(1));
        assert_eq!(config.max_horizon, 480);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_max_years_caps_engine_horizon() {
        let settings = Settings {
            max_years: 40,
            iterations: 20,
            ..Default::default()
        };
        let config = settings.to_monte_carlo_config();
        let returns = ReturnSeries::from_log_returns(vec![0.01, -0.01]).unwrap();

        let ok = SimulationParameters::from_years(1_000.0, 0.0, 40);
        assert!(run(&returns, &ok, &config).is_ok());

        let too_long = SimulationParameters::from_years(1_000.0, 0.0, 41);
        assert_eq!(
            run(&returns, &too_long, &config).unwrap_err(),
            SimulationError::Parameters(ParameterError::HorizonTooLong {
                horizon: 492,
                max: 480
            })
        );
    }
}
