//! Runner configuration, loaded from TOML.
//!
//! ```toml
//! [data]
//! provider = "csv"
//! csv_dir = "data"
//!
//! [monte_carlo]
//! seed = 42
//! default_num_simulations = 1000
//! calibration_years = 5
//! min_calibration_points = 10
//! preview_len = 100
//! threads = 4
//!
//! [strategies]
//! path = "strategies.json"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use backcast_core::stats::DEFAULT_PREVIEW_LEN;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("parse config TOML: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which price provider the runner builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub provider: ProviderKind,
    /// Directory of `{TICKER}.csv` files for the CSV provider.
    pub csv_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Yahoo,
            csv_dir: PathBuf::from("data"),
        }
    }
}

/// Floor on the calibration history length.
pub const MIN_CALIBRATION_POINTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Master seed for per-trial RNG derivation.
    pub seed: u64,
    pub default_num_simulations: usize,
    /// Length of the trailing calibration window, in years.
    pub calibration_years: u32,
    /// Fewest historical prices a calibration accepts. May be raised, never
    /// lowered below [`MIN_CALIBRATION_POINTS`].
    pub min_calibration_points: usize,
    pub preview_len: usize,
    /// Worker threads; `None` uses the global rayon pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            default_num_simulations: 1000,
            calibration_years: 5,
            min_calibration_points: MIN_CALIBRATION_POINTS,
            preview_len: DEFAULT_PREVIEW_LEN,
            threads: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategiesConfig {
    /// JSON array of stored strategies.
    pub path: PathBuf,
}

impl Default for StrategiesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("strategies.json"),
        }
    }
}

/// Complete runner configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackcastConfig {
    pub data: DataConfig,
    pub monte_carlo: MonteCarloConfig,
    pub strategies: StrategiesConfig,
}

impl BackcastConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string. Missing sections take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mc = &self.monte_carlo;
        if !(1..=crate::request::MAX_SIMULATIONS).contains(&mc.default_num_simulations) {
            return Err(ConfigError::Invalid(format!(
                "default_num_simulations must be between 1 and {}",
                crate::request::MAX_SIMULATIONS
            )));
        }
        if mc.calibration_years == 0 {
            return Err(ConfigError::Invalid("calibration_years must be at least 1".into()));
        }
        if mc.min_calibration_points < MIN_CALIBRATION_POINTS {
            return Err(ConfigError::Invalid(format!(
                "min_calibration_points must be at least {MIN_CALIBRATION_POINTS}"
            )));
        }
        if mc.threads == Some(0) {
            return Err(ConfigError::Invalid("threads must be at least 1".into()));
        }
        Ok(())
    }
}
