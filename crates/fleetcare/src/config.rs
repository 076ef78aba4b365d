//! Configuration management for fleetcare.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::evaluator::{
    Evaluator, ProgressMode, DEFAULT_DUE_SOON_DAYS, DEFAULT_DUE_SOON_DISTANCE_KM,
    DEFAULT_SERVICE_INTERVAL_KM,
};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "fleetcare";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "fleet.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLEETCARE_`, sections separated
///    by `__`, e.g. `FLEETCARE_MAINTENANCE__DUE_SOON_DAYS=14`)
/// 2. TOML config file at `~/.config/fleetcare/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Due-date and progress thresholds.
    pub maintenance: MaintenanceConfig,
    /// Output formatting.
    pub display: DisplayConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/fleetcare/fleet.db`
    pub database_path: Option<PathBuf>,
}

/// Maintenance evaluation thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// A service is due soon this many days before its due date.
    pub due_soon_days: u32,
    /// A service is due soon when this many km or fewer remain.
    pub due_soon_distance_km: u32,
    /// Assumed length of one maintenance interval in km.
    pub service_interval_km: u32,
    /// Formula used for the progress percentage.
    pub progress_mode: ProgressMode,
}

/// Display-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// `strftime` pattern for dates in plain and table output.
    pub date_format: String,
    /// Prefix for money amounts.
    pub currency_symbol: String,
    /// Suffix for distances.
    pub distance_unit: String,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
            due_soon_distance_km: DEFAULT_DUE_SOON_DISTANCE_KM,
            service_interval_km: DEFAULT_SERVICE_INTERVAL_KM,
            progress_mode: ProgressMode::Window,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: "%b %d, %Y".to_string(),
            currency_symbol: "$".to_string(),
            distance_unit: "km".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("FLEETCARE_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.maintenance.service_interval_km == 0 {
            return Err(Error::ConfigValidation {
                message: "service_interval_km must be greater than 0".to_string(),
            });
        }

        if self.maintenance.due_soon_distance_km >= self.maintenance.service_interval_km {
            return Err(Error::ConfigValidation {
                message: format!(
                    "due_soon_distance_km ({}) must be smaller than service_interval_km ({})",
                    self.maintenance.due_soon_distance_km, self.maintenance.service_interval_km
                ),
            });
        }

        if self.display.date_format.is_empty()
            || StrftimeItems::new(&self.display.date_format).any(|item| item == Item::Error)
            || !renders_dates(&self.display.date_format)
        {
            return Err(Error::ConfigValidation {
                message: format!("invalid date_format: {:?}", self.display.date_format),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Build the evaluator described by the maintenance section.
    #[must_use]
    pub fn evaluator(&self) -> Evaluator {
        Evaluator::new(&self.maintenance)
    }
}

/// Whether `format` can render a calendar date. Time and zone specifiers
/// parse fine but fail once applied to a date.
fn renders_dates(format: &str) -> bool {
    let mut rendered = String::new();
    write!(rendered, "{}", NaiveDate::MIN.format(format)).is_ok()
}
