//! Club settings: reservation hours, airfield timezone and database location.
//!
//! Values are layered with figment (defaults, then `config.toml`, then
//! `AEROCLUB_*` variables) and checked once after extraction.

use std::path::PathBuf;

use chrono_tz::Tz;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::OperatingHours;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "aeroclub";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "aeroclub.db";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "AEROCLUB_";

/// Default club timezone.
const DEFAULT_TIMEZONE: &str = "Europe/Paris";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `AEROCLUB_`, sections separated by
///    `__`, e.g. `AEROCLUB_CLUB__RESERVATION_END_HOUR=20`)
/// 2. TOML config file at `~/.config/aeroclub/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Club booking rules.
    pub club: ClubConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
}

/// Club booking rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClubConfig {
    /// First hour of the day a reservation may start in.
    pub reservation_start_hour: u32,
    /// Hour of the day by which reservations must end.
    pub reservation_end_hour: u32,
    /// IANA timezone of the airfield.
    pub timezone: String,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/aeroclub/aeroclub.db`
    pub database_path: Option<PathBuf>,
}

impl Default for ClubConfig {
    fn default() -> Self {
        let hours = OperatingHours::default();
        Self {
            reservation_start_hour: hours.start_hour,
            reservation_end_hour: hours.end_hour,
            timezone: DEFAULT_TIMEZONE.to_string(),
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
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

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
        let club = &self.club;
        for (name, hour) in [
            ("reservation_start_hour", club.reservation_start_hour),
            ("reservation_end_hour", club.reservation_end_hour),
        ] {
            if hour > 23 {
                return Err(Error::ConfigValidation {
                    message: format!("{name} must be between 0 and 23, got {hour}"),
                });
            }
        }

        if club.reservation_start_hour >= club.reservation_end_hour {
            return Err(Error::ConfigValidation {
                message: format!(
                    "reservation_start_hour ({}) must be before reservation_end_hour ({})",
                    club.reservation_start_hour, club.reservation_end_hour
                ),
            });
        }

        self.timezone()?;
        Ok(())
    }

    /// The club operating hours.
    #[must_use]
    pub fn operating_hours(&self) -> OperatingHours {
        OperatingHours::new(
            self.club.reservation_start_hour,
            self.club.reservation_end_hour,
        )
    }

    /// The club timezone.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured name is not a known IANA timezone.
    pub fn timezone(&self) -> Result<Tz> {
        self.club
            .timezone
            .parse::<Tz>()
            .map_err(|_| Error::ConfigValidation {
                message: format!("unknown timezone: {}", self.club.timezone),
            })
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}
