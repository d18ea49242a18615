//! Bot settings loading from config.toml
//!
//! This module provides functionality to load tunable bot settings from a
//! TOML configuration file: how often the background ticker sweeps active
//! vote counters and how far apart automatic tally reposts are scheduled.
//! All settings have defaults, and a missing config.toml is not an error.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Tunable bot settings, deserialized from config.toml
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Seconds between background ticker sweeps over active vote counters
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    /// Hours between automatic tally reposts in a channel
    #[serde(default = "default_repost_period_hours")]
    pub repost_period_hours: i64,
}

const fn default_tick_interval_secs() -> u64 {
    10
}

const fn default_repost_period_hours() -> i64 {
    2
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            repost_period_hours: default_repost_period_hours(),
        }
    }
}

/// Loads bot settings from a TOML file.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads bot settings from the default location (./config.toml), falling
/// back to defaults when the file does not exist.
pub fn load_default_settings() -> Result<Settings> {
    if Path::new("config.toml").exists() {
        load_settings("config.toml")
    } else {
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_settings() {
        let toml_str = r"
            tick_interval_secs = 30
            repost_period_hours = 4
        ";

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.tick_interval_secs, 30);
        assert_eq!(settings.repost_period_hours, 4);
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let toml_str = r"
            tick_interval_secs = 5
        ";

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.tick_interval_secs, 5);
        assert_eq!(settings.repost_period_hours, 2);
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.tick_interval_secs, 10);
        assert_eq!(settings.repost_period_hours, 2);
    }
}
