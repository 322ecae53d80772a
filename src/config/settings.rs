//! Application settings loaded from `buildingwise.toml`
//!
//! The file is optional. It controls where the database lives, how report dates
//! are localized, where exports are written, and which buildings are seeded on
//! first run. Seeded buildings are only created when no building with the same
//! name exists yet.

use crate::errors::{Error, Result};
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `BUILDINGWISE_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "buildingwise.toml";

/// Indian Standard Time, UTC+05:30.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

/// Configuration structure representing the entire config file
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Database URL; `DATABASE_URL` in the environment takes precedence
    #[serde(default)]
    pub database_url: Option<String>,
    /// Report localization and export settings
    #[serde(default)]
    pub report: ReportSettings,
    /// Buildings to create on first run
    #[serde(default)]
    pub buildings: Vec<BuildingSeed>,
}

/// Report localization and export location
#[derive(Debug, Deserialize)]
pub struct ReportSettings {
    /// Offset from UTC, in minutes, used for month labels and printed dates
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    /// Directory spreadsheet exports are written to
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            export_dir: default_export_dir(),
        }
    }
}

impl ReportSettings {
    /// Returns the configured offset as a `chrono` time zone.
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| Error::Config {
                message: format!(
                    "utc_offset_minutes out of range: {}",
                    self.utc_offset_minutes
                ),
            })
    }
}

/// A building created on first run
#[derive(Debug, Deserialize, Clone)]
pub struct BuildingSeed {
    /// Building name, used to detect whether it already exists
    pub name: String,
    /// Postal address
    #[serde(default)]
    pub address: String,
    /// Carry-in balance
    #[serde(default)]
    pub opening_balance: f64,
}

const fn default_utc_offset_minutes() -> i32 {
    DEFAULT_UTC_OFFSET_MINUTES
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Settings {
    /// Resolves the database URL: environment first, then the config file, then the default.
    #[must_use]
    pub fn database_url(&self) -> String {
        std::env::var("DATABASE_URL")
            .ok()
            .or_else(|| self.database_url.clone())
            .unwrap_or_else(|| super::database::DEFAULT_DATABASE_URL.to_string())
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads settings from `BUILDINGWISE_CONFIG` or `./buildingwise.toml`.
///
/// A missing file is not an error: defaults are used instead.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("BUILDINGWISE_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if !path.exists() {
        tracing::info!(
            "No config file at {}, using default settings",
            path.display()
        );
        return Ok(Settings::default());
    }

    load_settings(&path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            database_url = "sqlite://society.sqlite?mode=rwc"

            [report]
            utc_offset_minutes = 0
            export_dir = "exports"

            [[buildings]]
            name = "Shanti Apartments"
            address = "12 MG Road"
            opening_balance = 15000.0

            [[buildings]]
            name = "Tower B"
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(
            settings.database_url.as_deref(),
            Some("sqlite://society.sqlite?mode=rwc")
        );
        assert_eq!(settings.report.utc_offset_minutes, 0);
        assert_eq!(settings.report.export_dir, PathBuf::from("exports"));
        assert_eq!(settings.buildings.len(), 2);
        assert_eq!(settings.buildings[0].opening_balance, 15000.0);
        assert_eq!(settings.buildings[1].address, "");
        assert_eq!(settings.buildings[1].opening_balance, 0.0);
    }

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert!(settings.database_url.is_none());
        assert_eq!(settings.report.utc_offset_minutes, 330);
        assert_eq!(settings.report.export_dir, PathBuf::from("."));
        assert!(settings.buildings.is_empty());
    }

    #[test]
    fn test_utc_offset_conversion() {
        let report = ReportSettings::default();
        assert_eq!(report.utc_offset().unwrap().local_minus_utc(), 330 * 60);

        let bad = ReportSettings {
            utc_offset_minutes: 24 * 60,
            export_dir: default_export_dir(),
        };
        assert!(matches!(bad.utc_offset(), Err(Error::Config { .. })));

        for minutes in [i32::MAX, i32::MIN, 35_791_395] {
            let huge = ReportSettings {
                utc_offset_minutes: minutes,
                export_dir: default_export_dir(),
            };
            assert!(matches!(huge.utc_offset(), Err(Error::Config { .. })));
        }
    }

    #[test]
    fn test_load_settings_missing_file() {
        let result = load_settings("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
