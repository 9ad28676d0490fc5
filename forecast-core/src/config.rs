use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::{ForecastError, model::Site};

pub const DEFAULT_API_BASE_URL: &str = "https://api.weather.gov";
pub const DEFAULT_USER_AGENT: &str = "LakePlacid Forecast Tool (contact: ops@example.com)";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// timezone = "America/New_York"
///
/// [[sites]]
/// name = "DHI – Mt. Whiteface Base"
/// code = "DHI"
/// latitude = 44.35
/// longitude = -73.86
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sent as `User-Agent`; NWS asks for a contact address in it.
    pub user_agent: String,

    /// IANA zone the tables are rendered in.
    pub timezone: String,

    pub api_base_url: String,
    pub http_timeout_secs: u64,

    /// Observations older than this are treated as missing.
    pub observation_lookback_hours: i64,

    /// Where run folders are created. Defaults to `./Forecasts`.
    pub output_dir: Option<PathBuf>,

    pub report_title: String,
    pub file_prefix: String,

    pub sites: Vec<Site>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timezone: "America/New_York".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout_secs: 30,
            observation_lookback_hours: 3,
            output_dir: None,
            report_title: "Lake Placid Area".to_string(),
            file_prefix: "Lake_Placid_Forecast".to_string(),
            sites: vec![
                Site {
                    name: "DHI – Mt. Whiteface Base".to_string(),
                    code: "DHI".to_string(),
                    latitude: 44.35,
                    longitude: -73.86,
                },
                Site {
                    name: "XC – Mt. Hoevenburg Base".to_string(),
                    code: "XC".to_string(),
                    latitude: 44.2192,
                    longitude: -73.9209,
                },
            ],
        }
    }
}

impl Config {
    /// Parse the configured zone name.
    pub fn tz(&self) -> Result<Tz, ForecastError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| ForecastError::Config(format!("unknown timezone '{}': {e}", self.timezone)))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Output root, falling back to `Forecasts` in the working directory.
    pub fn output_root(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("Forecasts"))
    }

    pub fn site(&self, code: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.code.eq_ignore_ascii_case(code))
    }

    /// Check the values the pipeline cannot run without.
    pub fn validate(&self) -> Result<(), ForecastError> {
        self.tz()?;

        if self.sites.is_empty() {
            return Err(ForecastError::Config("no sites configured".to_string()));
        }

        for site in &self.sites {
            if !(-90.0..=90.0).contains(&site.latitude) || !(-180.0..=180.0).contains(&site.longitude)
            {
                return Err(ForecastError::Config(format!(
                    "site '{}' has out-of-range coordinates ({}, {})",
                    site.name, site.latitude, site.longitude
                )));
            }
        }

        if self.http_timeout_secs == 0 {
            return Err(ForecastError::Config("http_timeout_secs must be positive".to_string()));
        }

        Ok(())
    }

    /// Load config from the default location, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use built-in sites.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "lakeplacid", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
