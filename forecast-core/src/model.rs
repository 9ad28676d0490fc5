use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A named forecast point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    /// Short tag used in sheet names and file names, e.g. "DHI".
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One hour of the NWS hourly forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySample {
    pub time: DateTime<Tz>,
    pub temp_f: Option<f64>,
    pub wind_mph: f64,
    pub gust_mph: Option<f64>,
    pub wind_dir: Option<String>,
    pub rh_pct: Option<f64>,
    pub pop_pct: Option<f64>,
}

/// One gridpoint bucket, covering `hours` hours starting at `start`.
///
/// Values are already in °F / mph / percent.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSample {
    pub start: DateTime<Tz>,
    pub hours: u32,
    pub sky_cover_pct: Option<f64>,
    pub apparent_temp_f: Option<f64>,
    pub wind_gust_mph: Option<f64>,
}

/// A gridpoint sample after bucket expansion: exactly one hour.
#[derive(Debug, Clone, PartialEq)]
pub struct GridHour {
    pub time: DateTime<Tz>,
    pub sky_cover_pct: Option<f64>,
    pub apparent_temp_f: Option<f64>,
    pub wind_gust_mph: Option<f64>,
}

/// Latest station observation, rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub observed_at: DateTime<Tz>,
    pub station_id: String,
    pub conditions: String,
    pub temp_c: Option<i64>,
    pub temp_f: Option<i64>,
    pub rh_pct: Option<i64>,
    pub wind_mph: Option<i64>,
    pub gust_mph: Option<i64>,
    pub wind_dir_deg: Option<f64>,
    pub visibility_mi: Option<f64>,
    pub pressure_inhg: Option<f64>,
}

/// Which unit system a display table is projected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Heading suffix used by the reports, e.g. "Metric (°C, km/h)".
    pub fn label(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "Metric (°C, km/h)",
            UnitSystem::Imperial => "Imperial (°F, mph)",
        }
    }

    pub fn temp_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn speed_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "km/h",
            UnitSystem::Imperial => "mph",
        }
    }
}
