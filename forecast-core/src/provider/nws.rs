//! Adapter for the US National Weather Service API (`api.weather.gov`).
//!
//! A point is resolved once through `/points/{lat},{lon}`; the hourly
//! forecast, the raw gridpoint series and the observation stations are then
//! fetched from the URLs that document links to.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use reqwest::{Client, header};
use serde::{Deserialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::{
    Config, ForecastError,
    model::{CurrentConditions, GridSample, HourlySample},
    provider::{SiteHandle, SourceAdapter},
    units::{
        c_to_f, f_to_c, kmh_to_mph, knots_to_mph, meters_to_miles, mps_to_mph, pa_to_inhg,
        round_opt, wind_speed_from_text,
    },
};

/// Stations tried, in the order NWS lists them, before giving up on an observation.
const MAX_STATIONS: usize = 5;

#[derive(Debug, Clone)]
pub struct NwsProvider {
    http: Client,
    base_url: String,
    tz: Tz,
    lookback: Duration,
}

impl NwsProvider {
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout: std::time::Duration,
        tz: Tz,
        lookback_hours: i64,
    ) -> Result<Self, ForecastError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/geo+json, application/json"),
        );

        let http = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ForecastError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tz,
            lookback: Duration::hours(lookback_hours),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ForecastError> {
        Self::new(
            &config.api_base_url,
            &config.user_agent,
            config.http_timeout(),
            config.tz()?,
            config.observation_lookback_hours,
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ForecastError> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ForecastError::unavailable(url, e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| ForecastError::unavailable(url, e))?;

        if !status.is_success() {
            return Err(ForecastError::unavailable(
                url,
                format!("status {status}: {}", truncate_body(&body)),
            ));
        }

        serde_json::from_str(&body).map_err(|e| ForecastError::malformed(url, e))
    }

    fn to_local(&self, s: &str) -> Option<DateTime<Tz>> {
        DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&self.tz))
    }

    async fn latest_observation(&self, station_id: &str) -> Result<ObsProperties, ForecastError> {
        let url = format!("{}/stations/{station_id}/observations/latest", self.base_url);
        let obs: Feature<ObsProperties> = self.get_json(&url).await?;
        Ok(obs.properties)
    }

    fn current_from(&self, station_id: &str, p: ObsProperties) -> Option<CurrentConditions> {
        let observed_at = p.timestamp.as_deref().and_then(|s| self.to_local(s))?;

        let temp_c = p.temperature.value_in(|v, uom| if uom.contains("degF") { f_to_c(v) } else { v });
        let wind_mph = p.wind_speed.value_in(obs_speed_to_mph);
        let gust_mph = p.wind_gust.value_in(obs_speed_to_mph);

        Some(CurrentConditions {
            observed_at,
            station_id: station_id.to_string(),
            conditions: p
                .text_description
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "—".to_string()),
            temp_c: round_opt(temp_c),
            temp_f: round_opt(temp_c.map(c_to_f)),
            rh_pct: round_opt(p.relative_humidity.value),
            wind_mph: round_opt(wind_mph),
            gust_mph: round_opt(gust_mph),
            wind_dir_deg: p.wind_direction.value,
            visibility_mi: p.visibility.value.map(meters_to_miles),
            pressure_inhg: p.barometric_pressure.value.map(pa_to_inhg),
        })
    }

    fn hourly_from(&self, period: HourlyPeriod) -> Option<HourlySample> {
        let Some(time) = self.to_local(&period.start_time) else {
            debug!(start_time = %period.start_time, "dropping hourly period with unparseable start");
            return None;
        };

        let temperature_unit = period.temperature_unit.as_deref().unwrap_or_default();
        let temp_f = period.temperature.and_then(|t| t.fahrenheit(temperature_unit));

        let wind_mph = match period.wind_speed.and_then(WindValue::mph) {
            Some(mph) => mph,
            None => {
                debug!(start_time = %period.start_time, "no readable wind speed, using 0");
                0.0
            }
        };

        Some(HourlySample {
            time,
            temp_f,
            wind_mph,
            gust_mph: period.wind_gust.and_then(WindValue::mph),
            wind_dir: period.wind_direction.filter(|d| !d.trim().is_empty()),
            rh_pct: period.relative_humidity.value,
            pop_pct: period.probability_of_precipitation.value,
        })
    }

    fn grid_samples(&self, field: GridField, layer: Option<GridLayer>) -> Vec<GridSample> {
        let Some(layer) = layer else {
            return Vec::new();
        };
        let uom = layer.uom.unwrap_or_default();

        layer
            .values
            .into_iter()
            .filter_map(|entry| {
                let value = entry.value?;
                let Some((start, hours)) = self.parse_valid_time(&entry.valid_time) else {
                    debug!(valid_time = %entry.valid_time, ?field, "dropping grid entry");
                    return None;
                };

                let mut sample = GridSample {
                    start,
                    hours,
                    sky_cover_pct: None,
                    apparent_temp_f: None,
                    wind_gust_mph: None,
                };
                match field {
                    GridField::SkyCover => sample.sky_cover_pct = Some(value),
                    GridField::ApparentTemperature => {
                        sample.apparent_temp_f =
                            Some(if uom.contains("degC") { c_to_f(value) } else { value })
                    }
                    GridField::WindGust => sample.wind_gust_mph = Some(grid_speed_to_mph(value, &uom)),
                }
                Some(sample)
            })
            .collect()
    }

    /// `"2025-01-15T18:00:00+00:00/PT3H"` into a local start and a width in hours.
    fn parse_valid_time(&self, s: &str) -> Option<(DateTime<Tz>, u32)> {
        let (start, duration) = s.split_once('/')?;
        Some((self.to_local(start)?, parse_duration_hours(duration)?))
    }
}

#[async_trait]
impl SourceAdapter for NwsProvider {
    async fn resolve_site(&self, lat: f64, lon: f64) -> Result<SiteHandle, ForecastError> {
        let url = format!("{}/points/{lat},{lon}", self.base_url);
        let points: Feature<PointProperties> = self.get_json(&url).await?;
        let p = points.properties;

        debug!(grid_id = ?p.grid_id, grid_x = ?p.grid_x, grid_y = ?p.grid_y, "resolved point");

        Ok(SiteHandle {
            latitude: lat,
            longitude: lon,
            grid_id: p.grid_id,
            grid_x: p.grid_x,
            grid_y: p.grid_y,
            forecast_hourly_url: p.forecast_hourly,
            forecast_grid_data_url: p.forecast_grid_data,
            observation_stations_url: p.observation_stations,
        })
    }

    async fn fetch_current(
        &self,
        site: &SiteHandle,
    ) -> Result<Option<CurrentConditions>, ForecastError> {
        let stations: StationCollection = self.get_json(&site.observation_stations_url).await?;
        let now = Utc::now();

        for station in stations.features.into_iter().take(MAX_STATIONS) {
            let id = station.properties.station_identifier;

            let props = match self.latest_observation(&id).await {
                Ok(p) => p,
                Err(e) => {
                    warn!(station = %id, error = %e, "observation fetch failed, trying next station");
                    continue;
                }
            };

            let Some(current) = self.current_from(&id, props) else {
                debug!(station = %id, "observation without timestamp");
                continue;
            };

            if now.signed_duration_since(current.observed_at) > self.lookback {
                warn!(station = %id, observed_at = %current.observed_at, "observation too old");
                continue;
            }

            return Ok(Some(current));
        }

        Ok(None)
    }

    async fn fetch_hourly(&self, site: &SiteHandle) -> Result<Vec<HourlySample>, ForecastError> {
        let doc: Feature<HourlyProperties> = self.get_json(&site.forecast_hourly_url).await?;

        let by_time: BTreeMap<_, _> = doc
            .properties
            .periods
            .into_iter()
            .filter_map(|p| self.hourly_from(p))
            .map(|s| (s.time, s))
            .collect();

        Ok(by_time.into_values().collect())
    }

    async fn fetch_grid(&self, site: &SiteHandle) -> Result<Vec<GridSample>, ForecastError> {
        let doc: Feature<GridProperties> = self.get_json(&site.forecast_grid_data_url).await?;
        let p = doc.properties;

        let mut samples = self.grid_samples(GridField::SkyCover, p.sky_cover);
        samples.extend(self.grid_samples(GridField::ApparentTemperature, p.apparent_temperature));
        samples.extend(self.grid_samples(GridField::WindGust, p.wind_gust));
        samples.sort_by_key(|s| s.start);

        Ok(samples)
    }
}

/// Whole hours in an ISO-8601 duration such as `PT1H`, `P1D` or `P1DT6H`.
///
/// Fractional hours or an empty duration are rejected.
pub fn parse_duration_hours(s: &str) -> Option<u32> {
    let rest = s.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };

    let mut hours: u32 = 0;
    for (n, unit) in designators(date_part)? {
        match unit {
            'D' => hours = hours.checked_add(n.checked_mul(24)?)?,
            'W' => hours = hours.checked_add(n.checked_mul(24 * 7)?)?,
            _ => return None,
        }
    }
    if let Some(t) = time_part {
        for (n, unit) in designators(t)? {
            match unit {
                'H' => hours = hours.checked_add(n)?,
                'M' | 'S' if n == 0 => {}
                _ => return None,
            }
        }
    }

    (hours > 0).then_some(hours)
}

fn designators(s: &str) -> Option<Vec<(u32, char)>> {
    let mut out = Vec::new();
    let mut digits = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else {
            out.push((digits.parse().ok()?, c));
            digits.clear();
        }
    }
    digits.is_empty().then_some(out)
}

/// Observation speeds: km/h or knots when labelled, otherwise m/s.
fn obs_speed_to_mph(value: f64, uom: &str) -> f64 {
    if uom.contains("km_h") {
        kmh_to_mph(value)
    } else if uom.ends_with(":kt") || uom == "kt" {
        knots_to_mph(value)
    } else {
        mps_to_mph(value)
    }
}

/// Gridpoint gusts: NWS publishes km/h; knots and m/s are handled when labelled.
fn grid_speed_to_mph(value: f64, uom: &str) -> f64 {
    if uom.contains("km_h") || uom == "km/h" {
        kmh_to_mph(value)
    } else if uom.ends_with(":kt") || uom == "kt" {
        knots_to_mph(value)
    } else if uom.contains("m_s") {
        mps_to_mph(value)
    } else {
        value
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[derive(Debug, Clone, Copy)]
enum GridField {
    SkyCover,
    ApparentTemperature,
    WindGust,
}

#[derive(Debug, Deserialize)]
struct Feature<P> {
    properties: P,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointProperties {
    grid_id: Option<String>,
    grid_x: Option<i64>,
    grid_y: Option<i64>,
    forecast_hourly: String,
    forecast_grid_data: String,
    observation_stations: String,
}

#[derive(Debug, Deserialize)]
struct StationCollection {
    #[serde(default)]
    features: Vec<Feature<StationProperties>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationProperties {
    station_identifier: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Quantity {
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    unit_code: Option<String>,
}

impl Quantity {
    fn value_in(&self, convert: impl Fn(f64, &str) -> f64) -> Option<f64> {
        let uom = self.unit_code.as_deref().unwrap_or_default();
        self.value.map(|v| convert(v, uom))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObsProperties {
    timestamp: Option<String>,
    text_description: Option<String>,
    #[serde(default)]
    temperature: Quantity,
    #[serde(default)]
    relative_humidity: Quantity,
    #[serde(default)]
    wind_speed: Quantity,
    #[serde(default)]
    wind_gust: Quantity,
    #[serde(default)]
    wind_direction: Quantity,
    #[serde(default)]
    visibility: Quantity,
    #[serde(default)]
    barometric_pressure: Quantity,
}

#[derive(Debug, Deserialize)]
struct HourlyProperties {
    #[serde(default)]
    periods: Vec<HourlyPeriod>,
}

/// A bare number or a `{ unitCode, value }` object, depending on API flags.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrQuantity {
    Number(f64),
    Quantity(Quantity),
}

impl NumberOrQuantity {
    /// A quantity's own `unitCode` wins over the period's `temperatureUnit`.
    fn fahrenheit(self, temperature_unit: &str) -> Option<f64> {
        let (value, unit) = match self {
            Self::Number(v) => (Some(v), temperature_unit.to_string()),
            Self::Quantity(q) => {
                let unit = q.unit_code.filter(|u| !u.is_empty());
                (q.value, unit.unwrap_or_else(|| temperature_unit.to_string()))
            }
        };
        value.map(|v| if is_celsius(&unit) { c_to_f(v) } else { v })
    }
}

fn is_celsius(unit: &str) -> bool {
    unit.eq_ignore_ascii_case("C") || unit.contains("degC")
}

/// Wind as text (`"5 to 10 mph"`) or as a quantity object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WindValue {
    Text(String),
    Quantity(Quantity),
}

impl WindValue {
    /// `None` for an empty or unreadable text or a null quantity; `"Calm"` is 0.
    fn mph(self) -> Option<f64> {
        match self {
            Self::Text(s) => {
                let text = s.trim();
                let readable = text.eq_ignore_ascii_case("calm")
                    || text.contains(|c: char| c.is_ascii_digit());
                readable.then(|| wind_speed_from_text(text) as f64)
            }
            Self::Quantity(q) => q.value_in(grid_speed_to_mph),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HourlyPeriod {
    start_time: String,
    temperature: Option<NumberOrQuantity>,
    temperature_unit: Option<String>,
    wind_speed: Option<WindValue>,
    wind_gust: Option<WindValue>,
    wind_direction: Option<String>,
    #[serde(default)]
    relative_humidity: Quantity,
    #[serde(default)]
    probability_of_precipitation: Quantity,
}

#[derive(Debug, Deserialize)]
struct GridLayer {
    uom: Option<String>,
    #[serde(default)]
    values: Vec<GridValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridValue {
    valid_time: String,
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    sky_cover: Option<GridLayer>,
    apparent_temperature: Option<GridLayer>,
    wind_gust: Option<GridLayer>,
}
