//! Per-site orchestration: source adapter → combined table → cadences → narrative.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    ForecastError,
    interval::{IntervalTable, resample},
    model::{CurrentConditions, Site},
    narrative::summarize,
    provider::SourceAdapter,
    table::{build_combined, expand_grid},
};

pub const ALERT_NOTE: &str = "No county-wide alerts shown on NWS point page at generation time.";

/// Everything the renderers need for one site. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitePackage {
    pub name: String,
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub current: Option<CurrentConditions>,
    pub short_metric: IntervalTable,
    pub short_imperial: IntervalTable,
    pub long_metric: IntervalTable,
    pub long_imperial: IntervalTable,
    pub narrative: Vec<String>,
    pub source_url: String,
    pub alert_note: String,
}

pub fn source_url(lat: f64, lon: f64) -> String {
    format!("https://forecast.weather.gov/MapClick.php?lat={lat}&lon={lon}")
}

/// Fetch and shape the forecast for one site.
///
/// Any adapter failure aborts this site only; an empty hourly series produces
/// empty tables and the fallback narrative.
pub async fn build_site_package(
    source: &dyn SourceAdapter,
    site: &Site,
    now: DateTime<Tz>,
) -> Result<SitePackage, ForecastError> {
    info!(site = %site.name, "resolving grid point");
    let handle = source.resolve_site(site.latitude, site.longitude).await?;

    info!(site = %site.name, "fetching latest observation");
    let current = source.fetch_current(&handle).await?;
    if current.is_none() {
        info!(site = %site.name, "no recent observation available");
    }

    info!(site = %site.name, "fetching hourly forecast");
    let hourly = source.fetch_hourly(&handle).await?;

    info!(site = %site.name, "fetching gridpoint supplement");
    let grid = source.fetch_grid(&handle).await?;

    let grid_hours = expand_grid(&grid);
    let combined = build_combined(&hourly, &grid_hours);
    debug!(
        site = %site.name,
        hourly = hourly.len(),
        grid_buckets = grid.len(),
        grid_hours = grid_hours.len(),
        combined = combined.len(),
        "combined forecast table"
    );

    let cadences = resample(&combined, now);
    let narrative = summarize(&cadences.short_imperial);

    Ok(SitePackage {
        name: site.name.clone(),
        code: site.code.clone(),
        latitude: site.latitude,
        longitude: site.longitude,
        current,
        short_metric: cadences.short_metric,
        short_imperial: cadences.short_imperial,
        long_metric: cadences.long_metric,
        long_imperial: cadences.long_imperial,
        narrative,
        source_url: source_url(site.latitude, site.longitude),
        alert_note: ALERT_NOTE.to_string(),
    })
}
