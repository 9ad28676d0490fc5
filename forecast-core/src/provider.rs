use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::{
    Config, ForecastError,
    model::{CurrentConditions, GridSample, HourlySample},
    provider::nws::NwsProvider,
};

pub mod nws;

/// Grid metadata resolved for one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteHandle {
    pub latitude: f64,
    pub longitude: f64,
    pub grid_id: Option<String>,
    pub grid_x: Option<i64>,
    pub grid_y: Option<i64>,
    pub forecast_hourly_url: String,
    pub forecast_grid_data_url: String,
    pub observation_stations_url: String,
}

/// Where forecast data comes from.
///
/// Implementations own every network concern (timeouts, headers, unit
/// normalisation) and hand back plain samples. A failed call is an error; an
/// empty series or a missing observation is not.
#[async_trait]
pub trait SourceAdapter: Send + Sync + Debug {
    async fn resolve_site(&self, lat: f64, lon: f64) -> Result<SiteHandle, ForecastError>;

    /// Latest usable station observation, `None` if no station reported recently.
    async fn fetch_current(
        &self,
        site: &SiteHandle,
    ) -> Result<Option<CurrentConditions>, ForecastError>;

    /// Hourly periods sorted by time with unique timestamps.
    async fn fetch_hourly(&self, site: &SiteHandle) -> Result<Vec<HourlySample>, ForecastError>;

    /// Gridpoint buckets before hour expansion.
    async fn fetch_grid(&self, site: &SiteHandle) -> Result<Vec<GridSample>, ForecastError>;
}

/// Construct the NWS adapter from config.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn SourceAdapter>, ForecastError> {
    let provider = NwsProvider::from_config(config)?;
    Ok(Box::new(provider))
}
