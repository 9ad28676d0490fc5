//! Joining the hourly forecast with the gridpoint supplement.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    model::{GridHour, GridSample, HourlySample},
    units::{f_to_c, feels_like, round_opt},
};

/// One hour of the combined forecast. Every numeric column is rounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedRow {
    pub time: DateTime<Tz>,
    pub temp_f: Option<i64>,
    pub feels_f: Option<i64>,
    pub temp_c: Option<i64>,
    pub feels_c: Option<i64>,
    pub wind_mph: Option<i64>,
    pub gust_mph: Option<i64>,
    pub wind_dir: Option<String>,
    pub rh_pct: Option<i64>,
    pub pop_pct: Option<i64>,
    pub cloud_pct: Option<i64>,
}

/// Strictly time-ordered rows with unique timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CombinedTable {
    rows: Vec<CombinedRow>,
}

impl CombinedTable {
    pub fn rows(&self) -> &[CombinedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Expand gridpoint buckets into one row per covered hour.
///
/// When buckets overlap, each field keeps the last non-missing value seen.
pub fn expand_grid(samples: &[GridSample]) -> Vec<GridHour> {
    let mut hours: BTreeMap<DateTime<Tz>, GridHour> = BTreeMap::new();

    for sample in samples {
        for h in 0..sample.hours {
            let time = sample.start + Duration::hours(i64::from(h));
            let slot = hours.entry(time).or_insert_with(|| GridHour {
                time,
                sky_cover_pct: None,
                apparent_temp_f: None,
                wind_gust_mph: None,
            });

            if sample.sky_cover_pct.is_some() {
                slot.sky_cover_pct = sample.sky_cover_pct;
            }
            if sample.apparent_temp_f.is_some() {
                slot.apparent_temp_f = sample.apparent_temp_f;
            }
            if sample.wind_gust_mph.is_some() {
                slot.wind_gust_mph = sample.wind_gust_mph;
            }
        }
    }

    hours.into_values().collect()
}

#[derive(Default)]
struct Joined<'a> {
    hourly: Option<&'a HourlySample>,
    grid: Option<&'a GridHour>,
}

/// Outer-join hourly and expanded gridpoint rows by timestamp and derive the
/// feels-like, cloud, gust and Celsius columns.
///
/// An empty hourly series yields an empty table whatever the grid holds.
pub fn build_combined(hourly: &[HourlySample], grid: &[GridHour]) -> CombinedTable {
    if hourly.is_empty() {
        return CombinedTable::default();
    }

    let mut joined: BTreeMap<DateTime<Tz>, Joined<'_>> = BTreeMap::new();
    for sample in hourly {
        joined.entry(sample.time).or_default().hourly = Some(sample);
    }
    for cell in grid {
        joined.entry(cell.time).or_default().grid = Some(cell);
    }

    let rows = joined
        .into_iter()
        .map(|(time, j)| combine_row(time, j.hourly, j.grid))
        .collect();

    CombinedTable { rows }
}

fn combine_row(
    time: DateTime<Tz>,
    hourly: Option<&HourlySample>,
    grid: Option<&GridHour>,
) -> CombinedRow {
    let temp_f = hourly.and_then(|h| h.temp_f).filter(|t| t.is_finite());
    let wind_mph = hourly.map(|h| h.wind_mph);
    let rh = hourly.and_then(|h| h.rh_pct);

    let apparent = grid.and_then(|g| g.apparent_temp_f).filter(|t| t.is_finite());
    let feels_f = apparent.or_else(|| temp_f.map(|t| feels_like(t, wind_mph.unwrap_or(0.0), rh)));

    let gust_mph = hourly
        .and_then(|h| h.gust_mph)
        .or_else(|| grid.and_then(|g| g.wind_gust_mph));

    CombinedRow {
        time,
        temp_f: round_opt(temp_f),
        feels_f: round_opt(feels_f),
        temp_c: round_opt(temp_f.map(f_to_c)),
        feels_c: round_opt(feels_f.map(f_to_c)),
        wind_mph: round_opt(wind_mph),
        gust_mph: round_opt(gust_mph),
        wind_dir: hourly.and_then(|h| h.wind_dir.clone()),
        rh_pct: round_opt(rh),
        pop_pct: round_opt(hourly.and_then(|h| h.pop_pct)),
        cloud_pct: round_opt(grid.and_then(|g| g.sky_cover_pct)),
    }
}
