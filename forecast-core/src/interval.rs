//! Resampling the combined table into the short-term and extended cadences.
//!
//! Stride selection is positional inside each window: gaps in the hourly
//! series shift the wall-clock cadence rather than being filled.

use chrono::{DateTime, Duration, DurationRound};
use chrono_tz::Tz;
use serde::Serialize;

use crate::{
    model::UnitSystem,
    table::{CombinedRow, CombinedTable},
    units::mph_to_kmh,
};

pub const TIME_LABEL_FORMAT: &str = "%b %d %H:%M";

/// One display row: Date/Time, Temp, Feels, Wind, Gusts, Dir, RH%, PoP%, Cloud%.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub time: DateTime<Tz>,
    pub label: String,
    pub temp: Option<i64>,
    pub feels: Option<i64>,
    pub wind: Option<i64>,
    pub gust: Option<i64>,
    pub dir: String,
    pub rh_pct: Option<i64>,
    pub pop_pct: Option<i64>,
    pub cloud_pct: Option<i64>,
}

impl DisplayRow {
    /// Cell values in column order; missing numbers render empty.
    pub fn cells(&self) -> [String; 9] {
        [
            self.label.clone(),
            cell(self.temp),
            cell(self.feels),
            cell(self.wind),
            cell(self.gust),
            self.dir.clone(),
            cell(self.rh_pct),
            cell(self.pop_pct),
            cell(self.cloud_pct),
        ]
    }

    /// Numeric values in column order, `None` for the text columns and missing values.
    pub fn numbers(&self) -> [Option<i64>; 9] {
        [
            None,
            self.temp,
            self.feels,
            self.wind,
            self.gust,
            None,
            self.rh_pct,
            self.pop_pct,
            self.cloud_pct,
        ]
    }
}

fn cell(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// A row subset of the combined table projected into one unit system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalTable {
    pub units: UnitSystem,
    /// Zone abbreviation shown in the Date/Time header, e.g. "EDT".
    pub zone: String,
    pub rows: Vec<DisplayRow>,
}

impl IntervalTable {
    pub fn empty(units: UnitSystem, zone: impl Into<String>) -> Self {
        Self {
            units,
            zone: zone.into(),
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> [String; 9] {
        let t = self.units.temp_unit();
        let s = self.units.speed_unit();
        [
            format!("Date/Time ({})", self.zone),
            format!("Temp ({t})"),
            format!("Feels ({t})"),
            format!("Wind ({s})"),
            format!("Gusts ({s})"),
            "Dir".to_string(),
            "RH (%)".to_string(),
            "PoP (%)".to_string(),
            "Cloud (%)".to_string(),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn times(&self) -> Vec<DateTime<Tz>> {
        self.rows.iter().map(|r| r.time).collect()
    }
}

/// The four tables handed to the renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cadences {
    pub short_metric: IntervalTable,
    pub short_imperial: IntervalTable,
    pub long_metric: IntervalTable,
    pub long_imperial: IntervalTable,
}

/// Project a combined row into the display columns of `units`.
pub fn project(row: &CombinedRow, units: UnitSystem) -> DisplayRow {
    let (temp, feels, wind, gust) = match units {
        UnitSystem::Imperial => (row.temp_f, row.feels_f, row.wind_mph, row.gust_mph),
        UnitSystem::Metric => (
            row.temp_c,
            row.feels_c,
            row.wind_mph.map(to_kmh),
            row.gust_mph.map(to_kmh),
        ),
    };

    DisplayRow {
        time: row.time,
        label: row.time.format(TIME_LABEL_FORMAT).to_string(),
        temp,
        feels,
        wind,
        gust,
        dir: row.wind_dir.clone().unwrap_or_default(),
        rh_pct: row.rh_pct,
        pop_pct: row.pop_pct,
        cloud_pct: row.cloud_pct,
    }
}

fn to_kmh(mph: i64) -> i64 {
    mph_to_kmh(mph as f64).round() as i64
}

/// First row at or after the top of `now`'s hour; the earliest row when the
/// whole table lies in the past. `None` only for an empty table.
pub fn start_of(table: &CombinedTable, now: DateTime<Tz>) -> Option<DateTime<Tz>> {
    let hour = top_of_hour(now);
    let rows = table.rows();

    rows.iter()
        .map(|r| r.time)
        .find(|t| *t >= hour)
        .or_else(|| rows.first().map(|r| r.time))
}

/// Truncation by elapsed time, so the repeated hour on a fall-back night
/// stays on the same offset as `now`.
fn top_of_hour(now: DateTime<Tz>) -> DateTime<Tz> {
    now.duration_trunc(Duration::hours(1)).unwrap_or(now)
}

/// Indices of rows with `lo <= time <= hi` (or `lo < time` when `lo_open`),
/// keeping every `step`-th one counted from the first match.
fn window(
    rows: &[CombinedRow],
    lo: DateTime<Tz>,
    lo_open: bool,
    hi: DateTime<Tz>,
    step: usize,
) -> impl Iterator<Item = usize> + '_ {
    rows.iter()
        .enumerate()
        .filter(move |(_, r)| (if lo_open { r.time > lo } else { r.time >= lo }) && r.time <= hi)
        .map(|(i, _)| i)
        .step_by(step)
}

/// Row positions for the 36 hour table: every 2nd row of `[start, start+24h]`,
/// then every 4th row of `(start+24h, start+36h]`.
pub fn short_term_indices(table: &CombinedTable, start: DateTime<Tz>) -> Vec<usize> {
    let rows = table.rows();
    let end_24 = start + Duration::hours(24);
    let end_36 = start + Duration::hours(36);

    window(rows, start, false, end_24, 2)
        .chain(window(rows, end_24, true, end_36, 4))
        .collect()
}

/// Row positions for the 7 day table: every 6th row of `[start, start+7d]`.
pub fn extended_indices(table: &CombinedTable, start: DateTime<Tz>) -> Vec<usize> {
    window(table.rows(), start, false, start + Duration::days(7), 6).collect()
}

fn select(table: &CombinedTable, indices: &[usize], units: UnitSystem, zone: &str) -> IntervalTable {
    let rows = table.rows();
    IntervalTable {
        units,
        zone: zone.to_string(),
        rows: indices.iter().map(|&i| project(&rows[i], units)).collect(),
    }
}

/// Build both cadences in both unit systems.
///
/// Each cadence picks its row positions once; the metric and imperial views
/// are projections of the same positions.
pub fn resample(table: &CombinedTable, now: DateTime<Tz>) -> Cadences {
    let zone = now.format("%Z").to_string();

    let Some(start) = start_of(table, now) else {
        return Cadences {
            short_metric: IntervalTable::empty(UnitSystem::Metric, zone.as_str()),
            short_imperial: IntervalTable::empty(UnitSystem::Imperial, zone.as_str()),
            long_metric: IntervalTable::empty(UnitSystem::Metric, zone.as_str()),
            long_imperial: IntervalTable::empty(UnitSystem::Imperial, zone.as_str()),
        };
    };

    let short = short_term_indices(table, start);
    let long = extended_indices(table, start);

    tracing::debug!(
        %start,
        short_rows = short.len(),
        long_rows = long.len(),
        "resampled combined table"
    );

    Cadences {
        short_metric: select(table, &short, UnitSystem::Metric, &zone),
        short_imperial: select(table, &short, UnitSystem::Imperial, &zone),
        long_metric: select(table, &long, UnitSystem::Metric, &zone),
        long_imperial: select(table, &long, UnitSystem::Imperial, &zone),
    }
}
