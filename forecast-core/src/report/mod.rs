//! Read-only renderers over finished [`SitePackage`]s.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;

use crate::{
    model::CurrentConditions,
    package::SitePackage,
    units::{compass_from_degrees, format_speed},
};

pub mod markdown;
pub mod pdf;
pub mod spreadsheet;
pub mod text;

pub const NO_OBSERVATION: &str = "No recent observation available from nearest station.";
pub const NOT_AVAILABLE: &str = "Not available";

/// Run-wide values shared by every report.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub title: String,
    pub generated_at: DateTime<Tz>,
}

impl ReportContext {
    pub fn new(title: impl Into<String>, generated_at: DateTime<Tz>) -> Self {
        Self {
            title: title.into(),
            generated_at,
        }
    }

    /// `Generated: Jan 15, 2025 – 09:30 AM EST`
    pub fn stamp_human(&self) -> String {
        self.generated_at.format("Generated: %b %d, %Y – %I:%M %p %Z").to_string()
    }

    /// `20250115-0930`, used in folder and file names.
    pub fn stamp_tag(&self) -> String {
        self.generated_at.format("%Y%m%d-%H%M").to_string()
    }

    pub fn valid_through(&self) -> DateTime<Tz> {
        self.generated_at + Duration::days(7)
    }
}

/// Per-package view helpers shared by the text and Markdown renderers.
pub(crate) fn temp_text(curr: &CurrentConditions) -> String {
    match (curr.temp_c, curr.temp_f) {
        (Some(c), Some(f)) => format!("{c} °C / {f} °F"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub(crate) fn rh_text(curr: &CurrentConditions) -> String {
    curr.rh_pct.map(|rh| format!("{rh}%")).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// `10 mph (16 km/h), from WNW, gusting 22 mph (35 km/h)`, or `-`.
pub(crate) fn wind_text(curr: &CurrentConditions) -> String {
    let Some(wind) = curr.wind_mph else {
        return "-".to_string();
    };

    let mut parts = vec![format_speed(wind as f64)];
    if let Some(dir) = compass_from_degrees(curr.wind_dir_deg) {
        parts.push(format!("from {dir}"));
    }
    if let Some(gust) = curr.gust_mph.filter(|g| *g != 0) {
        parts.push(format!("gusting {}", format_speed(gust as f64)));
    }

    parts.join(", ")
}

pub(crate) fn observed_text(curr: &CurrentConditions) -> String {
    curr.observed_at.format("%b %d, %Y – %I:%M %p %Z").to_string()
}

/// Sheet and section order used by every renderer.
pub(crate) fn tables(pkg: &SitePackage) -> [(&'static str, &crate::interval::IntervalTable); 4] {
    [
        ("Short_Metric", &pkg.short_metric),
        ("Short_Imperial", &pkg.short_imperial),
        ("Long_Metric", &pkg.long_metric),
        ("Long_Imperial", &pkg.long_imperial),
    ]
}
