//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration (sites, timezone, HTTP settings)
//! - The NWS source adapter behind the [`SourceAdapter`] trait
//! - The forecast pipeline: gridpoint expansion, table join, cadence
//!   resampling and narrative summary
//! - Report renderers over finished [`SitePackage`]s
//!
//! It is used by `forecast-cli`, but the pipeline functions are plain and can
//! be driven from anywhere with an adapter.

pub mod config;
pub mod error;
pub mod interval;
pub mod model;
pub mod narrative;
pub mod package;
pub mod provider;
pub mod report;
pub mod table;
pub mod units;

pub use config::Config;
pub use error::ForecastError;
pub use interval::{Cadences, DisplayRow, IntervalTable, resample};
pub use model::{CurrentConditions, GridHour, GridSample, HourlySample, Site, UnitSystem};
pub use narrative::summarize;
pub use package::{SitePackage, build_site_package};
pub use provider::{SiteHandle, SourceAdapter, provider_from_config};
pub use report::ReportContext;
pub use table::{CombinedRow, CombinedTable, build_combined, expand_grid};
