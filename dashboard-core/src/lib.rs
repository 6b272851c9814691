//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - The canonical (metric) weather payload
//! - Unit conversion and view-model derivation
//! - The dashboard container holding the selected unit
//! - Widget projections, configuration and data sources
//!
//! It is used by `dashboard-cli`, but can also be reused by other front ends.

pub mod config;
pub mod dashboard;
pub mod model;
pub mod source;
pub mod units;
pub mod view;
pub mod widgets;

pub use config::{Config, FooterConfig, ProviderConfig};
pub use dashboard::Dashboard;
pub use model::WeatherData;
pub use source::{FileSource, OpenWeatherSource, WeatherSource};
pub use units::Unit;
pub use view::{HourlyForecastEntry, ViewError, ViewModel};
