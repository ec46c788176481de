//! Core library for the `skycast` weather widget.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and the one-cycle fetch orchestration
//! - IP-based location detection
//! - Shared domain models and the condition-to-scene mapping
//!
//! It is used by `skycast-tui`, but can also be reused by other binaries.

pub mod config;
pub mod fetch;
pub mod geo;
pub mod model;
pub mod provider;
pub mod scene;

pub use config::Config;
pub use fetch::fetch_report;
pub use geo::{IpApiLocator, LocateError, Locator};
pub use model::{
    Coordinates, CurrentConditions, FORECAST_STRIDE, ForecastSample, ForecastSeries, Query,
    WeatherReport,
};
pub use provider::{
    FetchError, WeatherProvider, openweather::OpenWeatherClient, openweather_from_config,
};
pub use scene::{GradientToken, ParticleKind, Rgb, Scene};
