use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A position in floating-point degrees, as reported by location detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// The resolved location driving one fetch cycle: free-text city input, or
/// a coordinate pair from auto-detection. Exactly one is active per fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    City(String),
    Coords(Coordinates),
}

impl Query {
    pub fn is_coords(&self) -> bool {
        matches!(self, Query::Coords(_))
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::City(name) => f.write_str(name),
            Query::Coords(c) => write!(f, "{:.4},{:.4}", c.lat, c.lon),
        }
    }
}

/// Current weather at the queried location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Display name of the resolved location.
    pub name: String,
    pub temp_c: f64,
    /// Coarse category from the provider, e.g. "Rain" or "Clouds".
    pub condition: String,
    /// Human-readable text, e.g. "light rain".
    pub description: String,
}

/// One forecast card: a timestamped temperature plus its icon id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Unix timestamp (seconds) of the forecast slot.
    pub dt: i64,
    pub temp_c: f64,
    /// Provider icon identifier, e.g. "10d".
    pub icon: String,
}

impl ForecastSample {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.dt, 0)
    }

    /// URL of the provider-hosted icon image for this sample.
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}.png", self.icon)
    }
}

/// Upstream forecasts arrive at a fixed 3-hour step; keeping every 8th
/// entry approximates one sample per calendar day.
pub const FORECAST_STRIDE: usize = 8;

/// Roughly-daily forecast samples, in upstream order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    samples: Vec<ForecastSample>,
}

impl ForecastSeries {
    /// Sub-sample a raw 3-hourly list down to one entry per day.
    ///
    /// The stride is positional, not date-based: if the upstream series
    /// starts mid-day, every kept sample inherits that time of day.
    pub fn from_three_hourly(raw: impl IntoIterator<Item = ForecastSample>) -> Self {
        let samples = raw
            .into_iter()
            .enumerate()
            .filter(|(i, _)| i % FORECAST_STRIDE == 0)
            .map(|(_, sample)| sample)
            .collect();

        Self { samples }
    }

    pub fn samples(&self) -> &[ForecastSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// The outcome of one successful fetch cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub daily: ForecastSeries,
}
