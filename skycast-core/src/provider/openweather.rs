use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::model::{Coordinates, CurrentConditions, ForecastSample, Query};

use super::{FetchError, WeatherProvider};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the OpenWeather current-conditions and 5-day forecast endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Client pointed at a non-default endpoint (used by tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }

    fn location_params(query: &Query) -> Vec<(&'static str, String)> {
        match query {
            Query::City(name) => vec![("q", name.clone())],
            Query::Coords(Coordinates { lat, lon }) => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        }
    }

    /// Issue one GET against `{base_url}/{endpoint}` and read the body.
    ///
    /// Status handling is left to the caller: the two endpoints disagree on
    /// what a non-success status means.
    async fn fetch_body(
        &self,
        endpoint: &'static str,
        query: &Query,
    ) -> Result<(StatusCode, String), FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut params = Self::location_params(query);
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));

        debug!(url = %url, query = %query, "requesting OpenWeather data");

        let res = self
            .http
            .get(&url)
            .query(&params)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|source| FetchError::Network { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Network { endpoint, source })?;

        Ok((status, body))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, query: &Query) -> Result<CurrentConditions, FetchError> {
        let (status, body) = self.fetch_body("weather", query).await?;

        if !status.is_success() {
            // Every rejection of this step reads as an unresolvable location.
            debug!(status = %status, body = %truncate_body(&body), "current conditions rejected");
            return Err(FetchError::NotFound);
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(|source| {
            FetchError::Parse {
                endpoint: "weather",
                source,
            }
        })?;

        let (condition, description) = parsed
            .weather
            .first()
            .map(|w| (w.main.clone(), w.description.clone()))
            .unwrap_or_else(|| ("Unknown".to_string(), "Unknown".to_string()));

        Ok(CurrentConditions {
            name: parsed.name,
            temp_c: parsed.main.temp,
            condition,
            description,
        })
    }

    async fn forecast(&self, query: &Query) -> Result<Vec<ForecastSample>, FetchError> {
        let (status, body) = self.fetch_body("forecast", query).await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: "forecast",
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: OwForecastResponse = serde_json::from_str(&body).map_err(|source| {
            FetchError::Parse {
                endpoint: "forecast",
                source,
            }
        })?;

        let samples = parsed
            .list
            .into_iter()
            .map(|entry| ForecastSample {
                dt: entry.dt,
                temp_c: entry.main.temp,
                icon: entry
                    .weather
                    .into_iter()
                    .next()
                    .map(|w| w.icon)
                    .unwrap_or_default(),
            })
            .collect();

        Ok(samples)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_query_maps_to_q_param() {
        let params = OpenWeatherClient::location_params(&Query::City("London".to_string()));
        assert_eq!(params, vec![("q", "London".to_string())]);
    }

    #[test]
    fn coords_query_maps_to_lat_lon_params() {
        let query = Query::Coords(Coordinates {
            lat: 51.5,
            lon: -0.12,
        });
        let params = OpenWeatherClient::location_params(&query);
        assert_eq!(
            params,
            vec![("lat", "51.5".to_string()), ("lon", "-0.12".to_string())]
        );
    }

    #[test]
    fn parses_current_response() {
        let body = r#"{
            "name": "London",
            "main": { "temp": 17.3, "humidity": 81 },
            "weather": [
                { "main": "Clouds", "description": "broken clouds", "icon": "04d" }
            ]
        }"#;

        let parsed: OwCurrentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.name, "London");
        assert_eq!(parsed.main.temp, 17.3);
        assert_eq!(parsed.weather[0].main, "Clouds");
        assert_eq!(parsed.weather[0].description, "broken clouds");
    }

    #[test]
    fn parses_forecast_response() {
        let body = r#"{
            "cod": "200",
            "list": [
                {
                    "dt": 1700000000,
                    "main": { "temp": 9.1 },
                    "weather": [
                        { "main": "Rain", "description": "light rain", "icon": "10d" }
                    ]
                },
                { "dt": 1700010800, "main": { "temp": 8.4 }, "weather": [] }
            ]
        }"#;

        let parsed: OwForecastResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.list.len(), 2);
        assert_eq!(parsed.list[0].weather[0].icon, "10d");
        assert!(parsed.list[1].weather.is_empty());
    }

    #[test]
    fn truncate_body_caps_long_payloads() {
        let long = "x".repeat(500);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));

        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        // 2-byte chars straddling the cap must not split.
        let long = "é".repeat(150);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert!(truncated.chars().all(|c| c == 'é' || c == '.'));
    }
}
