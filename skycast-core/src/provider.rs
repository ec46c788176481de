use crate::{
    Config,
    model::{CurrentConditions, ForecastSample, Query},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt::Debug;
use thiserror::Error;

pub mod openweather;

/// Failure classes of one upstream request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The current-conditions request returned a non-success status: the
    /// queried location does not resolve.
    #[error("City not found")]
    NotFound,

    /// A non-success status outside the not-found contract.
    #[error("OpenWeather {endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The request never completed.
    #[error("Failed to reach OpenWeather ({endpoint}): {source}")]
    Network {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the JSON shape we expect.
    #[error("Failed to parse OpenWeather {endpoint} response: {source}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Abstraction over the upstream weather API, so the widget logic can run
/// against deterministic fakes in tests.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for the query.
    async fn current(&self, query: &Query) -> Result<CurrentConditions, FetchError>;

    /// Raw forecast series for the query, at the upstream 3-hour step.
    async fn forecast(&self, query: &Query) -> Result<Vec<ForecastSample>, FetchError>;
}

/// Construct the OpenWeather client from config.
pub fn openweather_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
             Hint: run `skycast configure` and enter your OpenWeather API key,\n\
             or set the OPENWEATHER_API_KEY environment variable."
        )
    })?;

    Ok(OpenWeatherClient::new(api_key.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = openweather_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("Hint: run `skycast configure`"));
    }

    #[test]
    fn from_config_works_when_key_set() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(openweather_from_config(&cfg).is_ok());
    }

    #[test]
    fn not_found_carries_the_fixed_user_message() {
        assert_eq!(FetchError::NotFound.to_string(), "City not found");
    }
}
