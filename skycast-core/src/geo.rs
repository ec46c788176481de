//! One-shot IP geolocation, the widget's stand-in for platform location
//! services.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::model::Coordinates;

const DEFAULT_BASE_URL: &str = "http://ip-api.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure classes of a location probe.
///
/// Every one of them downgrades the widget to manual entry; none are
/// surfaced as user-facing errors.
#[derive(Debug, Error)]
pub enum LocateError {
    /// The service answered but could not place the caller.
    #[error("Location lookup failed: {0}")]
    Lookup(String),

    /// The request did not complete, or the body was unreadable.
    #[error("Location request failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// One-shot position probe, abstracted so tests can substitute a fake.
#[async_trait]
pub trait Locator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, LocateError>;
}

/// Locator backed by the ip-api.com JSON endpoint (keyless, coarse,
/// good enough to seed a weather query).
#[derive(Debug, Clone)]
pub struct IpApiLocator {
    http: Client,
    base_url: String,
}

impl IpApiLocator {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    /// Locator pointed at a non-default endpoint (used by tests).
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }
}

impl Default for IpApiLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

#[async_trait]
impl Locator for IpApiLocator {
    async fn locate(&self) -> Result<Coordinates, LocateError> {
        let url = format!("{}/json", self.base_url);
        debug!(url = %url, "probing IP geolocation");

        let res = self.http.get(&url).timeout(REQUEST_TIMEOUT).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(LocateError::Lookup(format!("HTTP {status}")));
        }

        let parsed: IpApiResponse = res.json().await?;

        if parsed.status != "success" {
            return Err(LocateError::Lookup(
                parsed
                    .message
                    .unwrap_or_else(|| "unknown reason".to_string()),
            ));
        }

        match (parsed.lat, parsed.lon) {
            (Some(lat), Some(lon)) => {
                debug!(lat, lon, "location probe succeeded");
                Ok(Coordinates { lat, lon })
            }
            _ => Err(LocateError::Lookup(
                "response carried no coordinates".to_string(),
            )),
        }
    }
}
