use tracing::debug;

use crate::model::{ForecastSeries, Query, WeatherReport};
use crate::provider::{FetchError, WeatherProvider};

/// Run one fetch cycle for `query`: current conditions first, then the
/// forecast.
///
/// The current-conditions request must succeed before the forecast request
/// is issued; a failure at either step aborts the cycle with no partial
/// result. There is no retry.
pub async fn fetch_report(
    provider: &dyn WeatherProvider,
    query: &Query,
) -> Result<WeatherReport, FetchError> {
    let current = provider.current(query).await?;

    let raw = provider.forecast(query).await?;
    let daily = ForecastSeries::from_three_hourly(raw);

    debug!(query = %query, days = daily.len(), "fetch cycle complete");

    Ok(WeatherReport { current, daily })
}
