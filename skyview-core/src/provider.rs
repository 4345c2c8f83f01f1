use crate::{
    Config,
    model::{CityCandidate, Coordinates, Forecast},
    provider::openweather::{OpenWeatherEndpoints, OpenWeatherProvider},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc, time::Duration};

pub mod openweather;

/// Queries shorter than this never reach the geocoder.
pub const MIN_QUERY_CHARS: usize = 2;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Free-text city lookup, at most `limit` matches.
    async fn search_cities(&self, query: &str, limit: usize) -> anyhow::Result<Vec<CityCandidate>>;

    /// 5-day / 3-hour forecast for a point, metric units.
    async fn forecast(&self, at: Coordinates) -> anyhow::Result<Forecast>;
}

/// Whether `query` is long enough to be worth a geocoding call.
pub fn is_searchable(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_CHARS
}

/// City search that short-circuits empty and one-character queries.
pub async fn search_cities(
    provider: &dyn WeatherProvider,
    query: &str,
    limit: usize,
) -> anyhow::Result<Vec<CityCandidate>> {
    if !is_searchable(query) {
        return Ok(Vec::new());
    }

    provider.search_cities(query, limit).await
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key()?;

    let provider = OpenWeatherProvider::new(
        api_key,
        OpenWeatherEndpoints::from(&config.openweather),
        Duration::from_secs(config.openweather.timeout_secs),
    )?;

    Ok(Arc::new(provider))
}
