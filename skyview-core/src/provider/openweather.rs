use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    config::OpenWeatherConfig,
    country::country_name_or_code,
    model::{CityCandidate, Coordinates, Forecast, ForecastSample, LocationLabel},
};

use super::WeatherProvider;

/// Geocoding and forecast URLs; overridable so tests can point at a mock.
#[derive(Debug, Clone)]
pub struct OpenWeatherEndpoints {
    pub geocoding_url: String,
    pub forecast_url: String,
}

impl From<&OpenWeatherConfig> for OpenWeatherEndpoints {
    fn from(cfg: &OpenWeatherConfig) -> Self {
        Self {
            geocoding_url: cfg.geocoding_url.clone(),
            forecast_url: cfg.forecast_url.clone(),
        }
    }
}

impl Default for OpenWeatherEndpoints {
    fn default() -> Self {
        Self::from(&OpenWeatherConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    endpoints: OpenWeatherEndpoints,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, endpoints: OpenWeatherEndpoints, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { api_key, endpoints, http })
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)], what: &str) -> Result<String> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoCity {
    name: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

impl From<OwGeoCity> for CityCandidate {
    fn from(city: OwGeoCity) -> Self {
        CityCandidate {
            country_name: country_name_or_code(&city.country),
            name: city.name,
            state: city.state,
            country_code: city.country,
            latitude: city.lat,
            longitude: city.lon,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl From<OwForecastEntry> for ForecastSample {
    fn from(entry: OwForecastEntry) -> Self {
        let (condition_code, condition_description) = entry
            .weather
            .into_iter()
            .next()
            .map(|w| (w.icon, w.description))
            .unwrap_or_else(|| (String::new(), "Unknown".to_string()));

        ForecastSample {
            timestamp: entry.dt,
            temperature_c: entry.main.temp,
            humidity_pct: entry.main.humidity,
            pressure_hpa: entry.main.pressure,
            wind_speed_ms: entry.wind.speed,
            condition_code,
            condition_description,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self))]
    async fn search_cities(&self, query: &str, limit: usize) -> Result<Vec<CityCandidate>> {
        let body = self
            .get_text(
                &self.endpoints.geocoding_url,
                &[
                    ("q", query.to_string()),
                    ("limit", limit.to_string()),
                    ("appid", self.api_key.clone()),
                ],
                "geocoding",
            )
            .await?;

        let parsed: Vec<OwGeoCity> =
            serde_json::from_str(&body).context("Failed to parse OpenWeather geocoding JSON")?;

        debug!(matches = parsed.len(), "Geocoding lookup finished");

        Ok(parsed.into_iter().take(limit).map(CityCandidate::from).collect())
    }

    #[instrument(skip(self), fields(lat = %at.latitude, lon = %at.longitude))]
    async fn forecast(&self, at: Coordinates) -> Result<Forecast> {
        let body = self
            .get_text(
                &self.endpoints.forecast_url,
                &[
                    ("lat", at.latitude.to_string()),
                    ("lon", at.longitude.to_string()),
                    ("appid", self.api_key.clone()),
                    ("units", "metric".to_string()),
                ],
                "5-day forecast",
            )
            .await?;

        let parsed: OwForecastResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather forecast JSON")?;

        if parsed.list.is_empty() {
            return Err(anyhow!("OpenWeather forecast response contained no data"));
        }

        debug!(samples = parsed.list.len(), city = %parsed.city.name, "Forecast fetched");

        Ok(Forecast {
            location: LocationLabel { name: parsed.city.name, country_code: parsed.city.country },
            utc_offset_secs: parsed.city.timezone,
            samples: parsed.list.into_iter().map(ForecastSample::from).collect(),
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
