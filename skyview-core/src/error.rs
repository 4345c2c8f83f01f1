use serde::Serialize;
use thiserror::Error;

/// What started a forecast lookup; decides the wording of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupOrigin {
    City,
    CurrentLocation,
}

/// Failures surfaced to the user. Each one is local to the action that
/// triggered it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Error fetching weather data. Please try again.")]
    CityForecast,

    #[error("Error fetching weather data for your location.")]
    LocationForecast,

    #[error("Unable to search for cities. Please try again.")]
    Search,

    #[error("Unable to get your location. Please allow location access or search for a city.")]
    GeolocationDenied,

    #[error("Geolocation is not available on this system.")]
    GeolocationUnavailable,

    #[error("Forecast data is malformed: {0}")]
    InvalidForecast(String),
}

impl LookupError {
    pub fn network(origin: LookupOrigin) -> Self {
        match origin {
            LookupOrigin::City => LookupError::CityForecast,
            LookupOrigin::CurrentLocation => LookupError::LocationForecast,
        }
    }
}
