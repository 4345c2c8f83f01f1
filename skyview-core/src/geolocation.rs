//! Source of the "current location" coordinates.

use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::{config::LocationConfig, model::Coordinates};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    /// The user (or config) refused to share a location.
    #[error("location access denied")]
    Denied,

    /// No location source is available.
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, GeolocationError>;
}

/// Location taken from explicit coordinates or the `[location]` config table.
#[derive(Debug, Clone)]
pub struct ConfiguredLocator {
    allow: bool,
    coordinates: Option<(f64, f64)>,
}

impl ConfiguredLocator {
    pub fn new(allow: bool, coordinates: Option<(f64, f64)>) -> Self {
        Self { allow, coordinates }
    }

    /// Coordinates passed on the command line take precedence over config.
    pub fn from_config(cfg: &LocationConfig, explicit: Option<(f64, f64)>) -> Self {
        Self::new(cfg.allow, explicit.or_else(|| cfg.coordinates()))
    }
}

#[async_trait]
impl Geolocator for ConfiguredLocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        if !self.allow {
            return Err(GeolocationError::Denied);
        }

        let (lat, lon) = self.coordinates.ok_or_else(|| {
            GeolocationError::Unavailable("no coordinates configured".to_string())
        })?;

        Coordinates::new(lat, lon).map_err(|e| GeolocationError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disallowed_location_is_denied() {
        let locator = ConfiguredLocator::new(false, Some((1.0, 2.0)));
        assert_eq!(locator.locate().await, Err(GeolocationError::Denied));
    }

    #[tokio::test]
    async fn missing_coordinates_are_unavailable() {
        let locator = ConfiguredLocator::new(true, None);
        assert!(matches!(locator.locate().await, Err(GeolocationError::Unavailable(_))));
    }

    #[tokio::test]
    async fn explicit_coordinates_override_config() {
        let cfg = LocationConfig { allow: true, latitude: Some(10.0), longitude: Some(20.0) };

        let locator = ConfiguredLocator::from_config(&cfg, Some((-33.87, 151.21)));
        let at = locator.locate().await.unwrap();
        assert_eq!(at, Coordinates::new(-33.87, 151.21).unwrap());

        let locator = ConfiguredLocator::from_config(&cfg, None);
        assert_eq!(locator.locate().await.unwrap().latitude, 10.0);
    }

    #[tokio::test]
    async fn out_of_range_coordinates_are_unavailable() {
        let locator = ConfiguredLocator::new(true, Some((100.0, 0.0)));
        assert!(matches!(locator.locate().await, Err(GeolocationError::Unavailable(_))));
    }
}
