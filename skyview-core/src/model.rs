use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(anyhow!(
                "Invalid coordinates ({latitude}, {longitude}): latitude must be -90..90, longitude -180..180"
            ));
        }

        Ok(Self { latitude, longitude })
    }
}

/// One geocoding match for a free-text city query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCandidate {
    pub name: String,
    pub state: Option<String>,
    pub country_code: String,
    pub country_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl CityCandidate {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates { latitude: self.latitude, longitude: self.longitude }
    }

    /// "Name, Region, Country" as shown in the suggestion list.
    pub fn display_name(&self) -> String {
        match &self.state {
            Some(state) if !state.is_empty() => {
                format!("{}, {}, {}", self.name, state, self.country_name)
            }
            _ => format!("{}, {}", self.name, self.country_name),
        }
    }
}

/// A single 3-hourly forecast entry, metric units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Seconds since the Unix epoch, UTC.
    pub timestamp: i64,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind_speed_ms: f64,
    pub condition_code: String,
    pub condition_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationLabel {
    pub name: String,
    pub country_code: String,
}

impl std::fmt::Display for LocationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.country_code.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}, {}", self.name, self.country_code)
        }
    }
}

/// Forecast response for one location.
///
/// Samples keep the provider's chronological order; the first one stands in
/// for current conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub location: LocationLabel,
    /// Offset of the forecast city's local time from UTC.
    pub utc_offset_secs: i32,
    pub samples: Vec<ForecastSample>,
}

impl Forecast {
    pub fn current(&self) -> Option<&ForecastSample> {
        self.samples.first()
    }
}
