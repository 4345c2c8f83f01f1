//! Display-ready view of a forecast: current conditions plus day tiles.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    aggregate::{AggregateError, DailyForecast, DayBoundary},
    model::{Forecast, ForecastSample},
    presenter::{self, EffectProfile, PresentationDescriptor},
};

#[derive(Debug, Clone, Serialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub description: String,
    pub condition_code: String,
    pub wind_speed_ms: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
}

impl From<&ForecastSample> for CurrentConditions {
    fn from(sample: &ForecastSample) -> Self {
        Self {
            temperature_c: sample.temperature_c,
            description: sample.condition_description.clone(),
            condition_code: sample.condition_code.clone(),
            wind_speed_ms: sample.wind_speed_ms,
            humidity_pct: sample.humidity_pct,
            pressure_hpa: sample.pressure_hpa,
        }
    }
}

/// One tile of the multi-day strip, built from the day's representative sample.
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    /// e.g. "Mon, Jan 1"
    pub label: String,
    pub temperature_c: f64,
    pub description: String,
    pub condition_code: String,
    pub glyph: &'static str,
    pub samples: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherSummary {
    pub location: String,
    pub glyph: &'static str,
    pub presentation: PresentationDescriptor,
    pub effect_profile: Option<EffectProfile>,
    pub current: Option<CurrentConditions>,
    pub days: Vec<DaySummary>,
}

impl WeatherSummary {
    /// Builds the view, keeping at most `days` day tiles.
    pub fn build(
        forecast: &Forecast,
        boundary: DayBoundary,
        days: usize,
    ) -> Result<Self, AggregateError> {
        let daily = DailyForecast::from_forecast(forecast, boundary)?;

        let code = forecast.current().map_or("", |s| s.condition_code.as_str());
        let presentation = match forecast.current() {
            Some(_) => presenter::present(code),
            None => PresentationDescriptor::default(),
        };

        let days = daily
            .first_days(days)
            .iter()
            .map(|bucket| {
                let rep = bucket.representative();
                DaySummary {
                    date: bucket.date(),
                    label: bucket.date().format("%a, %b %-d").to_string(),
                    temperature_c: rep.temperature_c,
                    description: rep.condition_description.clone(),
                    condition_code: rep.condition_code.clone(),
                    glyph: presenter::glyph(&rep.condition_code),
                    samples: bucket.len(),
                }
            })
            .collect();

        Ok(Self {
            location: forecast.location.to_string(),
            glyph: presenter::glyph(code),
            presentation,
            effect_profile: presentation.effect.profile(),
            current: forecast.current().map(CurrentConditions::from),
            days,
        })
    }
}

/// Whole degrees, halves rounded up.
pub fn display_temp(celsius: f64) -> i64 {
    (celsius + 0.5).floor() as i64
}
