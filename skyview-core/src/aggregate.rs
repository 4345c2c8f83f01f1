//! Groups the flat 3-hourly forecast list into calendar-day buckets.
//!
//! Bucket order follows the order in which each day first appears in the
//! input. The representative sample of a day is simply its first sample,
//! which for the first day is "now" rather than midday.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Forecast, ForecastSample};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("Invalid forecast timestamp {timestamp}: cannot derive a calendar day")]
    InvalidTimestamp { timestamp: i64 },
}

/// Which calendar decides where one day ends and the next begins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayBoundary {
    /// The calendar of the machine running the lookup.
    #[default]
    Local,
    /// The calendar of the forecast city, from the provider's UTC offset.
    City,
}

/// Samples sharing one calendar date. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    date: NaiveDate,
    samples: Vec<ForecastSample>,
}

impl DayBucket {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn samples(&self) -> &[ForecastSample] {
        &self.samples
    }

    /// First sample of the day as present in the input.
    pub fn representative(&self) -> &ForecastSample {
        // Buckets are only created together with their first sample.
        &self.samples[0]
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Ordered mapping from calendar date to [`DayBucket`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyForecast {
    buckets: Vec<DayBucket>,
}

impl DailyForecast {
    /// Buckets `samples` by their calendar date in `tz`.
    pub fn group<I, Tz>(samples: I, tz: &Tz) -> Result<Self, AggregateError>
    where
        I: IntoIterator<Item = ForecastSample>,
        Tz: TimeZone,
    {
        let mut buckets: Vec<DayBucket> = Vec::new();
        let mut index: HashMap<NaiveDate, usize> = HashMap::new();

        for sample in samples {
            let date = day_key(sample.timestamp, tz)?;
            match index.get(&date) {
                Some(&i) => buckets[i].samples.push(sample),
                None => {
                    index.insert(date, buckets.len());
                    buckets.push(DayBucket { date, samples: vec![sample] });
                }
            }
        }

        Ok(Self { buckets })
    }

    /// Buckets by the machine's local calendar.
    pub fn group_local<I>(samples: I) -> Result<Self, AggregateError>
    where
        I: IntoIterator<Item = ForecastSample>,
    {
        Self::group(samples, &Local)
    }

    /// Buckets a provider forecast using the requested day boundary.
    pub fn from_forecast(forecast: &Forecast, boundary: DayBoundary) -> Result<Self, AggregateError> {
        let samples = forecast.samples.iter().cloned();
        match boundary {
            DayBoundary::Local => Self::group_local(samples),
            DayBoundary::City => {
                // Out-of-range offsets fall back to UTC.
                let offset =
                    FixedOffset::east_opt(forecast.utc_offset_secs).unwrap_or_else(|| Utc.fix());
                Self::group(samples, &offset)
            }
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DayBucket> {
        self.buckets.iter().find(|b| b.date == date)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DayBucket> {
        self.buckets.iter()
    }

    /// The first `n` days, in first-seen order.
    pub fn first_days(&self, n: usize) -> &[DayBucket] {
        &self.buckets[..n.min(self.buckets.len())]
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.buckets.iter().map(|b| b.date)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn into_buckets(self) -> Vec<DayBucket> {
        self.buckets
    }
}

impl<'a> IntoIterator for &'a DailyForecast {
    type Item = &'a DayBucket;
    type IntoIter = std::slice::Iter<'a, DayBucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

/// Calendar date of a Unix timestamp in `tz`.
pub fn day_key<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Result<NaiveDate, AggregateError> {
    if timestamp < 0 {
        return Err(AggregateError::InvalidTimestamp { timestamp });
    }

    let utc = DateTime::from_timestamp(timestamp, 0)
        .ok_or(AggregateError::InvalidTimestamp { timestamp })?;

    Ok(utc.with_timezone(tz).date_naive())
}
