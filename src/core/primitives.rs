use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

/// Caller-facing time key that can be normalized into UNIX seconds.
///
/// Markers keep the original key verbatim; the normalized value is only used
/// for ordering and projection.
pub trait TimeKey: Clone {
    fn to_unix_seconds(&self) -> ChartResult<f64>;
}

impl TimeKey for f64 {
    fn to_unix_seconds(&self) -> ChartResult<f64> {
        if !self.is_finite() {
            return Err(ChartError::InvalidData(
                "marker time must be finite".to_owned(),
            ));
        }
        Ok(*self)
    }
}

impl TimeKey for i64 {
    fn to_unix_seconds(&self) -> ChartResult<f64> {
        Ok(*self as f64)
    }
}

impl TimeKey for DateTime<Utc> {
    fn to_unix_seconds(&self) -> ChartResult<f64> {
        Ok(datetime_to_unix_seconds(*self))
    }
}

/// Calendar day time key (`{ year, month, day }`), interpreted as UTC midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BusinessDay {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl BusinessDay {
    #[must_use]
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    fn to_date(self) -> ChartResult<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            ChartError::InvalidData(format!(
                "invalid business day {:04}-{:02}-{:02}",
                self.year, self.month, self.day
            ))
        })
    }
}

impl TimeKey for BusinessDay {
    fn to_unix_seconds(&self) -> ChartResult<f64> {
        naive_date_to_unix_seconds(self.to_date()?)
    }
}

impl TimeKey for String {
    fn to_unix_seconds(&self) -> ChartResult<f64> {
        self.as_str().to_unix_seconds()
    }
}

impl TimeKey for &str {
    fn to_unix_seconds(&self) -> ChartResult<f64> {
        let date = NaiveDate::parse_from_str(self, "%Y-%m-%d").map_err(|e| {
            ChartError::InvalidData(format!("invalid business day string `{self}`: {e}"))
        })?;
        naive_date_to_unix_seconds(date)
    }
}

fn naive_date_to_unix_seconds(date: NaiveDate) -> ChartResult<f64> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ChartError::InvalidData("invalid business day midnight".to_owned()))?;
    Ok(datetime_to_unix_seconds(midnight.and_utc()))
}
