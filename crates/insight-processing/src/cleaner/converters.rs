//! Type conversion functions for text columns.

use crate::utils::{parse_integer_string, parse_numeric_string};
use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Datetime layouts tried in order, all interpreted as UTC.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Date-only layouts tried in order. Month-first wins over day-first.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%m-%d-%Y", "%d-%m-%Y",
];

/// Parse a date or timestamp string into epoch milliseconds.
pub(crate) fn parse_datetime_ms(value: &str) -> Option<i64> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_millis());
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| naive.and_utc().timestamp_millis());
        }
    }

    None
}

/// Convert a text series to `Int64` or `Float64`.
///
/// Thousands separators and surrounding whitespace are stripped first.
/// Values that fail to parse become null.
pub(crate) fn string_to_numeric(series: &Series, target_dtype: &DataType) -> Result<Series> {
    let str_series = series.str()?;

    match target_dtype {
        DataType::Float64 => {
            let values: Vec<Option<f64>> = str_series
                .into_iter()
                .map(|opt_val| opt_val.and_then(parse_numeric_string))
                .collect();
            Ok(Series::new(series.name().clone(), values))
        }
        DataType::Int64 => {
            let values: Vec<Option<i64>> = str_series
                .into_iter()
                .map(|opt_val| opt_val.and_then(parse_integer_string))
                .collect();
            Ok(Series::new(series.name().clone(), values))
        }
        other => bail!("Unsupported numeric target type: {other}"),
    }
}

/// Convert a text series to `Datetime(Milliseconds)`; unparseable values
/// become null.
pub(crate) fn string_to_datetime(series: &Series) -> Result<Series> {
    let str_series = series.str()?;
    let timestamps: Vec<Option<i64>> = str_series
        .into_iter()
        .map(|opt_val| opt_val.and_then(parse_datetime_ms))
        .collect();

    let timestamp_series = Series::new(series.name().clone(), timestamps);
    Ok(timestamp_series.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?)
}
