//! Shared utilities for inference, transforms and reporting.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use chrono::DateTime;
use polars::prelude::*;
use serde_json::{Number, Value};

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Strip thousands separators and surrounding whitespace.
///
/// ```rust,ignore
/// assert_eq!(clean_numeric_string(" 1,234.5 "), "1234.5");
/// ```
pub fn clean_numeric_string(s: &str) -> String {
    s.trim().replace(',', "").trim().to_string()
}

/// Parse a string as a finite number after cleaning.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a string as an integer literal after cleaning ("1,200" yes, "3.0" no).
pub fn parse_integer_string(s: &str) -> Option<i64> {
    clean_numeric_string(s).parse::<i64>().ok()
}

// =============================================================================
// Series Access Utilities
// =============================================================================

/// Text form of every cell, absent cells as `None`.
pub fn text_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let casted = series.cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Present, finite values of a numeric series as `Float64`.
pub fn finite_f64_values(series: &Series) -> PolarsResult<Float64Chunked> {
    let casted = series.cast(&DataType::Float64)?.drop_nulls();
    let ca = casted.f64()?;
    ca.filter(&ca.is_finite())
}

/// Frequency table of the present values of a series.
///
/// Columns are `value` (same dtype as the series) and `count`, ordered by
/// count descending and then by value ascending, so the first row is the
/// mode with ties resolved to the smallest value.
pub fn ranked_value_counts(series: &Series) -> PolarsResult<DataFrame> {
    series
        .drop_nulls()
        .with_name("value".into())
        .value_counts(false, false, "count".into(), false)?
        .sort(
            ["count", "value"],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Replacement for absent cells, typed to match the column it fills.
#[derive(Debug, Clone, PartialEq)]
pub enum FillValue {
    Float(f64),
    Int(i64),
    Text(String),
    /// Milliseconds since the Unix epoch.
    DatetimeMs(i64),
}

/// Zero-equivalent fill for a dtype: 0, 0.0, the epoch, or "0" for text.
pub fn zero_fill_value(dtype: &DataType) -> FillValue {
    if is_integer_dtype(dtype) {
        FillValue::Int(0)
    } else if is_numeric_dtype(dtype) {
        FillValue::Float(0.0)
    } else if is_datetime_dtype(dtype) {
        FillValue::DatetimeMs(0)
    } else {
        FillValue::Text("0".to_string())
    }
}

/// Fill absent cells of a series with a value.
///
/// Integer fills produce `Int64`, float fills `Float64`, datetime fills
/// `Datetime(ms)` and text fills `String`.
pub fn fill_nulls(series: &Series, fill: &FillValue) -> PolarsResult<Series> {
    let name = series.name().clone();

    match fill {
        FillValue::Float(v) => {
            let casted = series.cast(&DataType::Float64)?;
            let filled: Vec<Option<f64>> = casted
                .f64()?
                .into_iter()
                .map(|opt| Some(opt.unwrap_or(*v)))
                .collect();
            Ok(Series::new(name, filled))
        }
        FillValue::Int(v) => {
            let casted = series.cast(&DataType::Int64)?;
            let filled: Vec<Option<i64>> = casted
                .i64()?
                .into_iter()
                .map(|opt| Some(opt.unwrap_or(*v)))
                .collect();
            Ok(Series::new(name, filled))
        }
        FillValue::DatetimeMs(v) => {
            let as_ms = series
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
                .cast(&DataType::Int64)?;
            let filled: Vec<Option<i64>> = as_ms
                .i64()?
                .into_iter()
                .map(|opt| Some(opt.unwrap_or(*v)))
                .collect();
            Series::new(name, filled).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        }
        FillValue::Text(v) => {
            let filled: Vec<Option<String>> = text_values(series)?
                .into_iter()
                .map(|opt| Some(opt.unwrap_or_else(|| v.clone())))
                .collect();
            Ok(Series::new(name, filled))
        }
    }
}

// =============================================================================
// Serialization Utilities
// =============================================================================

/// Format epoch milliseconds as an ISO-8601 timestamp without timezone.
pub fn format_datetime_ms(ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(ms).map(|dt| {
        let naive = dt.naive_utc();
        if ms % 1000 == 0 {
            naive.format("%Y-%m-%dT%H:%M:%S").to_string()
        } else {
            naive.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
        }
    })
}

/// Converts a Polars `AnyValue` to a JSON value.
///
/// Non-finite floats become `null`; anything else without a JSON
/// counterpart falls back to its display form.
pub fn any_value_to_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),

        AnyValue::Int8(i) => Value::Number(i.into()),
        AnyValue::Int16(i) => Value::Number(i.into()),
        AnyValue::Int32(i) => Value::Number(i.into()),
        AnyValue::Int64(i) => Value::Number(i.into()),
        AnyValue::UInt8(u) => Value::Number(u.into()),
        AnyValue::UInt16(u) => Value::Number(u.into()),
        AnyValue::UInt32(u) => Value::Number(u.into()),
        AnyValue::UInt64(u) => Value::Number(u.into()),

        AnyValue::Float32(f) => Number::from_f64(f as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Float64(f) => Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),

        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),

        other => Value::String(other.to_string()),
    }
}

/// JSON values for every cell of a column.
///
/// Datetime columns are rendered as ISO strings via their millisecond
/// representation.
pub fn column_json_values(series: &Series) -> PolarsResult<Vec<Value>> {
    if is_datetime_dtype(series.dtype()) {
        let as_ms = series
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .cast(&DataType::Int64)?;
        return Ok(as_ms
            .i64()?
            .into_iter()
            .map(|opt| {
                opt.and_then(format_datetime_ms)
                    .map(Value::String)
                    .unwrap_or(Value::Null)
            })
            .collect());
    }

    (0..series.len())
        .map(|i| series.get(i).map(any_value_to_json))
        .collect()
}

/// Replace a non-finite float with zero.
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_clean_numeric_string() {
        assert_eq!(clean_numeric_string(" 1,234.5 "), "1234.5");
        assert_eq!(clean_numeric_string("42"), "42");
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("1,000"), Some(1000.0));
        assert_eq!(parse_numeric_string(" -2.5 "), Some(-2.5));
        assert_eq!(parse_numeric_string("1e3"), Some(1000.0));
        assert_eq!(parse_numeric_string("abc"), None);
        assert_eq!(parse_numeric_string("inf"), None);
        assert_eq!(parse_numeric_string(""), None);
    }

    #[test]
    fn test_parse_integer_string() {
        assert_eq!(parse_integer_string("1,200"), Some(1200));
        assert_eq!(parse_integer_string("3.0"), None);
    }

    #[test]
    fn test_finite_f64_values_skips_nulls_and_non_finite() {
        let series = Series::new("x".into(), &[Some(1.0), None, Some(f64::NAN), Some(f64::INFINITY), Some(3.0)]);
        let values: Vec<f64> = finite_f64_values(&series).unwrap().into_no_null_iter().collect();
        assert_eq!(values, vec![1.0, 3.0]);

        let ints = Series::new("n".into(), &[Some(2i64), None]);
        assert_eq!(finite_f64_values(&ints).unwrap().len(), 1);
    }

    #[test]
    fn test_ranked_value_counts_order() {
        let series = Series::new("x".into(), &[Some("b"), Some("a"), None, Some("b"), Some("a"), Some("c")]);
        let ranked = ranked_value_counts(&series).unwrap();

        let values: Vec<Option<&str>> = ranked.column("value").unwrap().str().unwrap().into_iter().collect();
        // ties between "a" and "b" resolve to the smaller value first
        assert_eq!(values, vec![Some("a"), Some("b"), Some("c")]);
        let counts = ranked.column("count").unwrap().as_materialized_series().cast(&DataType::UInt64).unwrap();
        let counts: Vec<u64> = counts.u64().unwrap().into_no_null_iter().collect();
        assert_eq!(counts, vec![2, 2, 1]);
    }

    #[test]
    fn test_ranked_value_counts_numeric_mode() {
        let series = Series::new("count".into(), &[3i64, 1, 3, 1, 2]);
        let ranked = ranked_value_counts(&series).unwrap();
        assert_eq!(ranked.column("value").unwrap().i64().unwrap().get(0), Some(1));
        assert_eq!(ranked_value_counts(&Series::new("e".into(), &[None::<i64>])).unwrap().height(), 0);
    }

    #[test]
    fn test_fill_nulls_float() {
        let series = Series::new("x".into(), &[Some(1.0), None, Some(3.0)]);
        let filled = fill_nulls(&series, &FillValue::Float(2.0)).unwrap();
        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.f64().unwrap().get(1), Some(2.0));
    }

    #[test]
    fn test_fill_nulls_text() {
        let series = Series::new("x".into(), &[Some("a"), None]);
        let filled = fill_nulls(&series, &FillValue::Text("0".to_string())).unwrap();
        assert_eq!(filled.str().unwrap().get(1), Some("0"));
    }

    #[test]
    fn test_fill_nulls_datetime() {
        let series = Series::new("t".into(), &[Some(86_400_000i64), None])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        let filled = fill_nulls(&series, &FillValue::DatetimeMs(0)).unwrap();
        assert_eq!(
            filled.dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        assert_eq!(filled.null_count(), 0);
    }

    #[test]
    fn test_zero_fill_value() {
        assert_eq!(zero_fill_value(&DataType::Int64), FillValue::Int(0));
        assert_eq!(zero_fill_value(&DataType::Float64), FillValue::Float(0.0));
        assert_eq!(
            zero_fill_value(&DataType::String),
            FillValue::Text("0".to_string())
        );
    }

    #[test]
    fn test_any_value_to_json() {
        assert_eq!(any_value_to_json(AnyValue::Null), Value::Null);
        assert_eq!(any_value_to_json(AnyValue::Int64(5)), Value::from(5));
        assert_eq!(any_value_to_json(AnyValue::Float64(f64::NAN)), Value::Null);
        assert_eq!(
            any_value_to_json(AnyValue::Float64(f64::INFINITY)),
            Value::Null
        );
        assert_eq!(
            any_value_to_json(AnyValue::String("hi")),
            Value::String("hi".to_string())
        );
    }

    #[test]
    fn test_column_json_values_datetime() {
        let series = Series::new("t".into(), &[Some(0i64), None])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        let values = column_json_values(&series).unwrap();
        assert_eq!(values[0], Value::String("1970-01-01T00:00:00".to_string()));
        assert_eq!(values[1], Value::Null);
    }

    #[test]
    fn test_format_datetime_ms() {
        assert_eq!(
            format_datetime_ms(0).as_deref(),
            Some("1970-01-01T00:00:00")
        );
        assert_eq!(
            format_datetime_ms(1_500).as_deref(),
            Some("1970-01-01T00:00:01.500")
        );
    }

    #[test]
    fn test_finite_or_zero() {
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(0.5), 0.5);
    }
}
