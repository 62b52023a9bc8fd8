//! Column type inference.
//!
//! Each column is classified once, before any coercion, and the
//! classification is authoritative even if coercion later nulls values.

use crate::cleaner::converters::parse_datetime_ms;
use crate::types::ColumnKind;
use crate::utils::{
    is_datetime_dtype, is_numeric_dtype, parse_integer_string, parse_numeric_string,
};
use anyhow::Result;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

// Date pattern regexes - compiled once at startup
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}([ T].*)?$").expect("Invalid regex: YYYY-MM-DD"),
        Regex::new(r"^\d{1,2}[-/]\d{1,2}[-/]\d{4}([ T].*)?$").expect("Invalid regex: MM-DD-YYYY"),
    ]
});

/// How a column was classified, and how it should be coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Every value is absent.
    Empty,
    /// Already a numeric dtype.
    NativeNumeric,
    /// Already a date or datetime dtype.
    NativeDatetime,
    /// Text whose present values all parse as numbers.
    NumericText { integer: bool },
    /// Text whose present values all parse as dates or timestamps.
    DatetimeText,
    /// Anything else.
    Categorical,
}

impl Classification {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Classification::NativeNumeric | Classification::NumericText { .. } => {
                ColumnKind::Numeric
            }
            Classification::NativeDatetime | Classification::DatetimeText => {
                ColumnKind::Datetime
            }
            Classification::Empty | Classification::Categorical => ColumnKind::Categorical,
        }
    }
}

/// Check whether a string has the shape of a date before trying to parse it.
pub(crate) fn looks_like_date(value: &str) -> bool {
    let trimmed = value.trim();
    DATE_PATTERNS.iter().any(|pattern| pattern.is_match(trimmed))
}

/// Classify a column. First match wins:
/// all absent, native numeric, native datetime, numeric text, datetime
/// text, categorical.
///
/// Numeric is tried before datetime so year-like values ("2024") stay
/// numbers.
pub(crate) fn classify_column(series: &Series) -> Result<Classification> {
    if series.null_count() == series.len() {
        return Ok(Classification::Empty);
    }

    let dtype = series.dtype();
    if is_numeric_dtype(dtype) {
        return Ok(Classification::NativeNumeric);
    }
    if is_datetime_dtype(dtype) {
        return Ok(Classification::NativeDatetime);
    }
    if dtype != &DataType::String {
        return Ok(Classification::Categorical);
    }

    let present: Vec<&str> = series.str()?.into_iter().flatten().collect();

    if present.iter().all(|v| parse_numeric_string(v).is_some()) {
        let integer = present.iter().all(|v| parse_integer_string(v).is_some());
        return Ok(Classification::NumericText { integer });
    }

    if present
        .iter()
        .all(|v| looks_like_date(v) && parse_datetime_ms(v).is_some())
    {
        return Ok(Classification::DatetimeText);
    }

    Ok(Classification::Categorical)
}
