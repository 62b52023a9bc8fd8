//! Categorical encoding: one-hot indicators and integer label codes.
//!
//! Both encoders order categories the same way: numeric columns by value,
//! everything else by the text form of the value. Codes and indicator
//! column order are therefore deterministic across runs.

use crate::config::ServiceConfig;
use crate::error::{InsightError, Result};
use crate::utils::{is_numeric_dtype, text_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use tracing::{debug, warn};

/// Encoding method accepted by the single-operation encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingMethod {
    OneHot,
    Label,
}

impl EncodingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingMethod::OneHot => "one_hot",
            EncodingMethod::Label => "label",
        }
    }
}

impl FromStr for EncodingMethod {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "one_hot" => Ok(EncodingMethod::OneHot),
            "label" => Ok(EncodingMethod::Label),
            other => Err(InsightError::InvalidEncodingMethod(other.to_string())),
        }
    }
}

/// Distinct-value limits applied by [`one_hot_encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OneHotLimits {
    /// More distinct values than this is an error.
    pub max_categories: usize,
    /// More distinct values than this is logged as a warning.
    pub warning_threshold: usize,
}

impl Default for OneHotLimits {
    fn default() -> Self {
        Self {
            max_categories: 100,
            warning_threshold: 50,
        }
    }
}

impl From<&ServiceConfig> for OneHotLimits {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            max_categories: config.max_one_hot_categories,
            warning_threshold: config.one_hot_warning_threshold,
        }
    }
}

/// Distinct present values of a column in encoding order.
fn sorted_categories(series: &Series, keys: &[Option<String>]) -> Vec<String> {
    let unique: HashSet<&str> = keys.iter().flatten().map(String::as_str).collect();
    let mut categories: Vec<String> = unique.into_iter().map(str::to_string).collect();

    if is_numeric_dtype(series.dtype()) {
        categories.sort_by(|a, b| {
            let a = a.parse::<f64>().unwrap_or(f64::NAN);
            let b = b.parse::<f64>().unwrap_or(f64::NAN);
            a.total_cmp(&b)
        });
    } else {
        categories.sort();
    }

    categories
}

/// Column name not yet present in the table: `base`, else `base_1`,
/// `base_2`, ...
fn free_column_name(df: &DataFrame, base: String) -> String {
    if df.get_column_index(&base).is_none() {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}_{n}");
        if df.get_column_index(&candidate).is_none() {
            return candidate;
        }
        n += 1;
    }
}

/// Replace each named column with one `Int64` 0/1 indicator per distinct
/// value, named `{column}_{value}` and placed where the source column was.
///
/// Rows where the source is absent get 0 in every indicator. An indicator
/// whose name is already taken gets a numeric suffix (`a_x_1`).
///
/// # Errors
///
/// * [`InsightError::ColumnNotFound`] for an unknown column
/// * [`InsightError::TooManyCategories`] when a column exceeds
///   `limits.max_categories` distinct values
pub fn one_hot_encode(
    df: &DataFrame,
    columns: &[String],
    limits: OneHotLimits,
) -> Result<DataFrame> {
    let mut df = df.clone();

    for col_name in columns {
        let position = df
            .get_column_index(col_name)
            .ok_or_else(|| InsightError::ColumnNotFound(col_name.clone()))?;
        let series = df.column(col_name)?.as_materialized_series().clone();

        let keys = text_values(&series)?;
        let categories = sorted_categories(&series, &keys);

        if categories.len() > limits.max_categories {
            return Err(InsightError::TooManyCategories {
                column: col_name.clone(),
                count: categories.len(),
                limit: limits.max_categories,
            });
        }
        if categories.len() > limits.warning_threshold {
            warn!(
                "Column '{}' has {} unique values; one-hot encoding will add many columns",
                col_name,
                categories.len()
            );
        }

        debug!(
            "One-hot encoding '{}' into {} indicator columns",
            col_name,
            categories.len()
        );

        df.drop_in_place(col_name)?;
        for (offset, category) in categories.iter().enumerate() {
            let values: Vec<i64> = keys
                .iter()
                .map(|key| i64::from(key.as_deref() == Some(category.as_str())))
                .collect();
            let name = free_column_name(&df, format!("{col_name}_{category}"));
            let indicator = Series::new(name.into(), values);
            df.insert_column(position + offset, indicator)?;
        }
    }

    Ok(df)
}

/// Replace each named column with `Int64` codes `0..k-1` in category order.
///
/// Absent values all share code `k`, one past the last present category.
/// Unknown column names are ignored.
pub fn label_encode(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    let mut df = df.clone();

    for col_name in columns {
        let encoded = {
            let Ok(column) = df.column(col_name) else {
                debug!("label_encode: column '{}' not present, skipping", col_name);
                continue;
            };
            let series = column.as_materialized_series();

            let keys = text_values(series)?;
            let categories = sorted_categories(series, &keys);
            let absent_code = categories.len() as i64;
            let codes: HashMap<&str, i64> = categories
                .iter()
                .enumerate()
                .map(|(code, category)| (category.as_str(), code as i64))
                .collect();

            let values: Vec<i64> = keys
                .iter()
                .map(|key| match key {
                    Some(key) => codes.get(key.as_str()).copied().unwrap_or(absent_code),
                    None => absent_code,
                })
                .collect();

            debug!(
                "Label encoding '{}' with {} categories",
                col_name,
                categories.len()
            );
            Series::new(series.name().clone(), values)
        };

        df.replace(col_name, encoded)?;
    }

    Ok(df)
}
