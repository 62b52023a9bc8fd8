//! Per-column analysis with chart data.

use super::histogram::{HistogramBin, histogram};
use crate::config::ServiceConfig;
use crate::error::{InsightError, Result};
use crate::types::ColumnKind;
use crate::utils::{column_json_values, finite_f64_values, ranked_value_counts, text_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of entries from the frequency table repeated in the stats block.
const STATS_TOP_VALUES: usize = 10;

/// Summary statistics of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; 0 with fewer than two values.
    pub std: f64,
    pub q25: f64,
    pub q75: f64,
    pub null_count: usize,
    pub total_count: usize,
}

/// Frequency of one distinct value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub name: String,
    pub value: usize,
}

/// Summary statistics of a categorical or datetime column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalStats {
    pub unique_count: usize,
    pub total_count: usize,
    pub null_count: usize,
    pub mode: Option<String>,
    pub top_values: Vec<ValueCount>,
}

/// Analysis of a single column, tagged by `"type"` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnAnalysis {
    Empty {
        column_name: String,
        message: String,
    },
    Numeric {
        column_name: String,
        stats: NumericStats,
        chart_data: Vec<HistogramBin>,
    },
    Categorical {
        column_name: String,
        stats: CategoricalStats,
        chart_data: Vec<ValueCount>,
    },
}

impl ColumnAnalysis {
    pub fn column_name(&self) -> &str {
        match self {
            ColumnAnalysis::Empty { column_name, .. }
            | ColumnAnalysis::Numeric { column_name, .. }
            | ColumnAnalysis::Categorical { column_name, .. } => column_name,
        }
    }
}

/// The `limit` most frequent present values of a column, by count
/// descending then value ascending.
///
/// Datetime values are named by their ISO-8601 form.
pub fn top_values(series: &Series, limit: usize) -> Result<Vec<ValueCount>> {
    let ranked = ranked_value_counts(series)?.head(Some(limit));
    let names = display_values(ranked.column("value")?.as_materialized_series())?;
    let counts = ranked
        .column("count")?
        .as_materialized_series()
        .cast(&DataType::UInt64)?;

    Ok(names
        .into_iter()
        .zip(counts.u64()?.into_no_null_iter())
        .map(|(name, value)| ValueCount {
            name,
            value: value as usize,
        })
        .collect())
}

/// Present values of a non-numeric column as display strings.
fn display_values(series: &Series) -> Result<Vec<String>> {
    if ColumnKind::of(series) == ColumnKind::Datetime {
        return Ok(column_json_values(series)?
            .into_iter()
            .filter_map(|value| match value {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect());
    }
    Ok(text_values(series)?.into_iter().flatten().collect())
}

fn numeric_analysis(series: &Series, config: &ServiceConfig) -> Result<(NumericStats, Vec<HistogramBin>)> {
    let values = finite_f64_values(series)?;

    let std = if values.len() < 2 {
        0.0
    } else {
        values.std(1).unwrap_or(0.0)
    };

    let stats = NumericStats {
        min: values.min().unwrap_or_default(),
        max: values.max().unwrap_or_default(),
        mean: values.mean().unwrap_or_default(),
        median: values.median().unwrap_or_default(),
        std,
        q25: values.quantile(0.25, QuantileMethod::Linear)?.unwrap_or_default(),
        q75: values.quantile(0.75, QuantileMethod::Linear)?.unwrap_or_default(),
        null_count: series.null_count(),
        total_count: series.len(),
    };

    let points: Vec<f64> = values.into_no_null_iter().collect();
    Ok((stats, histogram(&points, config.histogram_bins)))
}

/// Analyze one column of a table.
///
/// # Errors
///
/// [`InsightError::ColumnNotFound`] when the table has no such column.
pub fn analyze_column(df: &DataFrame, column: &str, config: &ServiceConfig) -> Result<ColumnAnalysis> {
    let series = df
        .column(column)
        .map_err(|_| InsightError::ColumnNotFound(column.to_string()))?
        .as_materialized_series();
    let column_name = column.to_string();

    let is_numeric = ColumnKind::of(series) == ColumnKind::Numeric;
    let has_finite_numbers = is_numeric && !finite_f64_values(series)?.is_empty();

    // NaN-only numeric columns have nothing to chart either
    if series.null_count() == series.len() || (is_numeric && !has_finite_numbers) {
        return Ok(ColumnAnalysis::Empty {
            column_name,
            message: "Column contains only null values".to_string(),
        });
    }

    if has_finite_numbers {
        let (stats, chart_data) = numeric_analysis(series, config)?;
        return Ok(ColumnAnalysis::Numeric {
            column_name,
            stats,
            chart_data,
        });
    }

    let chart_data = top_values(series, config.top_values_limit)?;

    let stats = CategoricalStats {
        unique_count: series.drop_nulls().n_unique()?,
        total_count: series.len(),
        null_count: series.null_count(),
        mode: chart_data.first().map(|top| top.name.clone()),
        top_values: chart_data.iter().take(STATS_TOP_VALUES).cloned().collect(),
    };

    Ok(ColumnAnalysis::Categorical {
        column_name,
        stats,
        chart_data,
    })
}
