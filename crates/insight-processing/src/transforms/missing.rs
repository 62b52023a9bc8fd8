//! Missing value handling.

use crate::error::{InsightError, Result};
use crate::utils::{
    FillValue, fill_nulls, finite_f64_values, is_datetime_dtype, is_integer_dtype,
    is_numeric_dtype, ranked_value_counts, zero_fill_value,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Strategy for handling missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingStrategy {
    /// Fill numeric columns with their mean
    #[default]
    Mean,
    /// Fill numeric columns with their median
    Median,
    /// Fill every column with its most frequent value
    Mode,
    /// Drop rows containing any missing value
    Drop,
    /// Fill every column with zero (or "0" / the epoch)
    FillZero,
}

impl MissingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingStrategy::Mean => "mean",
            MissingStrategy::Median => "median",
            MissingStrategy::Mode => "mode",
            MissingStrategy::Drop => "drop",
            MissingStrategy::FillZero => "fill_zero",
        }
    }
}

impl std::fmt::Display for MissingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MissingStrategy {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "mean" => Ok(MissingStrategy::Mean),
            "median" => Ok(MissingStrategy::Median),
            "mode" => Ok(MissingStrategy::Mode),
            "drop" => Ok(MissingStrategy::Drop),
            "fill_zero" => Ok(MissingStrategy::FillZero),
            other => Err(InsightError::InvalidStrategy(other.to_string())),
        }
    }
}

/// Handle missing values across the whole table.
///
/// Never fails on data grounds: columns with nothing to fill are left as-is.
pub fn handle_missing(df: &DataFrame, strategy: MissingStrategy) -> Result<DataFrame> {
    if strategy == MissingStrategy::Drop {
        return drop_incomplete_rows(df);
    }

    let mut df = df.clone();
    let column_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for col_name in &column_names {
        let filled = {
            let series = df.column(col_name)?.as_materialized_series();
            if series.null_count() == 0 {
                continue;
            }

            let fill = match strategy {
                MissingStrategy::Mean | MissingStrategy::Median => {
                    if !is_numeric_dtype(series.dtype()) {
                        continue;
                    }
                    numeric_center(series, strategy)?.map(FillValue::Float)
                }
                MissingStrategy::Mode => Some(
                    mode_fill_value(series)?
                        .unwrap_or_else(|| zero_fill_value(series.dtype())),
                ),
                MissingStrategy::FillZero => Some(zero_fill_value(series.dtype())),
                MissingStrategy::Drop => None,
            };

            match fill {
                Some(fill) => {
                    debug!("Filling nulls in '{}' with {:?} ({})", col_name, fill, strategy);
                    fill_nulls(series, &fill)?
                }
                None => continue,
            }
        };

        df.replace(col_name, filled)?;
    }

    Ok(df)
}

/// Mean or median of the present values, `None` if there are none.
fn numeric_center(series: &Series, strategy: MissingStrategy) -> Result<Option<f64>> {
    let values = finite_f64_values(series)?;
    Ok(match strategy {
        MissingStrategy::Median => values.median(),
        _ => values.mean(),
    })
}

/// Most frequent present value, typed to match the column.
fn mode_fill_value(series: &Series) -> Result<Option<FillValue>> {
    let ranked = ranked_value_counts(series)?;
    let mode = ranked.column("value")?.as_materialized_series().head(Some(1));
    let dtype = series.dtype();

    let fill = if is_integer_dtype(dtype) {
        mode.cast(&DataType::Int64)?.i64()?.get(0).map(FillValue::Int)
    } else if is_numeric_dtype(dtype) {
        mode.cast(&DataType::Float64)?.f64()?.get(0).map(FillValue::Float)
    } else if is_datetime_dtype(dtype) {
        mode.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .cast(&DataType::Int64)?
            .i64()?
            .get(0)
            .map(FillValue::DatetimeMs)
    } else {
        mode.cast(&DataType::String)?
            .str()?
            .get(0)
            .map(|value| FillValue::Text(value.to_string()))
    };
    Ok(fill)
}

/// Remove every row containing at least one absent value.
fn drop_incomplete_rows(df: &DataFrame) -> Result<DataFrame> {
    let result = df.drop_nulls::<String>(None)?;
    debug!(
        "Dropped {} rows with missing values",
        df.height() - result.height()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::total_null_count;

    fn sample() -> DataFrame {
        df![
            "age" => [Some(10i64), None, Some(30), Some(30)],
            "score" => [Some(1.0f64), Some(2.0), None, Some(9.0)],
            "city" => [Some("b"), None, Some("a"), Some("b")],
        ]
        .unwrap()
    }

    // ========================================================================
    // Strategy parsing
    // ========================================================================

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("mean".parse::<MissingStrategy>().unwrap(), MissingStrategy::Mean);
        assert_eq!(
            "fill_zero".parse::<MissingStrategy>().unwrap(),
            MissingStrategy::FillZero
        );
        let err = "average".parse::<MissingStrategy>().unwrap_err();
        assert!(matches!(err, InsightError::InvalidStrategy(s) if s == "average"));
    }

    #[test]
    fn test_strategy_serde() {
        let json = serde_json::to_string(&MissingStrategy::FillZero).unwrap();
        assert_eq!(json, "\"fill_zero\"");
        let parsed: MissingStrategy = serde_json::from_str("\"median\"").unwrap();
        assert_eq!(parsed, MissingStrategy::Median);
    }

    // ========================================================================
    // Mean / Median
    // ========================================================================

    #[test]
    fn test_mean_fills_numeric_only() {
        let result = handle_missing(&sample(), MissingStrategy::Mean).unwrap();

        let age = result.column("age").unwrap();
        assert_eq!(age.null_count(), 0);
        assert_eq!(age.f64().unwrap().get(1), Some(70.0 / 3.0));

        let score = result.column("score").unwrap();
        assert_eq!(score.f64().unwrap().get(2), Some(4.0));

        // text column untouched
        assert_eq!(result.column("city").unwrap().null_count(), 1);
    }

    #[test]
    fn test_median_fill() {
        let result = handle_missing(&sample(), MissingStrategy::Median).unwrap();
        assert_eq!(result.column("age").unwrap().f64().unwrap().get(1), Some(30.0));
        assert_eq!(result.column("score").unwrap().f64().unwrap().get(2), Some(2.0));
    }

    #[test]
    fn test_mean_on_all_null_numeric_is_noop() {
        let df = df!["x" => [None::<f64>, None]].unwrap();
        let result = handle_missing(&df, MissingStrategy::Mean).unwrap();
        assert_eq!(result.column("x").unwrap().null_count(), 2);
    }

    // ========================================================================
    // Mode
    // ========================================================================

    #[test]
    fn test_mode_fills_every_column() {
        let result = handle_missing(&sample(), MissingStrategy::Mode).unwrap();
        assert_eq!(total_null_count(&result), 0);
        assert_eq!(result.column("age").unwrap().i64().unwrap().get(1), Some(30));
        assert_eq!(result.column("city").unwrap().str().unwrap().get(1), Some("b"));
        // tie between 1.0, 2.0 and 9.0 resolves to the smallest
        assert_eq!(result.column("score").unwrap().f64().unwrap().get(2), Some(1.0));
    }

    #[test]
    fn test_mode_on_all_null_column_uses_zero_equivalent() {
        let df = df![
            "t" => [None::<&str>, None],
            "n" => [None::<i64>, None],
        ]
        .unwrap();
        let result = handle_missing(&df, MissingStrategy::Mode).unwrap();
        assert_eq!(result.column("t").unwrap().str().unwrap().get(0), Some("0"));
        assert_eq!(result.column("n").unwrap().i64().unwrap().get(0), Some(0));
    }

    // ========================================================================
    // Drop / FillZero
    // ========================================================================

    #[test]
    fn test_drop_removes_incomplete_rows() {
        let result = handle_missing(&sample(), MissingStrategy::Drop).unwrap();
        assert_eq!(result.height(), 2);
        assert_eq!(total_null_count(&result), 0);
        let ages: Vec<Option<i64>> = result.column("age").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(ages, vec![Some(10), Some(30)]);
    }

    #[test]
    fn test_mode_fills_datetime_with_most_frequent() {
        let df = Series::new("t".into(), &[Some(2_000i64), Some(1_000), Some(2_000), None])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap()
            .into_frame();
        let result = handle_missing(&df, MissingStrategy::Mode).unwrap();
        let t = result.column("t").unwrap().as_materialized_series().cast(&DataType::Int64).unwrap();
        assert_eq!(t.i64().unwrap().get(3), Some(2_000));
    }

    #[test]
    fn test_drop_keeps_complete_rows_in_order() {
        let df = df![
            "n" => [Some(3i64), Some(1), None, Some(2)],
            "s" => [Some("c"), Some("a"), Some("x"), Some("b")],
        ]
        .unwrap();
        let result = handle_missing(&df, MissingStrategy::Drop).unwrap();
        let expected = df![
            "n" => [3i64, 1, 2],
            "s" => ["c", "a", "b"],
        ]
        .unwrap();
        assert!(result.equals_missing(&expected));
    }

    #[test]
    fn test_fill_zero_leaves_no_nulls() {
        let df = df![
            "n" => [Some(1.5f64), None],
            "s" => [None, Some("x")],
        ]
        .unwrap();

        let result = handle_missing(&df, MissingStrategy::FillZero).unwrap();
        assert_eq!(total_null_count(&result), 0);
        assert_eq!(result.column("n").unwrap().f64().unwrap().get(1), Some(0.0));
        assert_eq!(result.column("s").unwrap().str().unwrap().get(0), Some("0"));
    }

    #[test]
    fn test_fill_zero_keeps_integer_dtype() {
        let df = df!["n" => [Some(4i64), None]].unwrap();
        let result = handle_missing(&df, MissingStrategy::FillZero).unwrap();
        assert_eq!(result.column("n").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_handle_missing_on_empty_table() {
        let df = DataFrame::empty();
        for strategy in [
            MissingStrategy::Mean,
            MissingStrategy::Median,
            MissingStrategy::Mode,
            MissingStrategy::Drop,
            MissingStrategy::FillZero,
        ] {
            let result = handle_missing(&df, strategy).unwrap();
            assert_eq!(result.width(), 0);
        }
    }
}
