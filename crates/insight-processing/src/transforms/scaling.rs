//! Z-score normalization of numeric columns.

use crate::error::{InsightError, Result};
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use tracing::debug;

/// Resolve which columns [`normalize`] will scale.
///
/// With no request every numeric column is selected; otherwise the
/// requested columns that exist and are numeric, in request order. An
/// explicit empty request selects nothing.
pub fn resolve_normalize_columns(df: &DataFrame, columns: Option<&[String]>) -> Vec<String> {
    let is_numeric_column = |name: &str| {
        df.column(name)
            .map(|col| is_numeric_dtype(col.dtype()))
            .unwrap_or(false)
    };

    match columns {
        Some(requested) => requested
            .iter()
            .filter(|name| is_numeric_column(name.as_str()))
            .cloned()
            .collect(),
        None => df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .filter(|name| is_numeric_column(name))
            .collect(),
    }
}

/// Standardize numeric columns to zero mean and unit variance.
///
/// Uses each column's own mean and population standard deviation over its
/// present values. Constant columns become 0; absent values stay absent.
/// The result columns are `Float64`.
///
/// # Errors
///
/// [`InsightError::NoNumericColumns`] when no requested column is numeric.
pub fn normalize(df: &DataFrame, columns: Option<&[String]>) -> Result<DataFrame> {
    let targets = resolve_normalize_columns(df, columns);
    if targets.is_empty() {
        return Err(InsightError::NoNumericColumns);
    }

    let mut df = df.clone();
    for col_name in &targets {
        let scaled = {
            let series = df
                .column(col_name)?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            let ca = series.f64()?;

            let mean = ca.mean().unwrap_or(0.0);
            let std = ca.std(0).unwrap_or(0.0);
            let scale = if std > 0.0 { std } else { 1.0 };

            debug!(
                "Normalizing '{}' (mean={:.4}, std={:.4})",
                col_name, mean, std
            );

            let values: Vec<Option<f64>> = ca
                .into_iter()
                .map(|opt| opt.map(|v| (v - mean) / scale))
                .collect();
            Series::new(series.name().clone(), values)
        };

        df.replace(col_name, scaled)?;
    }

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df![
            "a" => [Some(1.0f64), Some(2.0), Some(3.0), None],
            "b" => [5i64, 5, 5, 5],
            "label" => ["x", "y", "z", "w"],
        ]
        .unwrap()
    }

    #[test]
    fn test_resolve_defaults_to_all_numeric() {
        assert_eq!(resolve_normalize_columns(&sample(), None), vec!["a", "b"]);
    }

    #[test]
    fn test_normalize_explicit_empty_list_fails() {
        assert!(resolve_normalize_columns(&sample(), Some(&[])).is_empty());
        assert!(matches!(
            normalize(&sample(), Some(&[])).unwrap_err(),
            InsightError::NoNumericColumns
        ));
    }

    #[test]
    fn test_resolve_filters_requested() {
        let requested = vec!["label".to_string(), "b".to_string(), "ghost".to_string()];
        assert_eq!(
            resolve_normalize_columns(&sample(), Some(&requested)),
            vec!["b"]
        );
    }

    #[test]
    fn test_normalize_zero_mean_unit_variance() {
        let result = normalize(&sample(), Some(&["a".to_string()])).unwrap();
        let values: Vec<Option<f64>> = result.column("a").unwrap().f64().unwrap().into_iter().collect();

        let std = (2.0f64 / 3.0).sqrt();
        assert_eq!(values[3], None);
        assert!((values[0].unwrap() + 1.0 / std).abs() < 1e-12);
        assert!(values[1].unwrap().abs() < 1e-12);
        assert!((values[2].unwrap() - 1.0 / std).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_constant_column_becomes_zero() {
        let result = normalize(&sample(), None).unwrap();
        let b = result.column("b").unwrap();
        assert_eq!(b.dtype(), &DataType::Float64);
        assert!(b.f64().unwrap().into_iter().all(|v| v == Some(0.0)));
    }

    #[test]
    fn test_normalize_no_numeric_columns_fails() {
        let df = df!["label" => ["x", "y"]].unwrap();
        assert!(matches!(
            normalize(&df, None).unwrap_err(),
            InsightError::NoNumericColumns
        ));
        assert!(matches!(
            normalize(&sample(), Some(&["label".to_string()])).unwrap_err(),
            InsightError::NoNumericColumns
        ));
    }
}
