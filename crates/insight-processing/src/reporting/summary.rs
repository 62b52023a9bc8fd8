//! Dataset and column summaries.

use super::preview::rows_as_json;
use crate::error::Result;
use crate::transforms::{column_names, total_null_count};
use crate::types::{ColumnInfo, ColumnKind, DatasetSummary};
use crate::utils::finite_f64_values;
use polars::prelude::*;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Metadata for one column, recomputed from its values.
pub fn column_info(series: &Series) -> Result<ColumnInfo> {
    let kind = ColumnKind::of(series);
    let len = series.len();
    let null_count = series.null_count();
    let null_percentage = if len == 0 {
        0.0
    } else {
        round2(null_count as f64 / len as f64 * 100.0)
    };
    let unique_count = series.drop_nulls().n_unique()?;

    let (min, max, mean) = if kind == ColumnKind::Numeric {
        let values = finite_f64_values(series)?;
        (values.min(), values.max(), values.mean())
    } else {
        (None, None, None)
    };

    Ok(ColumnInfo {
        name: series.name().to_string(),
        dtype: series.dtype().to_string(),
        kind,
        null_count,
        null_percentage,
        unique_count,
        min,
        max,
        mean,
    })
}

/// Shape, per-kind column lists, column metadata and the first rows.
pub fn dataset_summary(df: &DataFrame, head_rows: usize) -> Result<DatasetSummary> {
    let mut numeric_columns = Vec::new();
    let mut categorical_columns = Vec::new();
    let mut datetime_columns = Vec::new();
    let mut column_info_list = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let info = column_info(column.as_materialized_series())?;
        match info.kind {
            ColumnKind::Numeric => numeric_columns.push(info.name.clone()),
            ColumnKind::Categorical => categorical_columns.push(info.name.clone()),
            ColumnKind::Datetime => datetime_columns.push(info.name.clone()),
        }
        column_info_list.push(info);
    }

    Ok(DatasetSummary {
        rows: df.height(),
        columns: df.width(),
        column_names: column_names(df),
        numeric_columns,
        categorical_columns,
        datetime_columns,
        column_info: column_info_list,
        total_nulls: total_null_count(df),
        head: rows_as_json(&df.head(Some(head_rows)))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df![
            "age" => [Some(20i64), None, Some(40), Some(40)],
            "city" => [Some("a"), Some("b"), None, Some("a")],
        ]
        .unwrap()
    }

    #[test]
    fn test_column_info_numeric() {
        let df = sample();
        let info = column_info(df.column("age").unwrap().as_materialized_series()).unwrap();

        assert_eq!(info.kind, ColumnKind::Numeric);
        assert_eq!(info.null_count, 1);
        assert_eq!(info.null_percentage, 25.0);
        assert_eq!(info.unique_count, 2);
        assert_eq!(info.min, Some(20.0));
        assert_eq!(info.max, Some(40.0));
        assert_eq!(info.mean, Some(100.0 / 3.0));
    }

    #[test]
    fn test_column_info_categorical_has_no_stats() {
        let df = sample();
        let info = column_info(df.column("city").unwrap().as_materialized_series()).unwrap();
        assert_eq!(info.kind, ColumnKind::Categorical);
        assert_eq!(info.unique_count, 2);
        assert!(info.min.is_none());
        assert!(info.mean.is_none());
    }

    #[test]
    fn test_column_info_all_null() {
        let series = Series::new("n".into(), &[None::<f64>, None]);
        let info = column_info(&series).unwrap();
        assert_eq!(info.null_percentage, 100.0);
        assert_eq!(info.unique_count, 0);
        assert!(info.max.is_none());
    }

    #[test]
    fn test_dataset_summary() {
        let summary = dataset_summary(&sample(), 2).unwrap();
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.columns, 2);
        assert_eq!(summary.numeric_columns, vec!["age"]);
        assert_eq!(summary.categorical_columns, vec!["city"]);
        assert!(summary.datetime_columns.is_empty());
        assert_eq!(summary.total_nulls, 2);
        assert_eq!(summary.head.len(), 2);
        assert_eq!(summary.column_info.len(), 2);
    }

    #[test]
    fn test_dataset_summary_empty_table() {
        let summary = dataset_summary(&DataFrame::empty(), 5).unwrap();
        assert_eq!(summary.rows, 0);
        assert!(summary.column_names.is_empty());
        assert!(summary.head.is_empty());
    }
}
