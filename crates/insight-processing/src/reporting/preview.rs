//! Row previews rendered as JSON arrays.

use crate::error::Result;
use crate::transforms::column_names;
use crate::utils::column_json_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// First rows of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub total_rows: usize,
    pub total_columns: usize,
}

/// Rows of a table as JSON arrays in column order.
///
/// Non-finite floats come out as `null`, datetimes as ISO strings.
pub(crate) fn rows_as_json(df: &DataFrame) -> Result<Vec<Vec<Value>>> {
    let mut rows = vec![Vec::with_capacity(df.width()); df.height()];

    for column in df.get_columns() {
        let values = column_json_values(column.as_materialized_series())?;
        for (row, value) in rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    Ok(rows)
}

/// Preview the first `rows` rows.
pub fn preview(df: &DataFrame, rows: usize) -> Result<TablePreview> {
    let head = df.head(Some(rows));
    Ok(TablePreview {
        columns: column_names(df),
        rows: rows_as_json(&head)?,
        total_rows: df.height(),
        total_columns: df.width(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preview_limits_rows() {
        let df = df![
            "a" => [1i64, 2, 3],
            "b" => ["x", "y", "z"],
        ]
        .unwrap();

        let preview = preview(&df, 2).unwrap();
        assert_eq!(preview.columns, vec!["a", "b"]);
        assert_eq!(preview.rows, vec![vec![json!(1), json!("x")], vec![json!(2), json!("y")]]);
        assert_eq!(preview.total_rows, 3);
        assert_eq!(preview.total_columns, 2);
    }

    #[test]
    fn test_preview_non_finite_becomes_null() {
        let df = df!["f" => [Some(f64::NAN), None, Some(1.5)]].unwrap();
        let preview = preview(&df, 10).unwrap();
        assert_eq!(
            preview.rows,
            vec![vec![Value::Null], vec![Value::Null], vec![json!(1.5)]]
        );
    }

    #[test]
    fn test_preview_empty_table() {
        let preview = preview(&DataFrame::empty(), 10).unwrap();
        assert!(preview.rows.is_empty());
        assert_eq!(preview.total_columns, 0);
    }
}
