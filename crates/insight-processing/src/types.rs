use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::{is_datetime_dtype, is_numeric_dtype};

/// Inferred kind of a column.
///
/// Derived from the column's polars dtype on demand; never stored apart
/// from the table itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Datetime,
}

impl ColumnKind {
    /// Kind of an already-typed series.
    pub fn of(series: &Series) -> Self {
        Self::of_dtype(series.dtype())
    }

    pub fn of_dtype(dtype: &DataType) -> Self {
        if is_numeric_dtype(dtype) {
            ColumnKind::Numeric
        } else if is_datetime_dtype(dtype) {
            ColumnKind::Datetime
        } else {
            ColumnKind::Categorical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Datetime => "datetime",
        }
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
    pub null_count: usize,
    pub null_percentage: f64,
    pub unique_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub datetime_columns: Vec<String>,
    pub column_info: Vec<ColumnInfo>,
    pub total_nulls: usize,
    pub head: Vec<Vec<serde_json::Value>>,
}

/// Outcome of type inference for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredColumn {
    pub name: String,
    pub kind: ColumnKind,
    pub dtype: String,
    /// Present values that failed coercion and became absent.
    pub coerced_to_null: usize,
}
