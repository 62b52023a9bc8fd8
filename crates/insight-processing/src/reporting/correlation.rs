//! Pearson correlation across numeric columns.
//!
//! Each pair uses only the rows where both values are present and finite.
//! Undefined coefficients (fewer than two shared rows, or a side with zero
//! variance) are reported as 0.0, so the output never contains NaN or
//! infinity.

use crate::error::{InsightError, Result};
use crate::types::ColumnKind;
use crate::utils::finite_or_zero;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coefficient for one unordered column pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub column1: String,
    pub column2: String,
    pub correlation: f64,
}

/// Full correlation matrix plus its upper triangle as pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub columns: Vec<String>,
    /// Row-major, `matrix[i][j]` correlates `columns[i]` with `columns[j]`.
    pub matrix: Vec<Vec<f64>>,
    pub correlations: Vec<CorrelationPair>,
}

fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((*a, *b)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }

    finite_or_zero(cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// Correlate every numeric column with every other.
///
/// # Errors
///
/// [`InsightError::InsufficientNumericColumns`] with fewer than two numeric
/// columns.
pub fn correlation_report(df: &DataFrame) -> Result<CorrelationReport> {
    let mut columns = Vec::new();
    let mut data: Vec<Vec<Option<f64>>> = Vec::new();

    for column in df.get_columns() {
        let series = column.as_materialized_series();
        if ColumnKind::of(series) != ColumnKind::Numeric {
            continue;
        }
        let casted = series.cast(&DataType::Float64)?;
        data.push(casted.f64()?.into_iter().collect());
        columns.push(series.name().to_string());
    }

    if columns.len() < 2 {
        return Err(InsightError::InsufficientNumericColumns(columns.len()));
    }

    let k = columns.len();
    let mut matrix = vec![vec![0.0; k]; k];
    let mut correlations = Vec::with_capacity(k * (k - 1) / 2);

    for i in 0..k {
        // self-correlation is 1 unless the column has no spread
        matrix[i][i] = if pearson(&data[i], &data[i]) == 0.0 { 0.0 } else { 1.0 };

        for j in (i + 1)..k {
            let r = pearson(&data[i], &data[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
            correlations.push(CorrelationPair {
                column1: columns[i].clone(),
                column2: columns[j].clone(),
                correlation: r,
            });
        }
    }

    debug!("Computed correlations for {} numeric columns", k);
    Ok(CorrelationReport {
        columns,
        matrix,
        correlations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df![
            "x" => [1.0f64, 2.0, 3.0, 4.0],
            "up" => [2i64, 4, 6, 8],
            "down" => [4.0f64, 3.0, 2.0, 1.0],
            "flat" => [5.0f64, 5.0, 5.0, 5.0],
            "label" => ["a", "b", "c", "d"],
        ]
        .unwrap()
    }

    #[test]
    fn test_correlation_values() {
        let report = correlation_report(&sample()).unwrap();
        assert_eq!(report.columns, vec!["x", "up", "down", "flat"]);

        assert!((report.matrix[0][1] - 1.0).abs() < 1e-9);
        assert!((report.matrix[0][2] + 1.0).abs() < 1e-9);
        assert_eq!(report.matrix[0][3], 0.0);
        assert_eq!(report.correlations.len(), 6);
    }

    #[test]
    fn test_matrix_symmetric_with_unit_diagonal() {
        let report = correlation_report(&sample()).unwrap();
        let k = report.columns.len();
        for i in 0..k {
            for j in 0..k {
                assert_eq!(report.matrix[i][j], report.matrix[j][i]);
                assert!(report.matrix[i][j].is_finite());
            }
        }
        assert_eq!(report.matrix[0][0], 1.0);
        // constant column has no defined self-correlation
        assert_eq!(report.matrix[3][3], 0.0);
    }

    #[test]
    fn test_pairwise_complete_observations() {
        let df = df![
            "a" => [Some(1.0f64), Some(2.0), None, Some(4.0)],
            "b" => [Some(10.0f64), Some(20.0), Some(99.0), Some(40.0)],
        ]
        .unwrap();
        let report = correlation_report(&df).unwrap();
        assert!((report.matrix[0][1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_requires_two_numeric_columns() {
        let df = df![
            "x" => [1.0f64, 2.0],
            "s" => ["a", "b"],
        ]
        .unwrap();
        let err = correlation_report(&df).unwrap_err();
        assert!(matches!(err, InsightError::InsufficientNumericColumns(1)));
    }
}
