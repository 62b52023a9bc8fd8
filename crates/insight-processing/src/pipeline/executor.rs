//! Pipeline executor.
//!
//! Applies operations strictly in order, feeding each step the previous
//! step's output. The first failing step aborts the run and every
//! intermediate table is discarded; the caller only ever sees the input
//! table or the fully transformed one.

use super::Operation;
use crate::config::ServiceConfig;
use crate::error::{InsightError, Result};
use crate::transforms::{
    OneHotLimits, drop_columns, handle_missing, label_encode, normalize, one_hot_encode,
    remove_duplicates,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Shape change caused by one pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: usize,
    pub operation: String,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub table: DataFrame,
    pub steps: Vec<StepRecord>,
}

/// Executes transform requests against a table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineExecutor {
    one_hot_limits: OneHotLimits,
}

impl PipelineExecutor {
    pub fn new(one_hot_limits: OneHotLimits) -> Self {
        Self { one_hot_limits }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(OneHotLimits::from(config))
    }

    /// Apply a single operation, returning a new table.
    pub fn apply(&self, df: &DataFrame, operation: &Operation) -> Result<DataFrame> {
        match operation {
            Operation::DropColumns { columns } => Ok(drop_columns(df, columns)),
            Operation::HandleMissing { strategy } => handle_missing(df, *strategy),
            Operation::OneHotEncode { columns } => one_hot_encode(df, columns, self.one_hot_limits),
            Operation::LabelEncode { columns } => label_encode(df, columns),
            Operation::Normalize { columns } => normalize(df, columns.as_deref()),
            Operation::RemoveDuplicates => remove_duplicates(df),
        }
    }

    /// Apply operations in order.
    ///
    /// # Errors
    ///
    /// The first failing step is returned as
    /// [`InsightError::TransformFailed`] carrying its 1-based position,
    /// its operation name and the underlying error. Nothing after it runs.
    pub fn execute(&self, df: &DataFrame, operations: &[Operation]) -> Result<PipelineOutcome> {
        info!("Executing pipeline with {} operations", operations.len());

        let mut current = df.clone();
        let mut steps = Vec::with_capacity(operations.len());

        for (index, operation) in operations.iter().enumerate() {
            let step = index + 1;
            let (rows_before, columns_before) = current.shape();

            let next = self.apply(&current, operation).map_err(|source| {
                warn!("Step {} ({}) failed: {}", step, operation, source);
                InsightError::TransformFailed {
                    step,
                    operation: operation.name().to_string(),
                    source: Box::new(source),
                }
            })?;

            let (rows_after, columns_after) = next.shape();
            debug!(
                "Step {} ({}): {}x{} -> {}x{}",
                step, operation, rows_before, columns_before, rows_after, columns_after
            );

            steps.push(StepRecord {
                step,
                operation: operation.name().to_string(),
                rows_before,
                rows_after,
                columns_before,
                columns_after,
            });
            current = next;
        }

        info!("Pipeline completed: final shape {:?}", current.shape());
        Ok(PipelineOutcome {
            table: current,
            steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::transforms::{MissingStrategy, column_names, total_null_count};

    fn sample() -> DataFrame {
        df![
            "x" => [Some(1i64), Some(1), None],
            "y" => [Some("a"), Some("a"), Some("b")],
            "z" => [1.0f64, 1.0, 4.0],
        ]
        .unwrap()
    }

    #[test]
    fn test_execute_applies_in_order() {
        let ops = vec![
            Operation::RemoveDuplicates,
            Operation::HandleMissing {
                strategy: MissingStrategy::FillZero,
            },
            Operation::OneHotEncode {
                columns: vec!["y".to_string()],
            },
        ];

        let outcome = PipelineExecutor::default().execute(&sample(), &ops).unwrap();
        assert_eq!(outcome.table.height(), 2);
        assert_eq!(total_null_count(&outcome.table), 0);
        assert_eq!(column_names(&outcome.table), vec!["x", "y_a", "y_b", "z"]);

        assert_eq!(outcome.steps.len(), 3);
        assert_eq!(outcome.steps[0].rows_before, 3);
        assert_eq!(outcome.steps[0].rows_after, 2);
        assert_eq!(outcome.steps[2].columns_after, 4);
    }

    #[test]
    fn test_execute_empty_list_returns_input() {
        let df = sample();
        let outcome = PipelineExecutor::default().execute(&df, &[]).unwrap();
        assert!(outcome.table.equals_missing(&df));
        assert!(outcome.steps.is_empty());
    }

    #[test]
    fn test_execute_stops_at_first_failure() {
        let executor = PipelineExecutor::new(OneHotLimits {
            max_categories: 1,
            warning_threshold: 1,
        });
        let ops = vec![
            Operation::DropColumns {
                columns: vec!["x".to_string()],
            },
            Operation::OneHotEncode {
                columns: vec!["y".to_string()],
            },
            Operation::RemoveDuplicates,
        ];

        let df = sample();
        let err = executor.execute(&df, &ops).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransformFailure);
        match err {
            InsightError::TransformFailed {
                step,
                operation,
                source,
            } => {
                assert_eq!(step, 2);
                assert_eq!(operation, "one_hot_encode");
                assert!(matches!(
                    *source,
                    InsightError::TooManyCategories { count: 2, .. }
                ));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // input untouched
        assert_eq!(column_names(&df), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_apply_normalize_without_numeric_fails() {
        let df = df!["s" => ["a", "b"]].unwrap();
        let err = PipelineExecutor::default()
            .apply(&df, &Operation::Normalize { columns: None })
            .unwrap_err();
        assert!(matches!(err, InsightError::NoNumericColumns));
    }

    #[test]
    fn test_apply_normalize_with_empty_column_list_fails() {
        let df = df!["n" => [1.0f64, 2.0]].unwrap();
        let ops = Operation::list_from_json(r#"[{"type": "normalize", "columns": []}]"#).unwrap();
        let err = PipelineExecutor::default().apply(&df, &ops[0]).unwrap_err();
        assert!(matches!(err, InsightError::NoNumericColumns));
    }
}
