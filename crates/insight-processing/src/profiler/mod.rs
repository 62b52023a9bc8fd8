//! Column type inference for freshly parsed tables.
//!
//! This module decides whether each column is numeric, datetime or
//! categorical and coerces text columns into the matching dtype.

mod type_inference;

pub use type_inference::Classification;
pub(crate) use type_inference::classify_column;

use crate::cleaner::converters::{string_to_datetime, string_to_numeric};
use crate::error::Result;
use crate::types::{ColumnKind, InferredColumn};
use polars::prelude::*;
use tracing::{debug, info};

/// Type inferrer for raw (mostly text) tables.
pub struct TypeInferrer;

impl TypeInferrer {
    /// Classify a single column without coercing it.
    pub fn infer_column_kind(series: &Series) -> Result<ColumnKind> {
        Ok(classify_column(series)?.kind())
    }

    /// Classify every column and coerce text columns in place.
    ///
    /// Numeric text becomes `Int64` when every value is an integer literal,
    /// otherwise `Float64`. Datetime text becomes `Datetime(ms)`. Values
    /// failing the coercion become null.
    pub fn infer_and_coerce(df: &DataFrame) -> Result<(DataFrame, Vec<InferredColumn>)> {
        let mut df = df.clone();
        let column_names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let mut inferred = Vec::with_capacity(column_names.len());

        for col_name in &column_names {
            let (classification, coerced, nulls_before) = {
                let series = df.column(col_name)?.as_materialized_series();
                let classification = classify_column(series)?;

                let coerced = match classification {
                    Classification::NumericText { integer: true } => {
                        Some(string_to_numeric(series, &DataType::Int64)?)
                    }
                    Classification::NumericText { integer: false } => {
                        Some(string_to_numeric(series, &DataType::Float64)?)
                    }
                    Classification::DatetimeText => Some(string_to_datetime(series)?),
                    _ => None,
                };

                (classification, coerced, series.null_count())
            };

            let mut coerced_to_null = 0;
            if let Some(series) = coerced {
                coerced_to_null = series.null_count().saturating_sub(nulls_before);
                df.replace(col_name, series)?;
            }

            let dtype = df.column(col_name)?.dtype().to_string();
            debug!(
                "Column '{}' inferred as {:?} ({})",
                col_name, classification, dtype
            );

            inferred.push(InferredColumn {
                name: col_name.clone(),
                kind: classification.kind(),
                dtype,
                coerced_to_null,
            });
        }

        info!(
            "Type inference complete: {} numeric, {} datetime, {} categorical",
            count_kind(&inferred, ColumnKind::Numeric),
            count_kind(&inferred, ColumnKind::Datetime),
            count_kind(&inferred, ColumnKind::Categorical)
        );

        Ok((df, inferred))
    }
}

fn count_kind(inferred: &[InferredColumn], kind: ColumnKind) -> usize {
    inferred.iter().filter(|col| col.kind == kind).count()
}
