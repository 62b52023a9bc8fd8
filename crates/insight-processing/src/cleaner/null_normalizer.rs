//! Rewrites ambiguous textual null markers into real nulls.

use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Text values treated as missing. Matching is exact and case-sensitive.
pub const NULL_MARKERS: [&str; 13] = [
    "-", "--", "N/A", "NA", "n/a", "null", "NULL", "None", "none", "", " ", "NaN", "nan",
];

/// Check if a raw cell value denotes a missing value.
///
/// Whitespace-only values count as missing even when they are not in
/// [`NULL_MARKERS`].
pub fn is_null_marker(value: &str) -> bool {
    NULL_MARKERS.contains(&value) || value.trim().is_empty()
}

/// Replace null markers in every text column with nulls.
///
/// Non-text columns are returned untouched. Applying this twice gives the
/// same table as applying it once.
pub fn normalize_nulls(df: &DataFrame) -> Result<DataFrame> {
    let mut df = df.clone();
    let column_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for col_name in &column_names {
        let (normalized, replaced) = {
            let series = df.column(col_name)?.as_materialized_series();
            if series.dtype() != &DataType::String {
                continue;
            }

            let mut replaced = 0usize;
            let values: Vec<Option<&str>> = series
                .str()?
                .into_iter()
                .map(|opt_val| match opt_val {
                    Some(val) if is_null_marker(val) => {
                        replaced += 1;
                        None
                    }
                    other => other,
                })
                .collect();

            (Series::new(series.name().clone(), values), replaced)
        };

        if replaced > 0 {
            debug!("Column '{}': {} null markers normalized", col_name, replaced);
            df.replace(col_name, normalized)?;
        }
    }

    Ok(df)
}
