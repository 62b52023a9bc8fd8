//! Table-to-table transforms.
//!
//! Every transform borrows the input table and returns a new one, so a
//! failure never leaves a half-modified table behind.

mod columns;
mod dedup;
mod encoding;
mod missing;
mod scaling;

pub use columns::drop_columns;
pub use dedup::remove_duplicates;
pub use encoding::{EncodingMethod, OneHotLimits, label_encode, one_hot_encode};
pub use missing::{MissingStrategy, handle_missing};
pub use scaling::{normalize, resolve_normalize_columns};

use polars::prelude::*;

/// Total number of absent cells in a table.
pub fn total_null_count(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|col| col.null_count()).sum()
}

/// Names of the columns in a table, in order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}
