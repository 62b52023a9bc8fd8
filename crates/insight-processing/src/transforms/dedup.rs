//! Duplicate row removal.

use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Remove rows equal to an earlier row in every column.
///
/// The first occurrence is kept and row order is preserved. Absent values
/// compare equal to each other.
pub fn remove_duplicates(df: &DataFrame) -> Result<DataFrame> {
    if df.height() == 0 || df.width() == 0 {
        return Ok(df.clone());
    }

    let result = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
    debug!(
        "Removed {} duplicate rows",
        df.height() - result.height()
    );
    Ok(result)
}
