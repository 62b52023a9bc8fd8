//! Column removal.

use polars::prelude::*;
use tracing::debug;

/// Remove the named columns. Names not present in the table are ignored.
pub fn drop_columns(df: &DataFrame, columns: &[String]) -> DataFrame {
    let existing: Vec<PlSmallStr> = columns
        .iter()
        .filter(|name| df.column(name.as_str()).is_ok())
        .map(|name| name.as_str().into())
        .collect();

    if existing.is_empty() {
        debug!("drop_columns: none of {:?} present", columns);
        return df.clone();
    }

    debug!("Dropping {} columns: {:?}", existing.len(), existing);
    df.drop_many(existing)
}
