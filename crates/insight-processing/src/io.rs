//! CSV reading and writing.
//!
//! Uploads are read with schema inference switched off so every column
//! arrives as text; typing is left to [`crate::profiler::TypeInferrer`].

use crate::error::{InsightError, Result, ResultExt};
use crate::utils::{column_json_values, is_datetime_dtype};
use polars::prelude::*;
use serde_json::Value;
use std::io::Cursor;
use tracing::debug;

/// Parse CSV bytes with a header row into an all-text table.
///
/// # Errors
///
/// [`InsightError::ParseFailed`] carrying the parser message.
pub fn read_csv_bytes(bytes: &[u8]) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
        .map_err(|e| InsightError::ParseFailed(e.to_string()))?;

    debug!("Parsed CSV into {:?}", df.shape());
    Ok(df)
}

/// Serialize a table as CSV with a header row.
///
/// Datetime columns are written as ISO-8601 text so the output reads back
/// through the same inference as the original upload.
pub fn write_csv_bytes(df: &DataFrame) -> Result<Vec<u8>> {
    let mut out = df.clone();

    for column in df.get_columns() {
        let series = column.as_materialized_series();
        if !is_datetime_dtype(series.dtype()) {
            continue;
        }
        let text: Vec<Option<String>> = column_json_values(series)?
            .into_iter()
            .map(|value| match value {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect();
        out.replace(series.name().as_str(), Series::new(series.name().clone(), text))?;
    }

    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(&mut out)
        .context("Writing CSV")?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_bytes_reads_text() {
        let df = read_csv_bytes(b"a,b\n1,x\n2,y\n").unwrap();
        assert_eq!(df.shape(), (2, 2));
        assert_eq!(df.column("a").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_read_csv_bytes_rejects_empty_input() {
        let err = read_csv_bytes(b"").unwrap_err();
        assert!(matches!(err, InsightError::ParseFailed(_)));
    }

    #[test]
    fn test_write_csv_bytes_header_and_rows() {
        let df = df![
            "n" => [1i64, 2],
            "s" => ["a", "b"],
        ]
        .unwrap();
        let text = String::from_utf8(write_csv_bytes(&df).unwrap()).unwrap();
        assert_eq!(text, "n,s\n1,a\n2,b\n");
    }

    #[test]
    fn test_write_csv_bytes_iso_datetimes() {
        let df = Series::new("t".into(), &[86_400_000i64])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap()
            .into_frame();
        let text = String::from_utf8(write_csv_bytes(&df).unwrap()).unwrap();
        assert_eq!(text, "t\n1970-01-02T00:00:00\n");
    }
}
