//! Read-only projections of a table for clients.
//!
//! Nothing in here mutates a table. Every projection degrades gracefully on
//! empty tables and on columns that contain only absent values.
//!
//! # Example
//!
//! ```rust,ignore
//! use insight_processing::reporting::{analyze_column, correlation_report, dataset_summary};
//!
//! let summary = dataset_summary(&df, 5)?;
//! let analysis = analyze_column(&df, "age", &ServiceConfig::default())?;
//! let correlations = correlation_report(&df)?;
//!
//! println!("{}", serde_json::to_string_pretty(&summary)?);
//! ```

mod column;
mod correlation;
mod histogram;
mod preview;
mod summary;

pub use column::{CategoricalStats, ColumnAnalysis, NumericStats, ValueCount, analyze_column, top_values};
pub use correlation::{CorrelationPair, CorrelationReport, correlation_report};
pub use histogram::{HistogramBin, histogram};
pub use preview::{TablePreview, preview};
pub use summary::{column_info, dataset_summary};
