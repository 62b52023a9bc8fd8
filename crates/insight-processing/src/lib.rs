//! Dataset Inspection and Preprocessing Library
//!
//! Upload a CSV, inspect its schema and statistics, apply an ordered list
//! of cleaning and transformation operations, and download the result.
//! Built on Polars.
//!
//! # Overview
//!
//! - **Null Normalization**: Textual null markers (`N/A`, `-`, `null`, ...) become real nulls
//! - **Type Inference**: Every column is classified as numeric, categorical or datetime and coerced
//! - **Transforms**: Column dropping, missing-value handling, one-hot/label encoding,
//!   z-score normalization, duplicate removal
//! - **Pipelines**: Ordered operation lists applied atomically per session
//! - **Reporting**: Dataset summaries, column analysis with chart data, correlations, previews
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use insight_processing::{DatasetService, Operation, ServiceConfig};
//!
//! let service = DatasetService::new(ServiceConfig::default());
//!
//! // Upload creates a session holding the typed table
//! let upload = service.upload(&std::fs::read("data.csv")?, "data.csv")?;
//! println!("Numeric columns: {:?}", upload.numeric_columns);
//!
//! // Apply a pipeline; on failure the session keeps its previous table
//! let ops = Operation::list_from_json(r#"[
//!     {"type": "handle_missing", "strategy": "median"},
//!     {"type": "one_hot_encode", "columns": ["city"]},
//!     {"type": "normalize"}
//! ]"#)?;
//! let result = service.preprocess(&upload.session_id, &ops)?;
//!
//! // Download the processed table as CSV
//! let csv = service.download(&upload.session_id)?;
//! ```
//!
//! # Configuration
//!
//! Use [`ServiceConfig`] to adjust limits:
//!
//! ```rust,ignore
//! use insight_processing::ServiceConfig;
//!
//! let config = ServiceConfig::builder()
//!     .max_one_hot_categories(100)    // Refuse one-hot encoding above 100 values
//!     .one_hot_warning_threshold(50)  // Warn above 50 values
//!     .histogram_bins(15)
//!     .preview_rows(10)
//!     .build()?;
//! ```
//!
//! # Working Without Sessions
//!
//! The building blocks are usable on plain tables:
//!
//! ```rust,ignore
//! use insight_processing::{DatasetService, PipelineExecutor, Operation};
//! use insight_processing::reporting::dataset_summary;
//!
//! let (df, _inferred) = DatasetService::ingest(&bytes)?;
//! let outcome = PipelineExecutor::default().execute(&df, &[Operation::RemoveDuplicates])?;
//! let summary = dataset_summary(&outcome.table, 5)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod service;
pub mod session;
pub mod transforms;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{is_null_marker, normalize_nulls};
pub use config::{ConfigValidationError, ServiceConfig, ServiceConfigBuilder};
pub use error::{ErrorKind, InsightError, Result as InsightResult, ResultExt};
pub use io::{read_csv_bytes, write_csv_bytes};
pub use pipeline::{Operation, PipelineExecutor, PipelineOutcome, StepRecord};
pub use profiler::TypeInferrer;
pub use reporting::{
    ColumnAnalysis, CorrelationReport, HistogramBin, TablePreview, ValueCount,
};
pub use service::{
    CorrelationResponse, DatasetService, DropColumnsResponse, EncodeResponse,
    HandleMissingResponse, MessageResponse, NormalizeResponse, PreprocessResponse,
    PreviewResponse, RemoveDuplicatesResponse, SessionInfo, UploadResponse,
};
pub use session::{SessionMetadata, SessionSnapshot, SessionStore};
pub use transforms::{EncodingMethod, MissingStrategy, OneHotLimits};
pub use types::{ColumnInfo, ColumnKind, DatasetSummary, InferredColumn};
