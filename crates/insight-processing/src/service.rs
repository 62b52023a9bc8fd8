//! Dataset service: the operations a client can invoke on a session.
//!
//! [`DatasetService`] owns the configuration, the pipeline executor and a
//! handle to the [`SessionStore`]. Every method is synchronous and returns
//! a serde-serializable response, so any transport can wrap it.
//!
//! Anything that changes a session's table runs as a pipeline inside
//! [`SessionStore::update`]: either every step succeeds and the session
//! sees the final table, or the session keeps its previous table.

use crate::cleaner::normalize_nulls;
use crate::config::ServiceConfig;
use crate::error::{InsightError, Result};
use crate::io::{read_csv_bytes, write_csv_bytes};
use crate::pipeline::{Operation, PipelineExecutor, PipelineOutcome, StepRecord};
use crate::profiler::TypeInferrer;
use crate::reporting::{
    ColumnAnalysis, CorrelationReport, TablePreview, analyze_column, correlation_report,
    dataset_summary, preview,
};
use crate::session::SessionStore;
use crate::transforms::{
    EncodingMethod, MissingStrategy, column_names, resolve_normalize_columns, total_null_count,
};
use crate::types::{ColumnInfo, DatasetSummary, InferredColumn};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub type CorrelationResponse = CorrelationReport;
pub type PreviewResponse = TablePreview;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    pub filename: String,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub datetime_columns: Vec<String>,
    pub column_info: Vec<ColumnInfo>,
    pub inferred_columns: Vec<InferredColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessResponse {
    pub message: String,
    pub summary: DatasetSummary,
    pub steps: Vec<StepRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropColumnsResponse {
    pub message: String,
    pub dropped_columns: Vec<String>,
    pub remaining_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleMissingResponse {
    pub message: String,
    pub strategy: MissingStrategy,
    pub original_null_count: usize,
    pub new_null_count: usize,
    pub rows_before: usize,
    pub rows_after: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeResponse {
    pub message: String,
    pub method: EncodingMethod,
    pub encoded_columns: Vec<String>,
    pub new_column_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeResponse {
    pub message: String,
    pub normalized_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveDuplicatesResponse {
    pub message: String,
    pub original_rows: usize,
    pub new_rows: usize,
    pub duplicates_removed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub filename: String,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    pub operations_applied: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// A single-operation call reports the step's own error rather than the
/// pipeline wrapper around it.
fn single_step_error(err: InsightError) -> InsightError {
    match err {
        InsightError::TransformFailed { source, .. } => *source,
        other => other,
    }
}

/// Session-scoped dataset operations.
///
/// # Example
///
/// ```rust,ignore
/// use insight_processing::{DatasetService, Operation, ServiceConfig};
///
/// let service = DatasetService::new(ServiceConfig::default());
/// let upload = service.upload(&std::fs::read("sales.csv")?, "sales.csv")?;
///
/// let ops = Operation::list_from_json(r#"[{"type": "remove_duplicates"}]"#)?;
/// let result = service.preprocess(&upload.session_id, &ops)?;
/// println!("{} rows left", result.summary.rows);
/// ```
#[derive(Debug)]
pub struct DatasetService {
    config: ServiceConfig,
    store: Arc<SessionStore>,
    executor: PipelineExecutor,
}

impl Default for DatasetService {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

impl DatasetService {
    /// Create a service with its own empty session store.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_store(config, Arc::new(SessionStore::new()))
    }

    /// Create a service over an existing store.
    pub fn with_store(config: ServiceConfig, store: Arc<SessionStore>) -> Self {
        let executor = PipelineExecutor::from_config(&config);
        Self {
            config,
            store,
            executor,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Parse CSV bytes, normalize null markers and infer column types.
    ///
    /// This is the upload path without a session.
    pub fn ingest(bytes: &[u8]) -> Result<(DataFrame, Vec<InferredColumn>)> {
        let raw = read_csv_bytes(bytes)?;
        let cleaned = normalize_nulls(&raw)?;
        TypeInferrer::infer_and_coerce(&cleaned)
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Ingest an uploaded file into a new session.
    ///
    /// # Errors
    ///
    /// * [`InsightError::UnsupportedFileType`] for a disallowed extension
    /// * [`InsightError::ParseFailed`] when the bytes are not valid CSV
    pub fn upload(&self, bytes: &[u8], filename: &str) -> Result<UploadResponse> {
        if !self.config.accepts_filename(filename) {
            warn!("Rejected upload '{}': unsupported file type", filename);
            return Err(InsightError::UnsupportedFileType(filename.to_string()));
        }

        let (table, inferred_columns) = Self::ingest(bytes)?;
        let summary = dataset_summary(&table, 0)?;
        let session_id = self.store.create(table, filename);

        info!(
            "Uploaded '{}' as session {} ({} rows x {} columns)",
            filename, session_id, summary.rows, summary.columns
        );

        Ok(UploadResponse {
            session_id,
            filename: filename.to_string(),
            rows: summary.rows,
            columns: summary.columns,
            column_names: summary.column_names,
            numeric_columns: summary.numeric_columns,
            categorical_columns: summary.categorical_columns,
            datetime_columns: summary.datetime_columns,
            column_info: summary.column_info,
            inferred_columns,
        })
    }

    pub fn session_info(&self, id: &str) -> Result<SessionInfo> {
        let snapshot = self.store.snapshot(id)?;
        Ok(SessionInfo {
            session_id: snapshot.id,
            filename: snapshot.metadata.filename,
            rows: snapshot.table.height(),
            columns: snapshot.table.width(),
            column_names: column_names(&snapshot.table),
            created_at: snapshot.metadata.created_at,
            updated_at: snapshot.metadata.updated_at,
            operations_applied: snapshot.metadata.operations_applied,
        })
    }

    pub fn delete_session(&self, id: &str) -> Result<MessageResponse> {
        self.store.delete(id)?;
        Ok(MessageResponse {
            message: "Session deleted successfully".to_string(),
        })
    }

    /// Current table as CSV bytes with a header row.
    pub fn download(&self, id: &str) -> Result<Vec<u8>> {
        write_csv_bytes(&self.store.get(id)?)
    }

    // ========================================================================
    // Reporting
    // ========================================================================

    pub fn summary(&self, id: &str) -> Result<DatasetSummary> {
        dataset_summary(&self.store.get(id)?, self.config.summary_head_rows)
    }

    pub fn analyze_column(&self, id: &str, column: &str) -> Result<ColumnAnalysis> {
        analyze_column(&self.store.get(id)?, column, &self.config)
    }

    pub fn correlations(&self, id: &str) -> Result<CorrelationResponse> {
        correlation_report(&self.store.get(id)?)
    }

    /// First `rows` rows (the configured default when `None`).
    pub fn preview(&self, id: &str, rows: Option<usize>) -> Result<PreviewResponse> {
        preview(
            &self.store.get(id)?,
            rows.unwrap_or(self.config.preview_rows),
        )
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    /// Run operations against a session under its exclusive lock.
    ///
    /// `respond` sees the table before the run and the outcome; the session
    /// table is swapped only if both the pipeline and `respond` succeed.
    fn run_pipeline<T>(
        &self,
        id: &str,
        operations: &[Operation],
        respond: impl FnOnce(&DataFrame, &PipelineOutcome) -> Result<T>,
    ) -> Result<T> {
        let names: Vec<String> = operations.iter().map(|op| op.name().to_string()).collect();

        self.store.update(id, &names, |current| {
            let outcome = self.executor.execute(current, operations)?;
            let response = respond(current, &outcome)?;
            Ok((outcome.table, response))
        })
    }

    /// Apply an ordered list of operations atomically.
    pub fn preprocess(&self, id: &str, operations: &[Operation]) -> Result<PreprocessResponse> {
        let head_rows = self.config.summary_head_rows;
        self.run_pipeline(id, operations, |_, outcome| {
            Ok(PreprocessResponse {
                message: "Preprocessing completed successfully".to_string(),
                summary: dataset_summary(&outcome.table, head_rows)?,
                steps: outcome.steps.clone(),
            })
        })
    }

    pub fn drop_columns(&self, id: &str, columns: &[String]) -> Result<DropColumnsResponse> {
        let operation = Operation::DropColumns {
            columns: columns.to_vec(),
        };
        self.run_pipeline(id, &[operation], |before, outcome| {
            let dropped_columns: Vec<String> = columns
                .iter()
                .filter(|name| before.column(name).is_ok())
                .cloned()
                .collect();
            Ok(DropColumnsResponse {
                message: format!("Dropped {} columns", dropped_columns.len()),
                dropped_columns,
                remaining_columns: column_names(&outcome.table),
            })
        })
        .map_err(single_step_error)
    }

    /// Handle missing values with a strategy given by name.
    ///
    /// # Errors
    ///
    /// [`InsightError::InvalidStrategy`] for an unknown strategy name.
    pub fn handle_missing(&self, id: &str, strategy: &str) -> Result<HandleMissingResponse> {
        let strategy: MissingStrategy = strategy.parse()?;
        self.run_pipeline(id, &[Operation::HandleMissing { strategy }], |before, outcome| {
            Ok(HandleMissingResponse {
                message: "Missing values handled".to_string(),
                strategy,
                original_null_count: total_null_count(before),
                new_null_count: total_null_count(&outcome.table),
                rows_before: before.height(),
                rows_after: outcome.table.height(),
            })
        })
        .map_err(single_step_error)
    }

    /// Encode columns with a method given by name (`one_hot` or `label`).
    ///
    /// # Errors
    ///
    /// * [`InsightError::InvalidEncodingMethod`] for an unknown method
    /// * [`InsightError::ColumnNotFound`] / [`InsightError::TooManyCategories`]
    ///   from one-hot encoding
    pub fn encode(&self, id: &str, columns: &[String], method: &str) -> Result<EncodeResponse> {
        let method: EncodingMethod = method.parse()?;
        let operation = match method {
            EncodingMethod::OneHot => Operation::OneHotEncode {
                columns: columns.to_vec(),
            },
            EncodingMethod::Label => Operation::LabelEncode {
                columns: columns.to_vec(),
            },
        };

        self.run_pipeline(id, &[operation], |_, outcome| {
            Ok(EncodeResponse {
                message: format!("Applied {} encoding", method.as_str()),
                method,
                encoded_columns: columns.to_vec(),
                new_column_count: outcome.table.width(),
            })
        })
        .map_err(single_step_error)
    }

    /// Z-score normalize the named numeric columns, or all numeric columns.
    pub fn normalize(&self, id: &str, columns: Option<&[String]>) -> Result<NormalizeResponse> {
        let operation = Operation::Normalize {
            columns: columns.map(<[String]>::to_vec),
        };
        self.run_pipeline(id, &[operation], |before, _| {
            Ok(NormalizeResponse {
                message: "Data normalized".to_string(),
                normalized_columns: resolve_normalize_columns(before, columns),
            })
        })
        .map_err(single_step_error)
    }

    pub fn remove_duplicates(&self, id: &str) -> Result<RemoveDuplicatesResponse> {
        self.run_pipeline(id, &[Operation::RemoveDuplicates], |before, outcome| {
            let original_rows = before.height();
            let new_rows = outcome.table.height();
            Ok(RemoveDuplicatesResponse {
                message: "Duplicates removed".to_string(),
                original_rows,
                new_rows,
                duplicates_removed: original_rows - new_rows,
            })
        })
        .map_err(single_step_error)
    }
}
