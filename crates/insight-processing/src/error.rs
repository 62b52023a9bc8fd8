//! Error types for dataset sessions, transforms and reporting.
//!
//! Every failure surfaced to a caller belongs to one of three kinds (see
//! [`ErrorKind`]): problems with the caller's input, a transform whose
//! precondition failed mid-pipeline, or an unexpected internal failure.
//!
//! Errors serialize as `{ code, kind, message }` so a transport layer can
//! forward them without knowing the variants.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Broad classification of an [`InsightError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad request: wrong file type, unknown id/column, invalid parameter,
    /// or a transform precondition the caller can fix.
    ClientInput,
    /// A pipeline step failed; remaining steps were skipped and the
    /// session table was left unchanged.
    TransformFailure,
    /// Unexpected parse or computation failure.
    Internal,
}

/// The main error type for the library.
#[derive(Error, Debug)]
pub enum InsightError {
    /// Uploaded file does not have a supported extension.
    #[error("Only CSV files are allowed (got '{0}')")]
    UnsupportedFileType(String),

    /// The uploaded bytes could not be parsed as a table.
    #[error("Failed to parse file: {0}")]
    ParseFailed(String),

    /// No session with this id.
    #[error("Session '{0}' not found")]
    SessionNotFound(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Unknown missing-value strategy name.
    #[error("Invalid strategy '{0}' (expected one of: mean, median, mode, drop, fill_zero)")]
    InvalidStrategy(String),

    /// Unknown encoding method name.
    #[error("Invalid encoding method '{0}' (expected 'one_hot' or 'label')")]
    InvalidEncodingMethod(String),

    /// Malformed operation request.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// One-hot encoding refused because the column has too many categories.
    #[error(
        "Column '{column}' has {count} unique values. One-hot encoding is not recommended for \
         columns with more than {limit} unique values. Consider using Label Encoding instead, \
         or drop this column."
    )]
    TooManyCategories {
        column: String,
        count: usize,
        limit: usize,
    },

    /// Normalization found nothing numeric to work on.
    #[error("No valid numeric columns found for normalization")]
    NoNumericColumns,

    /// Correlation needs at least two numeric columns.
    #[error("Need at least 2 numeric columns for correlation analysis (found {0})")]
    InsufficientNumericColumns(usize),

    /// A pipeline step failed. Wraps the step's own error.
    #[error("Step {step} ({operation}) failed: {source}")]
    TransformFailed {
        step: usize,
        operation: String,
        #[source]
        source: Box<InsightError>,
    },

    /// Internal error with a short diagnostic.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<InsightError>,
    },
}

impl InsightError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        InsightError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for callers that branch on specific failures.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedFileType(_) => "UNSUPPORTED_FILE_TYPE",
            Self::ParseFailed(_) => "PARSE_FAILED",
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidStrategy(_) => "INVALID_STRATEGY",
            Self::InvalidEncodingMethod(_) => "INVALID_ENCODING_METHOD",
            Self::InvalidOperation(_) => "INVALID_OPERATION",
            Self::TooManyCategories { .. } => "TOO_MANY_CATEGORIES",
            Self::NoNumericColumns => "NO_NUMERIC_COLUMNS",
            Self::InsufficientNumericColumns(_) => "INSUFFICIENT_NUMERIC_COLUMNS",
            Self::TransformFailed { .. } => "TRANSFORM_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Classify the error for the caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFileType(_)
            | Self::ParseFailed(_)
            | Self::SessionNotFound(_)
            | Self::ColumnNotFound(_)
            | Self::InvalidStrategy(_)
            | Self::InvalidEncodingMethod(_)
            | Self::InvalidOperation(_)
            | Self::TooManyCategories { .. }
            | Self::NoNumericColumns
            | Self::InsufficientNumericColumns(_) => ErrorKind::ClientInput,
            Self::TransformFailed { .. } => ErrorKind::TransformFailure,
            Self::Internal(_) | Self::Io(_) | Self::Polars(_) | Self::Json(_) => {
                ErrorKind::Internal
            }
            Self::WithContext { source, .. } => source.kind(),
        }
    }

    /// Message safe to show a caller.
    ///
    /// Internal failures are reduced to a short diagnostic; everything else
    /// is passed through verbatim so the caller can correct the request.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => match self.root() {
                Self::Internal(msg) => format!("Internal error: {msg}"),
                other => format!("Internal error ({})", other.error_code()),
            },
            _ => self.to_string(),
        }
    }

    /// Check if this error was caused by a missing session.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.root(),
            Self::SessionNotFound(_) | Self::ColumnNotFound(_)
        )
    }

    fn root(&self) -> &InsightError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

impl Serialize for InsightError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("InsightError", 3)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("message", &self.public_message())?;
        state.end()
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, InsightError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| InsightError::Polars(e).with_context(context))
    }
}

impl From<anyhow::Error> for InsightError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<InsightError>() {
            Ok(inner) => inner,
            Err(err) => match err.downcast::<polars::error::PolarsError>() {
                Ok(polars_err) => InsightError::Polars(polars_err),
                Err(other) => InsightError::Internal(other.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            InsightError::SessionNotFound("abc".to_string()).error_code(),
            "SESSION_NOT_FOUND"
        );
        assert_eq!(
            InsightError::ColumnNotFound("test".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(InsightError::NoNumericColumns.kind(), ErrorKind::ClientInput);
        assert_eq!(
            InsightError::Internal("boom".to_string()).kind(),
            ErrorKind::Internal
        );

        let failed = InsightError::TransformFailed {
            step: 1,
            operation: "one_hot_encode".to_string(),
            source: Box::new(InsightError::NoNumericColumns),
        };
        assert_eq!(failed.kind(), ErrorKind::TransformFailure);
    }

    #[test]
    fn test_too_many_categories_message() {
        let error = InsightError::TooManyCategories {
            column: "city".to_string(),
            count: 137,
            limit: 100,
        };
        let message = error.to_string();
        assert!(message.contains("Column 'city' has 137 unique values"));
        assert!(message.contains("more than 100"));
    }

    #[test]
    fn test_transform_failed_carries_step_message() {
        let error = InsightError::TransformFailed {
            step: 2,
            operation: "normalize".to_string(),
            source: Box::new(InsightError::NoNumericColumns),
        };
        let message = error.to_string();
        assert!(message.contains("normalize"));
        assert!(message.contains("No valid numeric columns"));
    }

    #[test]
    fn test_error_serialization() {
        let error = InsightError::ColumnNotFound("Age".to_string());
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["code"], "COLUMN_NOT_FOUND");
        assert_eq!(json["kind"], "client_input");
        assert!(json["message"].as_str().unwrap().contains("Age"));
    }

    #[test]
    fn test_internal_message_is_short() {
        let io = std::io::Error::other("disk exploded at /secret/path");
        let error = InsightError::Io(io).with_context("Writing CSV");
        assert_eq!(error.public_message(), "Internal error (IO_ERROR)");
    }

    #[test]
    fn test_with_context() {
        let error =
            InsightError::ColumnNotFound("test".to_string()).with_context("During analysis");
        assert!(error.to_string().contains("During analysis"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_from_anyhow_preserves_variant() {
        let err: anyhow::Error = InsightError::NoNumericColumns.into();
        let converted: InsightError = err.into();
        assert!(matches!(converted, InsightError::NoNumericColumns));

        let converted: InsightError = anyhow::anyhow!("odd failure").into();
        assert!(matches!(converted, InsightError::Internal(_)));
    }
}
