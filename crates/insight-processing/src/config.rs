//! Configuration for the dataset service.
//!
//! Uses the builder pattern; [`ServiceConfigBuilder::build`] validates the
//! result so an invalid configuration never reaches the service.

use serde::{Deserialize, Serialize};

/// Configuration for [`crate::DatasetService`] and the transforms it runs.
///
/// # Example
///
/// ```rust,ignore
/// use insight_processing::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .max_one_hot_categories(50)
///     .histogram_bins(20)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// One-hot encoding fails for columns with more distinct values than this.
    /// Default: 100
    pub max_one_hot_categories: usize,

    /// One-hot encoding logs a warning above this many distinct values.
    /// Default: 50
    pub one_hot_warning_threshold: usize,

    /// Number of equal-width bins in numeric histograms.
    /// Default: 15
    pub histogram_bins: usize,

    /// Number of values reported in categorical frequency tables.
    /// Default: 15
    pub top_values_limit: usize,

    /// Rows returned by preview when the caller does not ask for a count.
    /// Default: 10
    pub preview_rows: usize,

    /// Leading rows included in dataset summaries.
    /// Default: 5
    pub summary_head_rows: usize,

    /// Accepted upload file extensions (lowercase, without the dot).
    /// Default: ["csv"]
    pub allowed_extensions: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_one_hot_categories: 100,
            one_hot_warning_threshold: 50,
            histogram_bins: 15,
            top_values_limit: 15,
            preview_rows: 10,
            summary_head_rows: 5,
            allowed_extensions: vec!["csv".to_string()],
        }
    }
}

impl ServiceConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in [
            ("max_one_hot_categories", self.max_one_hot_categories),
            ("histogram_bins", self.histogram_bins),
            ("top_values_limit", self.top_values_limit),
            ("preview_rows", self.preview_rows),
        ] {
            if value == 0 {
                return Err(ConfigValidationError::ZeroLimit(field.to_string()));
            }
        }

        if self.one_hot_warning_threshold > self.max_one_hot_categories {
            return Err(ConfigValidationError::WarningAboveLimit {
                warning: self.one_hot_warning_threshold,
                limit: self.max_one_hot_categories,
            });
        }

        if self.allowed_extensions.is_empty() {
            return Err(ConfigValidationError::NoExtensions);
        }

        Ok(())
    }

    /// Check whether a filename carries one of the allowed extensions.
    pub fn accepts_filename(&self, filename: &str) -> bool {
        std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.allowed_extensions.iter().any(|allowed| *allowed == ext)
            })
            .unwrap_or(false)
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{0}': must be at least 1")]
    ZeroLimit(String),

    #[error("One-hot warning threshold {warning} exceeds the category limit {limit}")]
    WarningAboveLimit { warning: usize, limit: usize },

    #[error("At least one allowed file extension is required")]
    NoExtensions,
}

/// Builder for [`ServiceConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ServiceConfigBuilder {
    max_one_hot_categories: Option<usize>,
    one_hot_warning_threshold: Option<usize>,
    histogram_bins: Option<usize>,
    top_values_limit: Option<usize>,
    preview_rows: Option<usize>,
    summary_head_rows: Option<usize>,
    allowed_extensions: Option<Vec<String>>,
}

impl ServiceConfigBuilder {
    /// Set the distinct-value limit above which one-hot encoding fails.
    pub fn max_one_hot_categories(mut self, limit: usize) -> Self {
        self.max_one_hot_categories = Some(limit);
        self
    }

    /// Set the distinct-value count above which one-hot encoding warns.
    pub fn one_hot_warning_threshold(mut self, threshold: usize) -> Self {
        self.one_hot_warning_threshold = Some(threshold);
        self
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the size of categorical frequency tables.
    pub fn top_values_limit(mut self, limit: usize) -> Self {
        self.top_values_limit = Some(limit);
        self
    }

    /// Set the default preview row count.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Set how many leading rows summaries include.
    pub fn summary_head_rows(mut self, rows: usize) -> Self {
        self.summary_head_rows = Some(rows);
        self
    }

    /// Set the accepted upload extensions.
    ///
    /// Extensions are compared case-insensitively; a leading dot is ignored.
    pub fn allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = Some(
            extensions
                .into_iter()
                .map(|ext| ext.into().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        );
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ServiceConfig` or an error if validation fails.
    pub fn build(self) -> Result<ServiceConfig, ConfigValidationError> {
        let defaults = ServiceConfig::default();
        let config = ServiceConfig {
            max_one_hot_categories: self
                .max_one_hot_categories
                .unwrap_or(defaults.max_one_hot_categories),
            one_hot_warning_threshold: self
                .one_hot_warning_threshold
                .unwrap_or(defaults.one_hot_warning_threshold),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            top_values_limit: self.top_values_limit.unwrap_or(defaults.top_values_limit),
            preview_rows: self.preview_rows.unwrap_or(defaults.preview_rows),
            summary_head_rows: self.summary_head_rows.unwrap_or(defaults.summary_head_rows),
            allowed_extensions: self
                .allowed_extensions
                .unwrap_or(defaults.allowed_extensions),
        };

        config.validate()?;
        Ok(config)
    }
}
