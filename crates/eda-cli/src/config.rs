//! Configuration types for loading and reporting.
//!
//! [`QualityConfig`] carries every threshold used by the quality heuristics and
//! follows the builder pattern; it is also (de)serializable so the thresholds
//! can be kept in a JSON file and partially overridden from the command line.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EdaError, Result, ResultExt};

/// Options for the tabular loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Field delimiter byte.
    /// Default: b','
    pub delimiter: u8,

    /// Text encoding label (any WHATWG label, e.g. "utf-8", "windows-1251").
    /// Default: "utf-8"
    pub encoding: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            encoding: "utf-8".to_string(),
        }
    }
}

impl LoadOptions {
    /// Build options from the textual form used on the command line.
    ///
    /// The separator must be exactly one ASCII character (`\t` is accepted as
    /// an escape for tab).
    pub fn from_cli(sep: &str, encoding: &str) -> Result<Self> {
        let delimiter = match sep {
            "\\t" => b'\t',
            s if s.len() == 1 && s.is_ascii() => s.as_bytes()[0],
            other => {
                return Err(EdaError::InvalidConfig(format!(
                    "separator must be a single ASCII character, got '{other}'"
                )));
            }
        };

        Ok(Self {
            delimiter,
            encoding: encoding.to_string(),
        })
    }
}

/// Score penalty applied once per raised quality flag type.
///
/// Each penalty must lie in `(0.0, 1.0]` so that any raised flag lowers the
/// score strictly below 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityPenalties {
    pub too_few_rows: f64,
    pub too_many_columns: f64,
    pub too_many_missing: f64,
    pub constant_columns: f64,
    pub suspicious_id_duplicates: f64,
    pub high_cardinality_categoricals: f64,
    pub many_zero_values: f64,
}

impl Default for QualityPenalties {
    fn default() -> Self {
        Self {
            too_few_rows: 0.2,
            too_many_columns: 0.1,
            too_many_missing: 0.3,
            constant_columns: 0.1,
            suspicious_id_duplicates: 0.15,
            high_cardinality_categoricals: 0.1,
            many_zero_values: 0.1,
        }
    }
}

impl QualityPenalties {
    fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("penalties.too_few_rows", self.too_few_rows),
            ("penalties.too_many_columns", self.too_many_columns),
            ("penalties.too_many_missing", self.too_many_missing),
            ("penalties.constant_columns", self.constant_columns),
            ("penalties.suspicious_id_duplicates", self.suspicious_id_duplicates),
            (
                "penalties.high_cardinality_categoricals",
                self.high_cardinality_categoricals,
            ),
            ("penalties.many_zero_values", self.many_zero_values),
        ]
    }
}

/// Thresholds for the quality heuristics.
///
/// Use [`QualityConfig::builder()`] for a fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use eda_cli::config::QualityConfig;
///
/// let config = QualityConfig::builder()
///     .min_rows(50)
///     .max_missing_share(0.3)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Tables with fewer rows are flagged as too small.
    /// Default: 10
    pub min_rows: usize,

    /// Tables with more columns are flagged as too wide.
    /// Default: 100
    pub max_columns: usize,

    /// A column whose missing share exceeds this is flagged (0.0 - 1.0).
    /// Default: 0.5
    pub max_missing_share: f64,

    /// A numeric column whose share of zeros reaches this is flagged (0.0 - 1.0).
    /// Default: 0.8
    pub zero_share_threshold: f64,

    /// Regex matched against column names to pick identifier candidates.
    /// Default: "(?i)id"
    pub id_name_pattern: String,

    /// Columns whose distinct count reaches this share of the row count are
    /// treated as identifier candidates regardless of their name.
    /// Default: 0.95
    pub id_uniqueness_ratio: f64,

    /// Floor of the high-cardinality threshold for small tables.
    /// Default: 5
    pub cardinality_min_unique: usize,

    /// Share of the row count used as the small-table threshold.
    /// Default: 0.05
    pub cardinality_small_ratio: f64,

    /// Largest row count still treated as a small table.
    /// Default: 100
    pub small_table_max_rows: usize,

    /// Floor of the high-cardinality threshold for large tables.
    /// Default: 50
    pub cardinality_large_min_unique: usize,

    /// Share of the row count used as the large-table threshold.
    /// Default: 0.05
    pub cardinality_large_ratio: f64,

    /// Categorical columns with at least `cardinality_min_unique` distinct
    /// values are also flagged once distinct/non-missing exceeds this ratio.
    /// Default: 0.5
    pub max_unique_ratio: f64,

    /// Score penalties per flag type.
    pub penalties: QualityPenalties,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_rows: 10,
            max_columns: 100,
            max_missing_share: 0.5,
            zero_share_threshold: 0.8,
            id_name_pattern: "(?i)id".to_string(),
            id_uniqueness_ratio: 0.95,
            cardinality_min_unique: 5,
            cardinality_small_ratio: 0.05,
            small_table_max_rows: 100,
            cardinality_large_min_unique: 50,
            cardinality_large_ratio: 0.05,
            max_unique_ratio: 0.5,
            penalties: QualityPenalties::default(),
        }
    }
}

impl QualityConfig {
    /// Create a new configuration builder.
    pub fn builder() -> QualityConfigBuilder {
        QualityConfigBuilder::default()
    }

    /// Load thresholds from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config '{}'", path.display()))?;
        let config: QualityConfig = serde_json::from_str(&content)
            .map_err(|e| EdaError::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        let shares = [
            ("max_missing_share", self.max_missing_share),
            ("zero_share_threshold", self.zero_share_threshold),
            ("id_uniqueness_ratio", self.id_uniqueness_ratio),
            ("cardinality_small_ratio", self.cardinality_small_ratio),
            ("cardinality_large_ratio", self.cardinality_large_ratio),
            ("max_unique_ratio", self.max_unique_ratio),
        ];
        for (field, value) in shares {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValidationError::InvalidThreshold {
                    field: field.to_string(),
                    value,
                });
            }
        }

        for (field, value) in self.penalties.entries() {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigValidationError::InvalidPenalty {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if let Err(e) = regex::Regex::new(&self.id_name_pattern) {
            return Err(ConfigValidationError::InvalidPattern(e.to_string()));
        }

        // The large-table threshold must never undercut the small-table one.
        let small_boundary = (self.cardinality_min_unique as f64)
            .max(self.small_table_max_rows as f64 * self.cardinality_small_ratio);
        if (self.cardinality_large_min_unique as f64) < small_boundary
            || self.cardinality_large_ratio < self.cardinality_small_ratio
        {
            return Err(ConfigValidationError::NonMonotonicCardinality);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid penalty for '{field}': {value} (must be in (0.0, 1.0])")]
    InvalidPenalty { field: String, value: f64 },

    #[error("Invalid identifier pattern: {0}")]
    InvalidPattern(String),

    #[error("Large-table cardinality threshold must not be lower than the small-table one")]
    NonMonotonicCardinality,
}

/// Builder for [`QualityConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct QualityConfigBuilder {
    base: Option<QualityConfig>,
    min_rows: Option<usize>,
    max_columns: Option<usize>,
    max_missing_share: Option<f64>,
    zero_share_threshold: Option<f64>,
    id_name_pattern: Option<String>,
    id_uniqueness_ratio: Option<f64>,
    max_unique_ratio: Option<f64>,
    penalties: Option<QualityPenalties>,
}

impl QualityConfigBuilder {
    /// Start from an existing configuration (e.g. one loaded from a file)
    /// instead of the defaults.
    pub fn base(mut self, config: QualityConfig) -> Self {
        self.base = Some(config);
        self
    }

    /// Set the minimum number of rows.
    pub fn min_rows(mut self, rows: usize) -> Self {
        self.min_rows = Some(rows);
        self
    }

    /// Set the maximum number of columns.
    pub fn max_columns(mut self, columns: usize) -> Self {
        self.max_columns = Some(columns);
        self
    }

    /// Set the per-column missing share above which the table is flagged.
    ///
    /// # Arguments
    /// * `share` - Value between 0.0 and 1.0 (e.g., 0.5 = 50%)
    pub fn max_missing_share(mut self, share: f64) -> Self {
        self.max_missing_share = Some(share);
        self
    }

    /// Set the share of zeros at which a numeric column is flagged.
    pub fn zero_share_threshold(mut self, share: f64) -> Self {
        self.zero_share_threshold = Some(share);
        self
    }

    /// Set the regex used to recognise identifier columns by name.
    pub fn id_name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.id_name_pattern = Some(pattern.into());
        self
    }

    /// Set the distinct/row share that marks a column as identifier-like.
    pub fn id_uniqueness_ratio(mut self, ratio: f64) -> Self {
        self.id_uniqueness_ratio = Some(ratio);
        self
    }

    /// Set the distinct/non-missing ratio above which categoricals are flagged.
    pub fn max_unique_ratio(mut self, ratio: f64) -> Self {
        self.max_unique_ratio = Some(ratio);
        self
    }

    /// Replace the score penalties.
    pub fn penalties(mut self, penalties: QualityPenalties) -> Self {
        self.penalties = Some(penalties);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `QualityConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<QualityConfig, ConfigValidationError> {
        let base = self.base.unwrap_or_default();
        let config = QualityConfig {
            min_rows: self.min_rows.unwrap_or(base.min_rows),
            max_columns: self.max_columns.unwrap_or(base.max_columns),
            max_missing_share: self.max_missing_share.unwrap_or(base.max_missing_share),
            zero_share_threshold: self
                .zero_share_threshold
                .unwrap_or(base.zero_share_threshold),
            id_name_pattern: self.id_name_pattern.unwrap_or(base.id_name_pattern),
            id_uniqueness_ratio: self.id_uniqueness_ratio.unwrap_or(base.id_uniqueness_ratio),
            max_unique_ratio: self.max_unique_ratio.unwrap_or(base.max_unique_ratio),
            penalties: self.penalties.unwrap_or(base.penalties),
            ..base
        };

        config.validate()?;
        Ok(config)
    }
}

/// Parameters of the `report` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory receiving every artifact.
    /// Default: "reports"
    pub out_dir: PathBuf,

    /// Report title.
    /// Default: "EDA report"
    pub title: String,

    /// Maximum number of numeric columns that get a histogram.
    /// Default: 6
    pub max_hist_columns: usize,

    /// Number of top values kept per categorical column.
    /// Default: 5
    pub top_k_categories: usize,

    /// Maximum number of categorical columns profiled.
    /// Default: 20
    pub max_category_columns: usize,

    /// Columns whose missing share reaches this are listed as problematic.
    /// Default: 0.1
    pub min_missing_share: f64,

    /// Number of equal-width histogram bins.
    /// Default: 20
    pub histogram_bins: usize,

    /// Quality heuristic thresholds.
    pub quality: QualityConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("reports"),
            title: "EDA report".to_string(),
            max_hist_columns: 6,
            top_k_categories: 5,
            max_category_columns: 20,
            min_missing_share: 0.1,
            histogram_bins: 20,
            quality: QualityConfig::default(),
        }
    }
}

impl ReportConfig {
    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_max_hist_columns(mut self, n: usize) -> Self {
        self.max_hist_columns = n;
        self
    }

    pub fn with_top_k_categories(mut self, k: usize) -> Self {
        self.top_k_categories = k;
        self
    }

    pub fn with_max_category_columns(mut self, n: usize) -> Self {
        self.max_category_columns = n;
        self
    }

    pub fn with_min_missing_share(mut self, share: f64) -> Self {
        self.min_missing_share = share;
        self
    }

    pub fn with_quality(mut self, quality: QualityConfig) -> Self {
        self.quality = quality;
        self
    }

    /// Validate report parameters, including the nested quality thresholds.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.min_missing_share) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "min_missing_share".to_string(),
                value: self.min_missing_share,
            });
        }
        self.quality.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QualityConfig::default();
        assert_eq!(config.min_rows, 10);
        assert_eq!(config.max_columns, 100);
        assert_eq!(config.max_missing_share, 0.5);
        assert_eq!(config.zero_share_threshold, 0.8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = QualityConfig::builder()
            .min_rows(50)
            .max_columns(10)
            .max_missing_share(0.3)
            .build()
            .unwrap();

        assert_eq!(config.min_rows, 50);
        assert_eq!(config.max_columns, 10);
        assert_eq!(config.max_missing_share, 0.3);
        assert_eq!(config.zero_share_threshold, 0.8);
    }

    #[test]
    fn test_builder_keeps_base_values() {
        let base = QualityConfig {
            min_rows: 3,
            ..QualityConfig::default()
        };
        let config = QualityConfig::builder()
            .base(base)
            .max_columns(7)
            .build()
            .unwrap();
        assert_eq!(config.min_rows, 3);
        assert_eq!(config.max_columns, 7);
    }

    #[test]
    fn test_validation_invalid_threshold() {
        let result = QualityConfig::builder().max_missing_share(1.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThreshold { .. }
        ));
    }

    #[test]
    fn test_validation_zero_penalty_rejected() {
        let penalties = QualityPenalties {
            constant_columns: 0.0,
            ..QualityPenalties::default()
        };
        let result = QualityConfig::builder().penalties(penalties).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidPenalty { .. }
        ));
    }

    #[test]
    fn test_validation_bad_pattern() {
        let result = QualityConfig::builder().id_name_pattern("(").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidPattern(_)
        ));
    }

    #[test]
    fn test_validation_non_monotonic_cardinality() {
        let config = QualityConfig {
            cardinality_large_min_unique: 2,
            ..QualityConfig::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigValidationError::NonMonotonicCardinality
        ));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "min_rows": 25, "penalties": { "too_many_missing": 0.5 } }"#;
        let config: QualityConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.min_rows, 25);
        assert_eq!(config.max_columns, 100);
        assert_eq!(config.penalties.too_many_missing, 0.5);
        assert_eq!(config.penalties.too_few_rows, 0.2);
    }

    #[test]
    fn test_load_options_from_cli() {
        let opts = LoadOptions::from_cli(";", "windows-1251").unwrap();
        assert_eq!(opts.delimiter, b';');
        assert_eq!(opts.encoding, "windows-1251");
        assert_eq!(LoadOptions::from_cli("\\t", "utf-8").unwrap().delimiter, b'\t');
        assert!(LoadOptions::from_cli(";;", "utf-8").is_err());
    }

    #[test]
    fn test_report_config_rejects_bad_missing_share() {
        let config = ReportConfig::default().with_min_missing_share(-0.1);
        assert!(config.validate().is_err());
    }
}
