//! Exploratory Data Analysis Library
//!
//! Loads a delimited text file into an explicit column store and produces
//! exploratory-data-analysis artifacts from it.
//!
//! # Overview
//!
//! - **Loading**: any delimiter, any WHATWG text encoding, explicit type inference
//! - **Profiling**: per-column summary, missing values, Pearson correlation,
//!   top-K category tables
//! - **Quality Heuristics**: configurable flags with evidence and a quality score
//! - **Reporting**: CSV tables, `quality.json`, SVG charts and a Markdown report
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use eda_cli::{LoadOptions, ReportConfig, commands};
//! use std::path::Path;
//!
//! let options = LoadOptions::from_cli(";", "windows-1251")?;
//!
//! // Overview only
//! let summary = commands::overview(Path::new("data.csv"), &options)?;
//! println!("{} rows x {} columns", summary.n_rows, summary.n_cols);
//!
//! // Full report
//! let config = ReportConfig::default()
//!     .with_out_dir("reports")
//!     .with_top_k_categories(10);
//! let outcome = commands::report(Path::new("data.csv"), &options, &config)?;
//! println!("Quality score: {:.2}", outcome.flags.quality_score);
//! ```
//!
//! # Library use without files
//!
//! ```rust,ignore
//! use eda_cli::{Column, Table, QualityConfig};
//! use eda_cli::profiler::{missing_table, summarize_dataset};
//! use eda_cli::quality::compute_quality_flags;
//!
//! let table = Table::new(vec![
//!     Column::numeric("revenue", vec![Some(0.0), Some(0.0), Some(0.0)]),
//! ])?;
//! let summary = summarize_dataset(&table);
//! let flags = compute_quality_flags(&summary, &missing_table(&table), &QualityConfig::default());
//! assert!(flags.has_many_zero_values);
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod loader;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    ConfigValidationError, LoadOptions, QualityConfig, QualityConfigBuilder, QualityPenalties,
    ReportConfig,
};
pub use error::{EdaError, LoadError, Result as EdaResult, ResultExt};
pub use loader::{load_table, parse_delimited};
pub use quality::{QualityAnalyzer, cardinality_threshold, compute_quality_flags};
pub use reporting::{ChartRenderer, ReportGenerator, ReportParams, WrittenReport};
pub use table::{Column, ColumnData, ColumnKind, Table};
pub use types::{
    CategoryEntry, CategoryTable, ColumnSummary, CorrelationMatrix, DatasetSummary,
    HighCardinalityInfo, IdDuplicateInfo, MissingEntry, MissingTable, NumericStats, QualityFlag,
    QualityFlags, SummaryRow, TopCategories, ZeroShareInfo,
};
