//! Report generation module.
//!
//! This module writes the report artifacts into an output directory:
//! CSV tables (summary, missing values, correlation, top categories),
//! `quality.json`, SVG charts and a Markdown narrative tying them together.
//!
//! # Example
//!
//! ```rust,ignore
//! use eda_cli::reporting::{ChartRenderer, ReportGenerator, ReportParams};
//!
//! let charts = ChartRenderer::new(&config.out_dir, 6, 20).render_all(&table, &correlation)?;
//! let written = ReportGenerator::new(&config).generate(&ReportParams {
//!     source: path,
//!     summary: &summary,
//!     missing: &missing,
//!     correlation: &correlation,
//!     categories: &categories,
//!     flags: &flags,
//!     charts: &charts,
//! })?;
//! println!("{}", written.markdown.display());
//! ```

mod charts;
mod generator;

pub use charts::{ChartRenderer, MAX_MISSING_MATRIX_BANDS};
pub use generator::{ReportGenerator, ReportParams, WrittenReport};
