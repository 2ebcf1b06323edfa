//! Data quality heuristics.
//!
//! This module turns a dataset summary and missing-value table into a set of
//! boolean flags (too few rows, constant columns, duplicated identifiers,
//! high-cardinality categoricals, zero-dominated columns...), each paired with
//! the evidence that raised it, and a single quality score in `[0, 1]`.

mod analyzer;

pub use analyzer::{QualityAnalyzer, cardinality_threshold};

use crate::config::QualityConfig;
use crate::types::{DatasetSummary, MissingTable, QualityFlags};

/// Compute quality flags and score. Never fails, even for empty inputs.
pub fn compute_quality_flags(
    summary: &DatasetSummary,
    missing: &MissingTable,
    config: &QualityConfig,
) -> QualityFlags {
    QualityAnalyzer::analyze(summary, missing, config)
}
