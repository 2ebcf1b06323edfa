//! Command surface: one function per operation, each returning a structured
//! result. Presentation (text tables, exit codes) lives in the binary.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{LoadOptions, ReportConfig};
use crate::error::{EdaError, Result};
use crate::loader::load_table;
use crate::profiler::{correlation_matrix, missing_table, summarize_dataset, top_categories};
use crate::quality::compute_quality_flags;
use crate::reporting::{ChartRenderer, ReportGenerator, ReportParams};
use crate::types::{DatasetSummary, QualityFlags};

/// First rows of a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadPreview {
    pub requested: usize,
    pub shown: usize,
    pub total_rows: usize,
    /// `true` when fewer rows exist than were requested.
    pub clamped: bool,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Where the report went and what it found.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    pub out_dir: PathBuf,
    pub markdown: PathBuf,
    pub quality_json: PathBuf,
    pub tables: Vec<String>,
    pub charts: Vec<String>,
    pub problematic_columns: Vec<String>,
    pub flags: QualityFlags,
}

/// Preview the first `n` rows; `n` is clamped to the row count.
pub fn head(path: &Path, options: &LoadOptions, n: usize) -> Result<HeadPreview> {
    let table = load_table(path, options)?;
    let preview = table.head(n);

    Ok(HeadPreview {
        requested: n,
        shown: preview.n_rows(),
        total_rows: table.n_rows(),
        clamped: n > table.n_rows(),
        columns: table.column_names().into_iter().map(String::from).collect(),
        rows: preview.rows_as_text(),
    })
}

/// Row/column counts plus per-column summary.
pub fn overview(path: &Path, options: &LoadOptions) -> Result<DatasetSummary> {
    let table = load_table(path, options)?;
    Ok(summarize_dataset(&table))
}

/// Run every analysis and write the full report into `config.out_dir`.
pub fn report(path: &Path, options: &LoadOptions, config: &ReportConfig) -> Result<ReportOutcome> {
    config.validate().map_err(EdaError::from)?;
    let table = load_table(path, options)?;

    info!("Analyzing {} rows x {} columns", table.n_rows(), table.n_cols());
    let summary = summarize_dataset(&table);
    let missing = missing_table(&table);
    let correlation = correlation_matrix(&table);
    let categories = top_categories(&table, config.max_category_columns, config.top_k_categories);
    let flags = compute_quality_flags(&summary, &missing, &config.quality);

    let generator = ReportGenerator::new(config);
    generator.prepare_output_dir()?;

    let charts = ChartRenderer::new(&config.out_dir, config.max_hist_columns, config.histogram_bins)
        .render_all(&table, &correlation)?;

    let written = generator.generate(&ReportParams {
        source: path,
        summary: &summary,
        missing: &missing,
        correlation: &correlation,
        categories: &categories,
        flags: &flags,
        charts: &charts,
    })?;

    info!(
        "Report complete: {} table(s), {} chart(s), quality score {:.2}",
        written.tables.len(),
        charts.len(),
        flags.quality_score
    );

    Ok(ReportOutcome {
        out_dir: config.out_dir.clone(),
        markdown: written.markdown,
        quality_json: written.quality_json,
        tables: written.tables,
        charts,
        problematic_columns: written.problematic_columns,
        flags,
    })
}
