use chrono::Local;
use polars::prelude::*;
use serde_json::json;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::ReportConfig;
use crate::error::{EdaError, Result, ResultExt};
use crate::profiler::flatten_summary;
use crate::types::{
    CategoryTable, CorrelationMatrix, DatasetSummary, MissingEntry, MissingTable, QualityFlags,
    TopCategories,
};
use crate::utils::{format_number, format_percent, unique_file_stem};

/// Entries shown per categorical column in the Markdown report.
const MARKDOWN_CATEGORY_ROWS: usize = 5;

/// Correlation matrices wider than this are only linked, not inlined.
const MARKDOWN_MAX_CORRELATION_COLUMNS: usize = 10;

/// Everything the report is assembled from.
pub struct ReportParams<'a> {
    pub source: &'a Path,
    pub summary: &'a DatasetSummary,
    pub missing: &'a MissingTable,
    pub correlation: &'a CorrelationMatrix,
    pub categories: &'a TopCategories,
    pub flags: &'a QualityFlags,
    /// Chart file names, relative to the output directory.
    pub charts: &'a [String],
}

/// Files written by [`ReportGenerator::generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenReport {
    pub markdown: PathBuf,
    pub quality_json: PathBuf,
    /// CSV tables, relative to the output directory.
    pub tables: Vec<String>,
    pub problematic_columns: Vec<String>,
}

pub struct ReportGenerator<'a> {
    config: &'a ReportConfig,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.out_dir
    }

    /// Create the output directory. Fails fast when it cannot be created.
    pub fn prepare_output_dir(&self) -> Result<()> {
        if self.output_dir().exists() && !self.output_dir().is_dir() {
            return Err(EdaError::ReportGenerationFailed(format!(
                "output path '{}' is not a directory",
                self.output_dir().display()
            )));
        }
        fs::create_dir_all(self.output_dir()).context(format!(
            "Failed to create output directory '{}'",
            self.output_dir().display()
        ))
    }

    /// Write every table, `quality.json` and `report.md`.
    pub fn generate(&self, params: &ReportParams<'_>) -> Result<WrittenReport> {
        self.prepare_output_dir()?;

        let tables = self.write_tables(params)?;
        let quality_json = self.write_quality_json(params)?;

        let problematic_columns: Vec<String> = params
            .missing
            .columns_at_or_above(self.config.min_missing_share)
            .into_iter()
            .map(|e| e.name.clone())
            .collect();

        let markdown = self.render_markdown(params, &tables);
        let markdown_path = self.output_dir().join("report.md");
        write_text(&markdown_path, &markdown)?;
        info!("Report saved: {}", markdown_path.display());

        Ok(WrittenReport {
            markdown: markdown_path,
            quality_json,
            tables,
            problematic_columns,
        })
    }

    // ========================================================================
    // CSV tables
    // ========================================================================

    fn write_tables(&self, params: &ReportParams<'_>) -> Result<Vec<String>> {
        let mut written = Vec::new();

        let mut summary_df = summary_frame(params.summary)?;
        self.write_csv("summary.csv", &mut summary_df)?;
        written.push("summary.csv".to_string());

        if params.missing.is_empty() {
            debug!("Missing table is empty, skipping missing.csv");
        } else {
            let mut df = missing_frame(params.missing.entries())?;
            self.write_csv("missing.csv", &mut df)?;
            written.push("missing.csv".to_string());
        }

        if params.correlation.is_empty() {
            debug!("Correlation matrix is empty, skipping correlation.csv");
        } else {
            let mut df = correlation_frame(params.correlation)?;
            self.write_csv("correlation.csv", &mut df)?;
            written.push("correlation.csv".to_string());
        }

        if !params.categories.is_empty() {
            fs::create_dir_all(self.output_dir().join("top_categories"))
                .context("Failed to create top_categories directory")?;
        }
        let mut used = HashSet::new();
        for table in params.categories.iter() {
            let name = format!(
                "top_categories/{}.csv",
                unique_file_stem(&table.column, &mut used)
            );
            let mut df = category_frame(table)?;
            self.write_csv(&name, &mut df)?;
            written.push(name);
        }

        Ok(written)
    }

    fn write_csv(&self, relative: &str, df: &mut DataFrame) -> Result<()> {
        let path = self.output_dir().join(relative);
        let mut file = File::create(&path).context(format!("Failed to create '{}'", path.display()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(df)
            .context(format!("Failed to write '{}'", path.display()))?;

        info!("Table saved: {}", path.display());
        Ok(())
    }

    // ========================================================================
    // quality.json
    // ========================================================================

    fn write_quality_json(&self, params: &ReportParams<'_>) -> Result<PathBuf> {
        let report = json!({
            "source": source_name(params.source),
            "generated_at": Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            "n_rows": params.summary.n_rows,
            "n_cols": params.summary.n_cols,
            "flags": params.flags,
            "triggered": params.flags.triggered(),
            "parameters": {
                "min_missing_share": self.config.min_missing_share,
                "top_k_categories": self.config.top_k_categories,
                "max_category_columns": self.config.max_category_columns,
                "max_hist_columns": self.config.max_hist_columns,
                "quality": self.config.quality,
            },
        });

        let path = self.output_dir().join("quality.json");
        write_text(&path, &serde_json::to_string_pretty(&report)?)?;
        info!("Quality flags saved: {}", path.display());
        Ok(path)
    }

    // ========================================================================
    // report.md
    // ========================================================================

    fn render_markdown(&self, params: &ReportParams<'_>, tables: &[String]) -> String {
        let cfg = self.config;
        let summary = params.summary;
        let mut md = String::new();

        md.push_str(&format!("# {}\n\n", cfg.title));
        md.push_str(&format!("- Source: `{}`\n", source_name(params.source)));
        md.push_str(&format!(
            "- Generated: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        md.push_str(&format!(
            "- Shape: {} rows x {} columns\n\n",
            summary.n_rows, summary.n_cols
        ));

        md.push_str("## Parameters\n\n");
        md.push_str(&format!(
            "- Problematic missing share: {}\n",
            format_percent(cfg.min_missing_share, 1)
        ));
        md.push_str(&format!("- Top categories per column: {}\n", cfg.top_k_categories));
        md.push_str(&format!(
            "- Categorical columns profiled: up to {}\n",
            cfg.max_category_columns
        ));
        md.push_str(&format!("- Histograms: up to {}\n\n", cfg.max_hist_columns));

        push_quality_section(&mut md, params.flags);

        md.push_str("## Problematic columns\n\n");
        let problematic = params.missing.columns_at_or_above(cfg.min_missing_share);
        if problematic.is_empty() {
            md.push_str(&format!(
                "No column has at least {} missing values.\n\n",
                format_percent(cfg.min_missing_share, 1)
            ));
        } else {
            for entry in problematic {
                md.push_str(&format!(
                    "- `{}`: {} missing ({})\n",
                    entry.name,
                    entry.missing_count,
                    format_percent(entry.missing_share, 1)
                ));
            }
            md.push('\n');
        }

        push_columns_section(&mut md, summary);
        push_missing_section(&mut md, params.missing.entries(), tables);
        push_correlation_section(&mut md, params.correlation);
        push_categories_section(&mut md, params.categories, tables);

        md.push_str("## Charts\n\n");
        if params.charts.is_empty() {
            md.push_str("No charts were produced.\n");
        } else {
            for chart in params.charts {
                md.push_str(&format!("![{chart}]({chart})\n\n"));
            }
        }

        md
    }
}

fn push_quality_section(md: &mut String, flags: &QualityFlags) {
    md.push_str("## Data quality\n\n");
    md.push_str(&format!("- Quality score: {:.2}\n", flags.quality_score));
    md.push_str(&format!(
        "- Max missing share: {}\n\n",
        format_percent(flags.max_missing_share, 1)
    ));

    let triggered = flags.triggered();
    if triggered.is_empty() {
        md.push_str("No quality flags raised.\n\n");
        return;
    }

    for flag in triggered {
        md.push_str(&format!("- **{flag}**\n"));
    }
    md.push('\n');

    if !flags.high_missing_columns.is_empty() {
        md.push_str(&format!(
            "Columns above the missing threshold: {}\n\n",
            code_list(&flags.high_missing_columns)
        ));
    }
    if flags.has_constant_columns {
        md.push_str(&format!(
            "Constant columns: {}\n\n",
            code_list(&flags.constant_columns)
        ));
    }
    for info in &flags.id_duplicates_info {
        md.push_str(&format!(
            "- Identifier `{}`: {} distinct of {} values, duplicate rate {}\n",
            info.name,
            info.unique,
            info.non_missing,
            format_percent(info.duplicate_rate, 1)
        ));
    }
    for info in &flags.high_cardinality_columns {
        md.push_str(&format!(
            "- Categorical `{}`: {} distinct values (threshold {}, ratio {:.2})\n",
            info.name,
            info.unique,
            format_number(info.threshold),
            info.unique_ratio
        ));
    }
    for info in &flags.many_zero_columns {
        md.push_str(&format!(
            "- Numeric `{}`: {} zeros ({})\n",
            info.name,
            info.zero_count,
            format_percent(info.zero_share, 1)
        ));
    }
    md.push('\n');
}

fn push_columns_section(md: &mut String, summary: &DatasetSummary) {
    md.push_str("## Columns\n\n");
    if summary.columns.is_empty() {
        md.push_str("The table has no columns.\n\n");
        return;
    }

    md.push_str("Full table: `summary.csv`\n\n");
    md.push_str("| Column | Kind | Non-missing | Missing | Unique | Mean | Most frequent |\n");
    md.push_str("|---|---|---|---|---|---|---|\n");
    for c in &summary.columns {
        let mean = c
            .numeric
            .map(|s| format!("{:.3}", s.mean))
            .unwrap_or_default();
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            md_cell(&c.name),
            c.kind,
            c.non_missing,
            c.missing,
            c.unique,
            mean,
            md_cell(c.most_frequent.as_deref().unwrap_or(""))
        ));
    }
    md.push('\n');
}

fn push_missing_section(md: &mut String, entries: &[MissingEntry], tables: &[String]) {
    md.push_str("## Missing values\n\n");
    if !tables.iter().any(|t| t == "missing.csv") {
        md.push_str("No columns to report.\n\n");
        return;
    }

    md.push_str("Full table: `missing.csv`\n\n");
    md.push_str("| Column | Missing | Share |\n|---|---|---|\n");
    for e in entries {
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            md_cell(&e.name),
            e.missing_count,
            format_percent(e.missing_share, 1)
        ));
    }
    md.push('\n');
}

fn push_correlation_section(md: &mut String, correlation: &CorrelationMatrix) {
    md.push_str("## Correlation\n\n");
    if correlation.is_empty() {
        md.push_str("Fewer than two numeric columns, no correlation computed.\n\n");
        return;
    }

    md.push_str("Full table: `correlation.csv`\n\n");
    if correlation.columns.len() > MARKDOWN_MAX_CORRELATION_COLUMNS {
        return;
    }

    let header: Vec<String> = correlation.columns.iter().map(|c| md_cell(c)).collect();
    md.push_str(&format!("| | {} |\n", header.join(" | ")));
    md.push_str(&format!("|---|{}\n", "---|".repeat(correlation.columns.len())));
    for (name, row) in correlation.columns.iter().zip(&correlation.values) {
        let cells: Vec<String> = row
            .iter()
            .map(|v| v.map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}")))
            .collect();
        md.push_str(&format!("| {} | {} |\n", md_cell(name), cells.join(" | ")));
    }
    md.push('\n');
}

fn push_categories_section(md: &mut String, categories: &TopCategories, tables: &[String]) {
    md.push_str("## Categorical features\n\n");
    if categories.is_empty() {
        md.push_str("No categorical columns.\n\n");
        return;
    }

    let files = tables.iter().filter(|t| t.starts_with("top_categories/"));
    for (table, file) in categories.iter().zip(files) {
        md.push_str(&format!("### {}\n\nFull table: `{}`\n\n", table.column, file));
        md.push_str("| Value | Count | Share |\n|---|---|---|\n");
        for entry in table.entries.iter().take(MARKDOWN_CATEGORY_ROWS) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                md_cell(&entry.value),
                entry.count,
                format_percent(entry.share, 1)
            ));
        }
        md.push('\n');
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Text safe inside a Markdown table cell.
fn md_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn code_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("`{n}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    let mut file = File::create(path).context(format!("Failed to create '{}'", path.display()))?;
    file.write_all(content.as_bytes())
        .context(format!("Failed to write '{}'", path.display()))
}

fn counts(values: impl Iterator<Item = usize>) -> Vec<u64> {
    values.map(|v| v as u64).collect()
}

fn summary_frame(summary: &DatasetSummary) -> Result<DataFrame> {
    let rows = flatten_summary(summary);
    let df = DataFrame::new(vec![
        Column::new("column".into(), rows.iter().map(|r| r.name.clone()).collect::<Vec<_>>()),
        Column::new("kind".into(), rows.iter().map(|r| r.kind.clone()).collect::<Vec<_>>()),
        Column::new("non_missing".into(), counts(rows.iter().map(|r| r.non_missing))),
        Column::new("missing".into(), counts(rows.iter().map(|r| r.missing))),
        Column::new(
            "missing_share".into(),
            rows.iter().map(|r| r.missing_share).collect::<Vec<_>>(),
        ),
        Column::new("unique".into(), counts(rows.iter().map(|r| r.unique))),
        Column::new("example".into(), rows.iter().map(|r| r.example.clone()).collect::<Vec<_>>()),
        Column::new("min".into(), rows.iter().map(|r| r.min).collect::<Vec<_>>()),
        Column::new("max".into(), rows.iter().map(|r| r.max).collect::<Vec<_>>()),
        Column::new("mean".into(), rows.iter().map(|r| r.mean).collect::<Vec<_>>()),
        Column::new("std".into(), rows.iter().map(|r| r.std).collect::<Vec<_>>()),
        Column::new(
            "most_frequent".into(),
            rows.iter().map(|r| r.most_frequent.clone()).collect::<Vec<_>>(),
        ),
    ])?;
    Ok(df)
}

fn missing_frame(entries: &[MissingEntry]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Column::new("column".into(), entries.iter().map(|e| e.name.clone()).collect::<Vec<_>>()),
        Column::new("missing_count".into(), counts(entries.iter().map(|e| e.missing_count))),
        Column::new(
            "missing_share".into(),
            entries.iter().map(|e| e.missing_share).collect::<Vec<_>>(),
        ),
    ])?;
    Ok(df)
}

fn correlation_frame(correlation: &CorrelationMatrix) -> Result<DataFrame> {
    // The label column must not clash with a numeric column name.
    let mut label = "column".to_string();
    while correlation.columns.contains(&label) {
        label.push('_');
    }

    let mut columns = vec![Column::new(label.as_str().into(), correlation.columns.clone())];
    for (j, name) in correlation.columns.iter().enumerate() {
        let values: Vec<Option<f64>> = correlation.values.iter().map(|row| row[j]).collect();
        columns.push(Column::new(name.as_str().into(), values));
    }
    Ok(DataFrame::new(columns)?)
}

fn category_frame(table: &CategoryTable) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Column::new(
            "value".into(),
            table.entries.iter().map(|e| e.value.clone()).collect::<Vec<_>>(),
        ),
        Column::new("count".into(), counts(table.entries.iter().map(|e| e.count))),
        Column::new(
            "share".into(),
            table.entries.iter().map(|e| e.share).collect::<Vec<_>>(),
        ),
    ])?;
    Ok(df)
}
