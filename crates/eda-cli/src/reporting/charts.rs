//! Chart rendering with plotters (SVG backend).
//!
//! Three kinds of chart are produced: histograms of numeric columns, a
//! missing-value matrix and a correlation heatmap. Degenerate inputs (no
//! numeric columns, no rows, fewer than two numeric columns) simply produce
//! no file for that chart.

use plotters::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{EdaError, Result};
use crate::table::Table;
use crate::types::CorrelationMatrix;
use crate::utils::{format_number, truncate_str, unique_file_stem};

/// Row bands in the missing-value matrix; larger tables are bucketed.
pub const MAX_MISSING_MATRIX_BANDS: usize = 200;

const HIST_SIZE: (u32, u32) = (800, 500);
const FONT: &str = "sans-serif";
const LABEL_WIDTH: i32 = 140;
const HEADER_HEIGHT: i32 = 60;

pub struct ChartRenderer<'a> {
    out_dir: &'a Path,
    max_hist_columns: usize,
    bins: usize,
}

impl<'a> ChartRenderer<'a> {
    pub fn new(out_dir: &'a Path, max_hist_columns: usize, bins: usize) -> Self {
        Self {
            out_dir,
            max_hist_columns,
            bins: bins.max(1),
        }
    }

    /// Render every chart that applies; returns the written file names.
    pub fn render_all(&self, table: &Table, correlation: &CorrelationMatrix) -> Result<Vec<String>> {
        let mut files = self.render_histograms(table)?;
        if let Some(name) = self.render_missing_matrix(table)? {
            files.push(name);
        }
        if let Some(name) = self.render_correlation_heatmap(correlation)? {
            files.push(name);
        }
        Ok(files)
    }

    /// One histogram per numeric column that has values, up to the limit.
    pub fn render_histograms(&self, table: &Table) -> Result<Vec<String>> {
        let mut used = HashSet::new();
        let mut files = Vec::new();

        let candidates = table.numeric_columns().filter_map(|c| {
            let values: Vec<f64> = c.as_numeric()?.iter().flatten().copied().collect();
            if values.is_empty() {
                return None;
            }
            if !has_finite_span(&values) {
                debug!("Value range of '{}' overflows, skipping histogram", c.name());
                return None;
            }
            Some((c.name(), values))
        });

        for (name, values) in candidates.take(self.max_hist_columns) {
            let file_name = format!("hist_{}.svg", unique_file_stem(name, &mut used));
            let path = self.out_dir.join(&file_name);
            draw_histogram(&path, name, &values, self.bins).map_err(|e| failed(&file_name, e))?;
            info!("Chart saved: {}", path.display());
            files.push(file_name);
        }

        if files.is_empty() {
            debug!("No numeric column with values, skipping histograms");
        }
        Ok(files)
    }

    /// Column x row-band grid shaded by the share of missing cells.
    pub fn render_missing_matrix(&self, table: &Table) -> Result<Option<String>> {
        if table.n_rows() == 0 || table.n_cols() == 0 {
            debug!("Empty table, skipping missing-value matrix");
            return Ok(None);
        }

        let file_name = "missing_matrix.svg".to_string();
        let path = self.out_dir.join(&file_name);
        let grid = missing_grid(table, MAX_MISSING_MATRIX_BANDS);
        let names: Vec<&str> = table.column_names();
        draw_missing_matrix(&path, &names, &grid).map_err(|e| failed(&file_name, e))?;
        info!("Chart saved: {}", path.display());
        Ok(Some(file_name))
    }

    pub fn render_correlation_heatmap(
        &self,
        correlation: &CorrelationMatrix,
    ) -> Result<Option<String>> {
        if correlation.is_empty() {
            debug!("No correlation matrix, skipping heatmap");
            return Ok(None);
        }

        let file_name = "correlation_heatmap.svg".to_string();
        let path = self.out_dir.join(&file_name);
        draw_heatmap(&path, correlation).map_err(|e| failed(&file_name, e))?;
        info!("Chart saved: {}", path.display());
        Ok(Some(file_name))
    }
}

fn failed(chart: &str, err: anyhow::Error) -> EdaError {
    EdaError::ChartRenderingFailed {
        chart: chart.to_string(),
        reason: format!("{err:#}"),
    }
}

// ============================================================================
// Data preparation
// ============================================================================

fn value_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

/// `max - min` is representable, so bins and axis bounds stay finite.
pub(crate) fn has_finite_span(values: &[f64]) -> bool {
    let (min, max) = value_range(values);
    (max - min).is_finite()
}

/// Equal-width bins as `(start, end, count)`.
///
/// A single distinct value gets one unit-wide bin centred on it. Empty when
/// the value range overflows.
pub(crate) fn histogram_bins(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    if values.is_empty() || bins == 0 || !has_finite_span(values) {
        return Vec::new();
    }
    let (min, max) = value_range(values);
    if min == max {
        return vec![(min - 0.5, max + 0.5, values.len())];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let start = min + width * i as f64;
            (start, start + width, count)
        })
        .collect()
}

/// Missing share per `[band][column]`, with at most `max_bands` bands.
pub(crate) fn missing_grid(table: &Table, max_bands: usize) -> Vec<Vec<f64>> {
    let n_rows = table.n_rows();
    let bands = n_rows.min(max_bands.max(1));

    (0..bands)
        .map(|b| {
            let start = b * n_rows / bands;
            let end = ((b + 1) * n_rows / bands).max(start + 1);
            table
                .columns()
                .iter()
                .map(|col| {
                    let missing = (start..end).filter(|&r| col.is_missing(r)).count();
                    missing as f64 / (end - start) as f64
                })
                .collect()
        })
        .collect()
}

// ============================================================================
// Drawing
// ============================================================================

fn draw_histogram(path: &Path, name: &str, values: &[f64], bins: usize) -> anyhow::Result<()> {
    let bins = histogram_bins(values, bins);
    let x_min = bins.first().map_or(0.0, |b| b.0);
    let x_max = bins.last().map_or(1.0, |b| b.1);
    let y_max = bins.iter().map(|b| b.2).max().unwrap_or(0).max(1) as f64 * 1.1;

    let root = SVGBackend::new(path, HIST_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Distribution of {}", truncate_str(name, 40)), (FONT, 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc(truncate_str(name, 40))
        .y_desc("Count")
        .x_label_formatter(&|v| format_number(*v))
        .draw()?;

    chart.draw_series(bins.iter().map(|&(start, end, count)| {
        Rectangle::new([(start, 0.0), (end, count as f64)], BLUE.mix(0.6).filled())
    }))?;

    root.present()?;
    Ok(())
}

fn draw_missing_matrix(path: &Path, names: &[&str], grid: &[Vec<f64>]) -> anyhow::Result<()> {
    let cell_w = 40;
    let cell_h = 3;
    let width = LABEL_WIDTH + cell_w * names.len() as i32 + 20;
    let height = HEADER_HEIGHT + cell_h * grid.len() as i32 + 40;

    let root = SVGBackend::new(path, (width as u32, height as u32)).into_drawing_area();
    root.fill(&WHITE)?;
    root.draw(&Text::new(
        "Missing values (dark = missing)".to_string(),
        (10, 10),
        (FONT, 18),
    ))?;

    for (i, name) in names.iter().enumerate() {
        let x = LABEL_WIDTH + cell_w * i as i32;
        root.draw(&Text::new(
            truncate_str(name, 6),
            (x, HEADER_HEIGHT - 18),
            (FONT, 10),
        ))?;
    }

    for (b, band) in grid.iter().enumerate() {
        let y = HEADER_HEIGHT + cell_h * b as i32;
        for (i, share) in band.iter().enumerate() {
            let x = LABEL_WIDTH + cell_w * i as i32;
            let shade = (255.0 * (1.0 - share)).round() as u8;
            root.draw(&Rectangle::new(
                [(x, y), (x + cell_w, y + cell_h)],
                RGBColor(shade, shade, shade).filled(),
            ))?;
        }
    }

    root.draw(&Text::new(
        format!("{} row band(s)", grid.len()),
        (10, HEADER_HEIGHT),
        (FONT, 12),
    ))?;

    root.present()?;
    Ok(())
}

fn draw_heatmap(path: &Path, correlation: &CorrelationMatrix) -> anyhow::Result<()> {
    let n = correlation.columns.len() as i32;
    let cell = 60;
    let size = (LABEL_WIDTH + cell * n + 20) as u32;

    let root = SVGBackend::new(path, (size, size)).into_drawing_area();
    root.fill(&WHITE)?;
    root.draw(&Text::new(
        "Correlation (Pearson)".to_string(),
        (10, 10),
        (FONT, 18),
    ))?;

    for (i, name) in correlation.columns.iter().enumerate() {
        let offset = cell * i as i32;
        root.draw(&Text::new(
            truncate_str(name, 9),
            (LABEL_WIDTH + offset + 2, HEADER_HEIGHT - 18),
            (FONT, 10),
        ))?;
        root.draw(&Text::new(
            truncate_str(name, 18),
            (10, HEADER_HEIGHT + offset + cell / 2 - 6),
            (FONT, 12),
        ))?;
    }

    for (i, row) in correlation.values.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            let x = LABEL_WIDTH + cell * j as i32;
            let y = HEADER_HEIGHT + cell * i as i32;
            root.draw(&Rectangle::new(
                [(x, y), (x + cell, y + cell)],
                heat_color(*value).filled(),
            ))?;
            let label = value.map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}"));
            root.draw(&Text::new(label, (x + 12, y + cell / 2 - 6), (FONT, 12)))?;
        }
    }

    root.present()?;
    Ok(())
}

/// Blue for -1, white for 0, red for +1, grey when undefined.
fn heat_color(value: Option<f64>) -> RGBColor {
    match value {
        None => RGBColor(200, 200, 200),
        Some(r) => {
            let fade = (255.0 * (1.0 - r.abs().min(1.0))).round() as u8;
            if r >= 0.0 {
                RGBColor(255, fade, fade)
            } else {
                RGBColor(fade, fade, 255)
            }
        }
    }
}
