//! Dataset profiling.
//!
//! This module provides the analytical passes over a loaded [`Table`]:
//! - Per-column summary statistics
//! - Missing-value counts
//! - Pearson correlation between numeric columns
//! - Top-K frequency tables for non-numeric columns
//!
//! Every function here is total: degenerate tables (no rows, no columns)
//! give empty or neutral results, never errors.

mod categories;
mod correlation;
mod missing;
mod statistics;

pub use categories::top_categories;
pub use correlation::correlation_matrix;
pub use missing::missing_table;

use tracing::debug;

use crate::table::{Column, Table};
use crate::types::{ColumnSummary, DatasetSummary, SummaryRow};
use missing::share;

/// Summarize every column of a table.
pub fn summarize_dataset(table: &Table) -> DatasetSummary {
    let columns: Vec<ColumnSummary> = table
        .columns()
        .iter()
        .map(|col| summarize_column(col, table.n_rows()))
        .collect();

    debug!(
        "Summarized {} column(s) over {} row(s)",
        columns.len(),
        table.n_rows()
    );

    DatasetSummary {
        n_rows: table.n_rows(),
        n_cols: table.n_cols(),
        columns,
    }
}

fn summarize_column(column: &Column, n_rows: usize) -> ColumnSummary {
    let kind = column.kind();
    let missing = column.missing_count();
    let non_missing = column.len() - missing;

    let numeric = column.as_numeric().and_then(statistics::numeric_stats);
    let most_frequent = if kind.is_numeric() {
        None
    } else {
        statistics::mode(column)
    };

    ColumnSummary {
        name: column.name().to_string(),
        kind,
        non_missing,
        missing,
        missing_share: share(missing, n_rows),
        unique: statistics::distinct_count(column),
        example: column.non_missing_values().next(),
        numeric,
        most_frequent,
    }
}

/// Flatten a summary into one printable row per column.
pub fn flatten_summary(summary: &DatasetSummary) -> Vec<SummaryRow> {
    summary
        .columns
        .iter()
        .map(|c| SummaryRow {
            name: c.name.clone(),
            kind: c.kind.to_string(),
            non_missing: c.non_missing,
            missing: c.missing,
            missing_share: c.missing_share,
            unique: c.unique,
            example: c.example.clone().unwrap_or_default(),
            min: c.numeric.map(|s| s.min),
            max: c.numeric.map(|s| s.max),
            mean: c.numeric.map(|s| s.mean),
            std: c.numeric.map(|s| s.std),
            most_frequent: c.most_frequent.clone().unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnKind;

    fn sample() -> Table {
        Table::new(vec![
            Column::numeric("age", vec![Some(10.0), Some(20.0), Some(30.0), None]),
            Column::numeric("height", vec![Some(140.0), Some(150.0), Some(160.0), Some(170.0)]),
            Column::text("city", vec![Some("A"), Some("B"), Some("A"), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_summarize_dataset_shape() {
        let summary = summarize_dataset(&sample());
        assert_eq!(summary.n_rows, 4);
        assert_eq!(summary.n_cols, 3);
        let names: Vec<&str> = summary.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["age", "height", "city"]);
    }

    #[test]
    fn test_column_summary_details() {
        let summary = summarize_dataset(&sample());

        let age = summary.column("age").unwrap();
        assert_eq!(age.kind, ColumnKind::Numeric);
        assert_eq!(age.missing, 1);
        assert_eq!(age.non_missing, 3);
        assert_eq!(age.missing_share, 0.25);
        assert_eq!(age.unique, 3);
        assert_eq!(age.example.as_deref(), Some("10"));
        assert_eq!(age.numeric.unwrap().mean, 20.0);
        assert!(age.most_frequent.is_none());

        let city = summary.column("city").unwrap();
        assert_eq!(city.kind, ColumnKind::Categorical);
        assert_eq!(city.unique, 2);
        assert_eq!(city.most_frequent.as_deref(), Some("A"));
        assert!(city.numeric.is_none());
    }

    #[test]
    fn test_all_missing_numeric_has_no_stats() {
        let table = Table::new(vec![Column::numeric("x", vec![None, None])]).unwrap();
        let summary = summarize_dataset(&table);
        let x = summary.column("x").unwrap();
        assert!(x.numeric.is_none());
        assert_eq!(x.missing_share, 1.0);
        assert_eq!(x.example, None);
    }

    #[test]
    fn test_empty_table_summary() {
        let summary = summarize_dataset(&Table::default());
        assert_eq!(summary.n_rows, 0);
        assert_eq!(summary.n_cols, 0);
        assert!(summary.columns.is_empty());
        assert!(flatten_summary(&summary).is_empty());
    }

    #[test]
    fn test_flatten_summary() {
        let rows = flatten_summary(&summarize_dataset(&sample()));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].kind, "numeric");
        assert_eq!(rows[0].min, Some(10.0));
        assert_eq!(rows[2].min, None);
        assert_eq!(rows[2].most_frequent, "A");
    }
}
