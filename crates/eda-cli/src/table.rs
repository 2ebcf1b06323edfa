//! Column-oriented in-memory table.
//!
//! A [`Table`] is an ordered list of named [`Column`]s of equal length. Each
//! column holds a single kind of value, fixed at construction time, so every
//! analysis downstream can dispatch on [`ColumnKind`] instead of probing
//! values.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{EdaError, Result};
use crate::utils::{format_number, normalize_cell, parse_boolean, parse_numeric};

/// Inferred kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Categorical,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Categorical => "categorical",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Values of a column; `None` is a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Text(Vec<Option<String>>),
}

/// A named, single-kind column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, ColumnData::Numeric(values))
    }

    pub fn boolean(name: impl Into<String>, values: Vec<Option<bool>>) -> Self {
        Self::new(name, ColumnData::Boolean(values))
    }

    pub fn text<S: Into<String>>(name: impl Into<String>, values: Vec<Option<S>>) -> Self {
        Self::new(
            name,
            ColumnData::Text(values.into_iter().map(|v| v.map(Into::into)).collect()),
        )
    }

    /// Build a column from raw cell text, inferring its kind.
    ///
    /// Cells are normalized first (blank cells and missing markers become
    /// `None`). The column is numeric when every remaining cell is a numeric
    /// literal, boolean when every remaining cell is `true`/`false`, and
    /// categorical otherwise. A column without any value is numeric.
    pub fn infer<'a, I>(name: impl Into<String>, raw: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let cells: Vec<Option<String>> = raw.into_iter().map(normalize_cell).collect();

        let numeric: Option<Vec<Option<f64>>> = cells
            .iter()
            .map(|cell| match cell {
                None => Some(None),
                Some(s) => parse_numeric(s).map(Some),
            })
            .collect();
        if let Some(values) = numeric {
            return Self::numeric(name, values);
        }

        let boolean: Option<Vec<Option<bool>>> = cells
            .iter()
            .map(|cell| match cell {
                None => Some(None),
                Some(s) => parse_boolean(s).map(Some),
            })
            .collect();
        if let Some(values) = boolean {
            return Self::boolean(name, values);
        }

        Self::new(name, ColumnData::Text(cells))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn kind(&self) -> ColumnKind {
        match self.data {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Boolean(_) => ColumnKind::Boolean,
            ColumnData::Text(_) => ColumnKind::Categorical,
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match &self.data {
            ColumnData::Numeric(v) => v.get(row).is_none_or(Option::is_none),
            ColumnData::Boolean(v) => v.get(row).is_none_or(Option::is_none),
            ColumnData::Text(v) => v.get(row).is_none_or(Option::is_none),
        }
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_missing(i)).count()
    }

    pub fn non_missing_count(&self) -> usize {
        self.len() - self.missing_count()
    }

    /// Numeric values, if this is a numeric column.
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            _ => None,
        }
    }

    /// Text form of a cell, `None` when missing or out of range.
    pub fn display_value(&self, row: usize) -> Option<String> {
        match &self.data {
            ColumnData::Numeric(v) => v.get(row).copied().flatten().map(format_number),
            ColumnData::Boolean(v) => v.get(row).copied().flatten().map(|b| b.to_string()),
            ColumnData::Text(v) => v.get(row).cloned().flatten(),
        }
    }

    /// Non-missing cells as text, in row order.
    pub fn non_missing_values(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.len()).filter_map(|i| self.display_value(i))
    }

    fn slice(&self, rows: usize) -> Self {
        let data = match &self.data {
            ColumnData::Numeric(v) => ColumnData::Numeric(v.iter().take(rows).copied().collect()),
            ColumnData::Boolean(v) => ColumnData::Boolean(v.iter().take(rows).copied().collect()),
            ColumnData::Text(v) => ColumnData::Text(v.iter().take(rows).cloned().collect()),
        };
        Self::new(self.name.clone(), data)
    }
}

/// Ordered collection of equal-length, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

static_assertions::assert_impl_all!(Table: Send, Sync);

impl Table {
    /// Build a table, checking that lengths agree and names are unique.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, Column::len);

        let mut seen = HashSet::new();
        for col in &columns {
            if col.len() != n_rows {
                return Err(EdaError::InvalidTable(format!(
                    "column '{}' has {} rows, expected {}",
                    col.name(),
                    col.len(),
                    n_rows
                )));
            }
            if !seen.insert(col.name()) {
                return Err(EdaError::InvalidTable(format!(
                    "duplicate column name '{}'",
                    col.name()
                )));
            }
        }

        Ok(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.kind().is_numeric())
    }

    pub fn non_numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.kind().is_numeric())
    }

    /// The first `n` rows (all rows when `n` exceeds the row count).
    pub fn head(&self, n: usize) -> Table {
        let rows = n.min(self.n_rows);
        Table {
            columns: self.columns.iter().map(|c| c.slice(rows)).collect(),
            n_rows: rows,
        }
    }

    /// Row-major text view, missing cells rendered as `None`.
    pub fn rows_as_text(&self) -> Vec<Vec<Option<String>>> {
        (0..self.n_rows)
            .map(|row| self.columns.iter().map(|c| c.display_value(row)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_numeric_with_missing() {
        let col = Column::infer("age", [Some("10"), Some("20"), Some(""), Some("NaN")]);
        assert_eq!(col.kind(), ColumnKind::Numeric);
        assert_eq!(col.missing_count(), 2);
        assert_eq!(
            col.as_numeric().unwrap(),
            &[Some(10.0), Some(20.0), None, None]
        );
    }

    #[test]
    fn test_infer_boolean() {
        let col = Column::infer("flag", [Some("True"), Some("false"), None]);
        assert_eq!(col.kind(), ColumnKind::Boolean);
        assert_eq!(col.display_value(0).as_deref(), Some("true"));
    }

    #[test]
    fn test_infer_categorical_when_any_value_is_text() {
        let col = Column::infer("code", [Some("1"), Some("2"), Some("x")]);
        assert_eq!(col.kind(), ColumnKind::Categorical);
        assert_eq!(col.display_value(2).as_deref(), Some("x"));
    }

    #[test]
    fn test_infer_all_missing_is_numeric() {
        let col = Column::infer("empty", [None, Some(""), Some("NA")]);
        assert_eq!(col.kind(), ColumnKind::Numeric);
        assert_eq!(col.non_missing_count(), 0);
    }

    #[test]
    fn test_table_rejects_unequal_lengths() {
        let result = Table::new(vec![
            Column::numeric("a", vec![Some(1.0), Some(2.0)]),
            Column::numeric("b", vec![Some(1.0)]),
        ]);
        assert!(matches!(result, Err(EdaError::InvalidTable(_))));
    }

    #[test]
    fn test_table_rejects_duplicate_names() {
        let result = Table::new(vec![
            Column::numeric("a", vec![Some(1.0)]),
            Column::text("a", vec![Some("x")]),
        ]);
        assert!(matches!(result, Err(EdaError::InvalidTable(_))));
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new(Vec::new()).unwrap();
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.n_cols(), 0);
        assert!(table.rows_as_text().is_empty());
    }

    #[test]
    fn test_head_clamps_to_row_count() {
        let table = Table::new(vec![
            Column::numeric("a", vec![Some(1.0), Some(2.0), None]),
            Column::text("b", vec![Some("x"), None, Some("z")]),
        ])
        .unwrap();

        let head = table.head(2);
        assert_eq!(head.n_rows(), 2);
        assert_eq!(
            head.rows_as_text(),
            vec![
                vec![Some("1".to_string()), Some("x".to_string())],
                vec![Some("2".to_string()), None],
            ]
        );
        assert_eq!(table.head(10).n_rows(), 3);
    }
}
