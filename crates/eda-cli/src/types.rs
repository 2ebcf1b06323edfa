use serde::{Deserialize, Serialize};
use std::fmt;

use crate::table::ColumnKind;

// ============================================================================
// Summary
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation; 0.0 with a single value.
    pub std: f64,
    pub zero_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: ColumnKind,
    pub non_missing: usize,
    pub missing: usize,
    pub missing_share: f64,
    pub unique: usize,
    pub example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_frequent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub n_rows: usize,
    pub n_cols: usize,
    pub columns: Vec<ColumnSummary>,
}

impl DatasetSummary {
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// One printable row of the flattened summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub name: String,
    pub kind: String,
    pub non_missing: usize,
    pub missing: usize,
    pub missing_share: f64,
    pub unique: usize,
    pub example: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub most_frequent: String,
}

// ============================================================================
// Missing values
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingEntry {
    pub name: String,
    pub missing_count: usize,
    pub missing_share: f64,
}

/// Per-column missing counts, in table column order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct MissingTable {
    entries: Vec<MissingEntry>,
}

impl MissingTable {
    pub fn new(entries: Vec<MissingEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&MissingEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entries(&self) -> &[MissingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest missing share of any column, 0.0 for an empty table.
    pub fn max_missing_share(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.missing_share)
            .fold(0.0, f64::max)
    }

    /// Columns whose missing share is at least `share`.
    pub fn columns_at_or_above(&self, share: f64) -> Vec<&MissingEntry> {
        self.entries
            .iter()
            .filter(|e| e.missing_share >= share)
            .collect()
    }
}

// ============================================================================
// Correlation
// ============================================================================

/// Pearson correlation between numeric columns.
///
/// `values[i][j]` is `None` when the coefficient is undefined for that pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values.get(i)?.get(j).copied().flatten()
    }
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryEntry {
    pub value: String,
    pub count: usize,
    pub share: f64,
}

/// Most frequent values of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTable {
    pub column: String,
    pub non_missing: usize,
    pub entries: Vec<CategoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct TopCategories {
    tables: Vec<CategoryTable>,
}

impl TopCategories {
    pub fn new(tables: Vec<CategoryTable>) -> Self {
        Self { tables }
    }

    pub fn get(&self, column: &str) -> Option<&CategoryTable> {
        self.tables.iter().find(|t| t.column == column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryTable> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// ============================================================================
// Quality
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    TooFewRows,
    TooManyColumns,
    TooManyMissing,
    ConstantColumns,
    SuspiciousIdDuplicates,
    HighCardinalityCategoricals,
    ManyZeroValues,
}

impl QualityFlag {
    pub fn description(&self) -> &'static str {
        match self {
            Self::TooFewRows => "Too few rows",
            Self::TooManyColumns => "Too many columns",
            Self::TooManyMissing => "Too many missing values",
            Self::ConstantColumns => "Constant columns",
            Self::SuspiciousIdDuplicates => "Duplicated identifiers",
            Self::HighCardinalityCategoricals => "High-cardinality categoricals",
            Self::ManyZeroValues => "Columns dominated by zeros",
        }
    }
}

impl fmt::Display for QualityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.description())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdDuplicateInfo {
    pub name: String,
    pub unique: usize,
    pub non_missing: usize,
    pub duplicate_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighCardinalityInfo {
    pub name: String,
    pub unique: usize,
    pub threshold: f64,
    pub unique_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZeroShareInfo {
    pub name: String,
    pub zero_count: usize,
    pub zero_share: f64,
}

/// Heuristic quality signals with their evidence.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct QualityFlags {
    pub too_few_rows: bool,
    pub too_many_columns: bool,
    pub too_many_missing: bool,
    pub max_missing_share: f64,
    pub high_missing_columns: Vec<String>,
    pub has_constant_columns: bool,
    pub constant_columns: Vec<String>,
    pub has_suspicious_id_duplicates: bool,
    pub id_duplicates_info: Vec<IdDuplicateInfo>,
    pub has_high_cardinality_categoricals: bool,
    pub high_cardinality_columns: Vec<HighCardinalityInfo>,
    pub has_many_zero_values: bool,
    pub many_zero_columns: Vec<ZeroShareInfo>,
    pub quality_score: f64,
}

impl QualityFlags {
    /// Raised flags, in a fixed order.
    pub fn triggered(&self) -> Vec<QualityFlag> {
        [
            (self.too_few_rows, QualityFlag::TooFewRows),
            (self.too_many_columns, QualityFlag::TooManyColumns),
            (self.too_many_missing, QualityFlag::TooManyMissing),
            (self.has_constant_columns, QualityFlag::ConstantColumns),
            (
                self.has_suspicious_id_duplicates,
                QualityFlag::SuspiciousIdDuplicates,
            ),
            (
                self.has_high_cardinality_categoricals,
                QualityFlag::HighCardinalityCategoricals,
            ),
            (self.has_many_zero_values, QualityFlag::ManyZeroValues),
        ]
        .into_iter()
        .filter_map(|(raised, flag)| raised.then_some(flag))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_table_empty_max_is_zero() {
        let table = MissingTable::default();
        assert!(table.is_empty());
        assert_eq!(table.max_missing_share(), 0.0);
        assert!(table.columns_at_or_above(0.0).is_empty());
    }

    #[test]
    fn test_missing_table_lookup() {
        let table = MissingTable::new(vec![
            MissingEntry {
                name: "a".to_string(),
                missing_count: 1,
                missing_share: 0.25,
            },
            MissingEntry {
                name: "b".to_string(),
                missing_count: 0,
                missing_share: 0.0,
            },
        ]);
        assert_eq!(table.get("a").map(|e| e.missing_count), Some(1));
        assert!(table.get("zzz").is_none());
        assert_eq!(table.max_missing_share(), 0.25);
        assert_eq!(table.columns_at_or_above(0.1).len(), 1);
    }

    #[test]
    fn test_triggered_flags() {
        let flags = QualityFlags {
            too_few_rows: true,
            has_many_zero_values: true,
            ..QualityFlags::default()
        };
        assert_eq!(
            flags.triggered(),
            vec![QualityFlag::TooFewRows, QualityFlag::ManyZeroValues]
        );
        assert!(QualityFlags::default().triggered().is_empty());
    }
}
