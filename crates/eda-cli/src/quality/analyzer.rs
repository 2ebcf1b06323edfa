use regex::Regex;
use tracing::{debug, warn};

use crate::config::QualityConfig;
use crate::table::ColumnKind;
use crate::types::{
    DatasetSummary, HighCardinalityInfo, IdDuplicateInfo, MissingTable, QualityFlags,
    ZeroShareInfo,
};

/// High-cardinality threshold for a table of `n_rows` rows.
///
/// Small tables (up to `small_table_max_rows`) use
/// `max(cardinality_min_unique, n_rows * cardinality_small_ratio)`; larger
/// tables use `max(cardinality_large_min_unique, n_rows * cardinality_large_ratio)`.
/// With a validated config the result never decreases as `n_rows` grows.
pub fn cardinality_threshold(n_rows: usize, config: &QualityConfig) -> f64 {
    let rows = n_rows as f64;
    if n_rows <= config.small_table_max_rows {
        (config.cardinality_min_unique as f64).max(rows * config.cardinality_small_ratio)
    } else {
        (config.cardinality_large_min_unique as f64).max(rows * config.cardinality_large_ratio)
    }
}

pub struct QualityAnalyzer;

impl QualityAnalyzer {
    /// Evaluate every heuristic and combine them into a score.
    pub fn analyze(
        summary: &DatasetSummary,
        missing: &MissingTable,
        config: &QualityConfig,
    ) -> QualityFlags {
        let mut flags = QualityFlags {
            too_few_rows: summary.n_rows < config.min_rows,
            too_many_columns: summary.n_cols > config.max_columns,
            ..QualityFlags::default()
        };

        // Missing values
        flags.max_missing_share = missing.max_missing_share();
        flags.too_many_missing = flags.max_missing_share > config.max_missing_share;
        flags.high_missing_columns = missing
            .entries()
            .iter()
            .filter(|e| e.missing_share > config.max_missing_share)
            .map(|e| e.name.clone())
            .collect();

        flags.constant_columns = Self::constant_columns(summary);
        flags.has_constant_columns = !flags.constant_columns.is_empty();

        flags.id_duplicates_info = Self::id_duplicates(summary, config);
        flags.has_suspicious_id_duplicates = !flags.id_duplicates_info.is_empty();

        flags.high_cardinality_columns = Self::high_cardinality(summary, config);
        flags.has_high_cardinality_categoricals = !flags.high_cardinality_columns.is_empty();

        flags.many_zero_columns = Self::many_zeros(summary, config);
        flags.has_many_zero_values = !flags.many_zero_columns.is_empty();

        flags.quality_score = Self::score(&flags, config);

        debug!(
            "Quality: {} flag(s) raised, score {:.2}",
            flags.triggered().len(),
            flags.quality_score
        );
        flags
    }

    fn constant_columns(summary: &DatasetSummary) -> Vec<String> {
        summary
            .columns
            .iter()
            .filter(|c| c.non_missing >= 1 && c.unique == 1)
            .map(|c| c.name.clone())
            .collect()
    }

    fn id_duplicates(summary: &DatasetSummary, config: &QualityConfig) -> Vec<IdDuplicateInfo> {
        let pattern = match Regex::new(&config.id_name_pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Ignoring invalid identifier pattern: {}", e);
                None
            }
        };

        summary
            .columns
            .iter()
            .filter(|c| c.non_missing >= 1)
            .filter(|c| {
                let name_match = pattern.as_ref().is_some_and(|re| re.is_match(&c.name));
                let mostly_unique = summary.n_rows > 0
                    && c.unique as f64 / summary.n_rows as f64 >= config.id_uniqueness_ratio;
                name_match || mostly_unique
            })
            .filter_map(|c| {
                let duplicate_rate = 1.0 - c.unique as f64 / c.non_missing as f64;
                (duplicate_rate > 0.0).then(|| IdDuplicateInfo {
                    name: c.name.clone(),
                    unique: c.unique,
                    non_missing: c.non_missing,
                    duplicate_rate,
                })
            })
            .collect()
    }

    fn high_cardinality(
        summary: &DatasetSummary,
        config: &QualityConfig,
    ) -> Vec<HighCardinalityInfo> {
        let threshold = cardinality_threshold(summary.n_rows, config);

        summary
            .columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Categorical && c.non_missing >= 1)
            .filter_map(|c| {
                let unique_ratio = c.unique as f64 / c.non_missing as f64;
                let above_threshold = c.unique as f64 > threshold;
                let mostly_distinct = c.unique >= config.cardinality_min_unique
                    && unique_ratio > config.max_unique_ratio;

                (above_threshold || mostly_distinct).then(|| HighCardinalityInfo {
                    name: c.name.clone(),
                    unique: c.unique,
                    threshold,
                    unique_ratio,
                })
            })
            .collect()
    }

    fn many_zeros(summary: &DatasetSummary, config: &QualityConfig) -> Vec<ZeroShareInfo> {
        summary
            .columns
            .iter()
            .filter(|c| c.non_missing >= 1)
            .filter_map(|c| {
                let stats = c.numeric?;
                let zero_share = stats.zero_count as f64 / c.non_missing as f64;
                (zero_share >= config.zero_share_threshold).then(|| ZeroShareInfo {
                    name: c.name.clone(),
                    zero_count: stats.zero_count,
                    zero_share,
                })
            })
            .collect()
    }

    fn score(flags: &QualityFlags, config: &QualityConfig) -> f64 {
        let p = &config.penalties;
        let penalties = [
            (flags.too_few_rows, p.too_few_rows),
            (flags.too_many_columns, p.too_many_columns),
            (flags.too_many_missing, p.too_many_missing),
            (flags.has_constant_columns, p.constant_columns),
            (flags.has_suspicious_id_duplicates, p.suspicious_id_duplicates),
            (
                flags.has_high_cardinality_categoricals,
                p.high_cardinality_categoricals,
            ),
            (flags.has_many_zero_values, p.many_zero_values),
        ];

        let total: f64 = penalties
            .iter()
            .filter(|(raised, _)| *raised)
            .map(|(_, penalty)| penalty)
            .sum();
        (1.0 - total).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityPenalties;
    use crate::profiler::{missing_table, summarize_dataset};
    use crate::table::{Column, Table};
    use pretty_assertions::assert_eq;

    fn flags_for(table: &Table) -> QualityFlags {
        let config = QualityConfig::default();
        QualityAnalyzer::analyze(&summarize_dataset(table), &missing_table(table), &config)
    }

    fn numbers(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    fn repeat_text(value: &str, n: usize) -> Vec<Option<String>> {
        vec![Some(value.to_string()); n]
    }

    // ===== Threshold scaling =====

    #[test]
    fn test_cardinality_threshold_values() {
        let config = QualityConfig::default();
        assert_eq!(cardinality_threshold(0, &config), 5.0);
        assert_eq!(cardinality_threshold(10, &config), 5.0);
        assert_eq!(cardinality_threshold(100, &config), 5.0);
        assert_eq!(cardinality_threshold(101, &config), 50.0);
        assert_eq!(cardinality_threshold(10_000, &config), 500.0);
    }

    #[test]
    fn test_cardinality_threshold_is_monotonic() {
        let config = QualityConfig::default();
        let mut previous = cardinality_threshold(0, &config);
        for n in 1..5_000 {
            let current = cardinality_threshold(n, &config);
            assert!(current >= previous, "threshold dropped at {n} rows");
            previous = current;
        }
    }

    // ===== Individual heuristics =====

    #[test]
    fn test_constant_columns_detected() {
        let table = Table::new(vec![
            Column::text("country", repeat_text("RU", 5)),
            Column::text("category", repeat_text("A", 5)),
            Column::numeric("n", numbers(&[1.0, 2.0, 3.0, 4.0, 5.0])),
        ])
        .unwrap();

        let flags = flags_for(&table);
        assert!(flags.has_constant_columns);
        assert_eq!(flags.constant_columns, vec!["country", "category"]);
    }

    #[test]
    fn test_id_duplicates_detected() {
        let table = Table::new(vec![Column::numeric(
            "user_id",
            numbers(&[1001.0, 1002.0, 1003.0, 1003.0, 1005.0]),
        )])
        .unwrap();

        let flags = flags_for(&table);
        assert!(flags.has_suspicious_id_duplicates);
        let info = &flags.id_duplicates_info[0];
        assert_eq!(info.name, "user_id");
        assert_eq!(info.unique, 4);
        assert!((info.duplicate_rate - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_many_zero_values_detected() {
        let table = Table::new(vec![Column::numeric("revenue", numbers(&[0.0; 5]))]).unwrap();

        let flags = flags_for(&table);
        assert!(flags.has_many_zero_values);
        assert_eq!(flags.many_zero_columns[0].name, "revenue");
        assert_eq!(flags.many_zero_columns[0].zero_share, 1.0);
    }

    #[test]
    fn test_all_distinct_names_are_high_cardinality() {
        let names = ["Ann", "Bob", "Cid", "Dan", "Eve"];
        let table = Table::new(vec![Column::text(
            "name",
            names.iter().map(|n| Some(*n)).collect(),
        )])
        .unwrap();

        let flags = flags_for(&table);
        assert!(flags.has_high_cardinality_categoricals);
        assert_eq!(flags.high_cardinality_columns[0].name, "name");
        assert_eq!(flags.high_cardinality_columns[0].threshold, 5.0);
    }

    #[test]
    fn test_large_table_cardinality_above_threshold() {
        let values: Vec<Option<String>> = (0..1000).map(|i| Some(format!("v{}", i % 60))).collect();
        let table = Table::new(vec![Column::new(
            "code",
            crate::table::ColumnData::Text(values),
        )])
        .unwrap();

        let flags = flags_for(&table);
        let info = &flags.high_cardinality_columns[0];
        assert_eq!(info.unique, 60);
        assert_eq!(info.threshold, 50.0);
    }

    #[test]
    fn test_too_many_missing() {
        let table = Table::new(vec![
            Column::numeric("sparse", vec![Some(1.0), None, None, None]),
            Column::numeric("dense", numbers(&[1.0, 2.0, 3.0, 4.0])),
        ])
        .unwrap();

        let flags = flags_for(&table);
        assert!(flags.too_many_missing);
        assert_eq!(flags.max_missing_share, 0.75);
        assert_eq!(flags.high_missing_columns, vec!["sparse"]);
    }

    #[test]
    fn test_too_many_columns() {
        let columns = (0..101)
            .map(|i| Column::numeric(format!("c{i}"), numbers(&[i as f64])))
            .collect();
        let flags = flags_for(&Table::new(columns).unwrap());
        assert!(flags.too_many_columns);
    }

    // ===== Scenarios =====

    #[test]
    fn test_clean_dataset_has_no_flags() {
        let n = 100;
        let categories = ["A", "B", "C", "D", "E"];
        let table = Table::new(vec![
            Column::numeric("id", (1..=n).map(|i| Some(i as f64)).collect()),
            Column::numeric("value", (1..=n).map(|i| Some(i as f64 * 1.5)).collect()),
            Column::text(
                "category",
                (0..n).map(|i| Some(categories[i % 5])).collect(),
            ),
        ])
        .unwrap();

        let flags = flags_for(&table);
        assert!(flags.triggered().is_empty(), "{:?}", flags.triggered());
        assert_eq!(flags.quality_score, 1.0);
    }

    #[test]
    fn test_small_table_only_constant_flag() {
        let categories = ["A", "B", "C", "D"];
        let table = Table::new(vec![
            Column::numeric("id", (1..=10).map(|i| Some(i as f64)).collect()),
            Column::text("status", repeat_text("active", 10)),
            Column::text(
                "category",
                (0..10).map(|i| Some(categories[i % 4])).collect(),
            ),
        ])
        .unwrap();

        let flags = flags_for(&table);
        assert!(!flags.too_few_rows);
        assert!(flags.has_constant_columns);
        assert_eq!(flags.constant_columns, vec!["status"]);
        assert!(!flags.has_high_cardinality_categoricals);
        assert!(!flags.has_suspicious_id_duplicates);
        assert!(!flags.has_many_zero_values);
        assert!(!flags.too_many_missing);
    }

    // ===== Edge cases and score =====

    #[test]
    fn test_empty_inputs() {
        let flags = QualityAnalyzer::analyze(
            &DatasetSummary::default(),
            &MissingTable::default(),
            &QualityConfig::default(),
        );
        assert!(!flags.too_many_missing);
        assert_eq!(flags.max_missing_share, 0.0);
        assert!(flags.too_few_rows);
        assert!((0.0..1.0).contains(&flags.quality_score));
    }

    #[test]
    fn test_score_is_clamped_at_zero() {
        let penalties = QualityPenalties {
            too_few_rows: 1.0,
            many_zero_values: 1.0,
            ..QualityPenalties::default()
        };
        let config = QualityConfig::builder().penalties(penalties).build().unwrap();
        let table = Table::new(vec![Column::numeric("revenue", numbers(&[0.0; 3]))]).unwrap();

        let flags =
            QualityAnalyzer::analyze(&summarize_dataset(&table), &missing_table(&table), &config);
        assert_eq!(flags.quality_score, 0.0);
    }

    #[test]
    fn test_any_flag_lowers_score() {
        let table = Table::new(vec![Column::numeric("x", numbers(&[1.0, 2.0]))]).unwrap();
        let flags = flags_for(&table);
        assert_eq!(flags.triggered().len(), 1);
        assert!(flags.quality_score < 1.0);
        assert!((flags.quality_score - 0.8).abs() < 1e-12);
    }
}
