//! Frequency tables for non-numeric columns.

use tracing::debug;

use super::missing::share;
use super::statistics::value_counts;
use crate::table::Table;
use crate::types::{CategoryEntry, CategoryTable, TopCategories};

/// Top-`top_k` values of the first `max_columns` non-numeric columns.
///
/// Entries are sorted by count (descending); equal counts keep the order in
/// which the values first appear. Shares are relative to the column's
/// non-missing count.
pub fn top_categories(table: &Table, max_columns: usize, top_k: usize) -> TopCategories {
    let tables = table
        .non_numeric_columns()
        .take(max_columns)
        .map(|column| {
            let non_missing = column.non_missing_count();
            let mut counts = value_counts(column);
            // Stable sort, so ties stay in first-seen order.
            counts.sort_by(|a, b| b.1.cmp(&a.1));
            counts.truncate(top_k);

            debug!(
                "Profiled '{}': {} value(s) kept of {} non-missing",
                column.name(),
                counts.len(),
                non_missing
            );

            CategoryTable {
                column: column.name().to_string(),
                non_missing,
                entries: counts
                    .into_iter()
                    .map(|(value, count)| CategoryEntry {
                        value,
                        count,
                        share: share(count, non_missing),
                    })
                    .collect(),
            }
        })
        .collect();

    TopCategories::new(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use pretty_assertions::assert_eq;

    fn sample() -> Table {
        Table::new(vec![
            Column::numeric("n", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]),
            Column::text("city", vec![Some("B"), Some("A"), Some("A"), Some("C"), None]),
            Column::boolean("flag", vec![Some(true), Some(false), Some(true), None, None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_top_categories_sorted() {
        let top = top_categories(&sample(), 20, 5);
        assert_eq!(top.len(), 2);

        let city = top.get("city").unwrap();
        let values: Vec<(&str, usize)> = city
            .entries
            .iter()
            .map(|e| (e.value.as_str(), e.count))
            .collect();
        assert_eq!(values, vec![("A", 2), ("B", 1), ("C", 1)]);
        assert_eq!(city.non_missing, 4);
        assert_eq!(city.entries[0].share, 0.5);

        let flag = top.get("flag").unwrap();
        assert_eq!(flag.entries[0].value, "true");
        assert_eq!(flag.entries[0].count, 2);
    }

    #[test]
    fn test_top_k_truncates() {
        let top = top_categories(&sample(), 20, 1);
        for table in top.iter() {
            assert!(table.entries.len() <= 1);
        }
    }

    #[test]
    fn test_max_columns_limits_profiled_columns() {
        let top = top_categories(&sample(), 1, 5);
        assert_eq!(top.len(), 1);
        assert!(top.get("city").is_some());
        assert!(top_categories(&sample(), 0, 5).is_empty());
    }

    #[test]
    fn test_numeric_only_table() {
        let table = Table::new(vec![Column::numeric("n", vec![Some(1.0)])]).unwrap();
        assert!(top_categories(&table, 20, 5).is_empty());
    }
}
