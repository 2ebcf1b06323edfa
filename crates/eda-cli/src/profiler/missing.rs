//! Missing-value analysis.

use crate::table::Table;
use crate::types::{MissingEntry, MissingTable};

/// Missing count and share for every column, in table order.
pub fn missing_table(table: &Table) -> MissingTable {
    let n_rows = table.n_rows();
    let entries = table
        .columns()
        .iter()
        .map(|col| {
            let missing_count = col.missing_count();
            MissingEntry {
                name: col.name().to_string(),
                missing_count,
                missing_share: share(missing_count, n_rows),
            }
        })
        .collect();

    MissingTable::new(entries)
}

/// `part / total`, 0.0 when `total` is zero.
pub(crate) fn share(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn test_missing_table_counts() {
        let table = Table::new(vec![
            Column::numeric("age", vec![Some(10.0), Some(20.0), Some(30.0), None]),
            Column::text("city", vec![Some("A"), None, Some("A"), None]),
        ])
        .unwrap();

        let missing = missing_table(&table);
        assert_eq!(missing.len(), 2);
        assert_eq!(missing.get("age").unwrap().missing_count, 1);
        assert_eq!(missing.get("age").unwrap().missing_share, 0.25);
        assert_eq!(missing.get("city").unwrap().missing_share, 0.5);
        assert_eq!(missing.entries()[0].name, "age");
    }

    #[test]
    fn test_zero_rows_share_is_zero() {
        let table = Table::new(vec![Column::numeric("a", vec![])]).unwrap();
        let missing = missing_table(&table);
        assert_eq!(missing.get("a").unwrap().missing_share, 0.0);
    }

    #[test]
    fn test_empty_table_gives_empty_missing_table() {
        assert!(missing_table(&Table::default()).is_empty());
    }
}
