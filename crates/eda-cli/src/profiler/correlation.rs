//! Pearson correlation between numeric columns.

use anofox_statistics::correlation;
use tracing::debug;

use crate::table::Table;
use crate::types::CorrelationMatrix;

/// Pairwise Pearson correlation over rows where both values are present.
///
/// The matrix is empty when the table has fewer than two numeric columns.
/// The diagonal is always 1.0; an off-diagonal entry is `None` when fewer
/// than two complete pairs exist, either side has zero variance, or the
/// coefficient is otherwise undefined.
pub fn correlation_matrix(table: &Table) -> CorrelationMatrix {
    let numeric: Vec<(&str, &[Option<f64>])> = table
        .numeric_columns()
        .filter_map(|c| c.as_numeric().map(|v| (c.name(), v)))
        .collect();

    if numeric.len() < 2 {
        debug!(
            "Skipping correlation: {} numeric column(s)",
            numeric.len()
        );
        return CorrelationMatrix::default();
    }

    let n = numeric.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let r = pearson(numeric[i].1, numeric[j].1);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: numeric.iter().map(|(name, _)| name.to_string()).collect(),
        values,
    }
}

fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let (x, y): (Vec<f64>, Vec<f64>) = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();
    if x.len() < 2 {
        return None;
    }

    // Zero variance and degenerate samples come back as errors.
    let r = correlation::pearson(&x, &y, None).ok()?.estimate;
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    #[test]
    fn test_matrix_shape_and_values() {
        let table = Table::new(vec![
            Column::numeric("x", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            Column::numeric("y", vec![Some(1.0), Some(3.0), Some(2.0), Some(4.0)]),
            Column::numeric("z", vec![Some(4.0), Some(2.0), Some(3.0), Some(1.0)]),
        ])
        .unwrap();

        let corr = correlation_matrix(&table);
        assert_eq!(corr.columns, vec!["x", "y", "z"]);
        assert_close(corr.get("x", "y").unwrap(), 0.8);
        assert_close(corr.get("x", "z").unwrap(), -0.8);
        for i in 0..3 {
            assert_eq!(corr.values[i][i], Some(1.0));
            for j in 0..3 {
                assert_eq!(corr.values[i][j], corr.values[j][i]);
            }
        }
    }

    #[test]
    fn test_pairwise_complete_observations() {
        let table = Table::new(vec![
            Column::numeric(
                "age",
                vec![Some(10.0), Some(20.0), Some(30.0), Some(40.0), None],
            ),
            Column::numeric(
                "height",
                vec![Some(140.0), Some(160.0), Some(150.0), Some(170.0), Some(999.0)],
            ),
        ])
        .unwrap();

        let corr = correlation_matrix(&table);
        assert_close(corr.get("age", "height").unwrap(), 0.8);
    }

    #[test]
    fn test_single_complete_pair_is_undefined() {
        let table = Table::new(vec![
            Column::numeric("a", vec![Some(1.0), None, Some(3.0)]),
            Column::numeric("b", vec![Some(2.0), Some(4.0), None]),
        ])
        .unwrap();

        let corr = correlation_matrix(&table);
        assert_eq!(corr.get("a", "b"), None);
        assert_eq!(corr.get("a", "a"), Some(1.0));
    }

    #[test]
    fn test_constant_column_is_undefined() {
        let table = Table::new(vec![
            Column::numeric("a", vec![Some(1.0), Some(2.0), Some(3.0)]),
            Column::numeric("b", vec![Some(5.0), Some(5.0), Some(5.0)]),
        ])
        .unwrap();

        let corr = correlation_matrix(&table);
        assert_eq!(corr.get("a", "b"), None);
        assert_eq!(corr.get("b", "b"), Some(1.0));
    }

    #[test]
    fn test_fewer_than_two_numeric_columns() {
        let table = Table::new(vec![
            Column::numeric("a", vec![Some(1.0), Some(2.0)]),
            Column::text("b", vec![Some("x"), Some("y")]),
        ])
        .unwrap();
        assert!(correlation_matrix(&table).is_empty());
        assert!(correlation_matrix(&Table::default()).is_empty());
    }
}
