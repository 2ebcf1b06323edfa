//! Statistical helpers shared by the profilers.

use std::collections::{HashMap, HashSet};

use crate::table::{Column, ColumnData};
use crate::types::NumericStats;

/// Min, max, mean, sample std and zero count over present values.
///
/// Returns `None` when the column has no values.
pub(crate) fn numeric_stats(values: &[Option<f64>]) -> Option<NumericStats> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }

    let n = present.len() as f64;
    let mean = present.iter().sum::<f64>() / n;
    let min = present.iter().copied().fold(f64::INFINITY, f64::min);
    let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let std = sample_std(&present, mean);
    let zero_count = present.iter().filter(|v| **v == 0.0).count();

    Some(NumericStats {
        min,
        max,
        mean,
        std,
        zero_count,
    })
}

/// Sample standard deviation (n - 1 denominator); 0.0 for fewer than two values.
pub(crate) fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Number of distinct present values.
pub(crate) fn distinct_count(column: &Column) -> usize {
    match column.data() {
        ColumnData::Numeric(v) => v
            .iter()
            .flatten()
            .map(|x| canonical_bits(*x))
            .collect::<HashSet<_>>()
            .len(),
        ColumnData::Boolean(v) => v.iter().flatten().collect::<HashSet<_>>().len(),
        ColumnData::Text(v) => v.iter().flatten().collect::<HashSet<_>>().len(),
    }
}

// -0.0 and 0.0 count as the same value.
fn canonical_bits(x: f64) -> u64 {
    if x == 0.0 { 0.0f64.to_bits() } else { x.to_bits() }
}

/// Value counts in first-occurrence order.
pub(crate) fn value_counts(column: &Column) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for value in column.non_missing_values() {
        match index.get(&value) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(value.clone(), order.len());
                order.push((value, 1));
            }
        }
    }
    order
}

/// Most frequent present value; ties go to the value seen first.
pub(crate) fn mode(column: &Column) -> Option<String> {
    let mut best: Option<(String, usize)> = None;
    for (value, count) in value_counts(column) {
        if best.as_ref().is_none_or(|(_, c)| count > *c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_stats() {
        let stats = numeric_stats(&[Some(10.0), Some(20.0), Some(30.0), None]).unwrap();
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.mean, 20.0);
        assert!((stats.std - 10.0).abs() < 1e-12);
        assert_eq!(stats.zero_count, 0);
    }

    #[test]
    fn test_numeric_stats_empty() {
        assert!(numeric_stats(&[None, None]).is_none());
        assert!(numeric_stats(&[]).is_none());
    }

    #[test]
    fn test_single_value_std_is_zero() {
        let stats = numeric_stats(&[Some(0.0)]).unwrap();
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.zero_count, 1);
    }

    #[test]
    fn test_distinct_count_ignores_missing() {
        let col = Column::numeric("x", vec![Some(1.0), Some(1.0), None, Some(-0.0), Some(0.0)]);
        assert_eq!(distinct_count(&col), 2);

        let col = Column::text("c", vec![Some("A"), Some("B"), Some("A"), None]);
        assert_eq!(distinct_count(&col), 2);
    }

    #[test]
    fn test_mode_tie_goes_to_first_seen() {
        let col = Column::text("c", vec![Some("B"), Some("A"), Some("A"), Some("B")]);
        assert_eq!(mode(&col).as_deref(), Some("B"));

        let col = Column::text("c", vec![Some("B"), Some("A"), Some("A")]);
        assert_eq!(mode(&col).as_deref(), Some("A"));

        let col = Column::text::<&str>("c", vec![None, None]);
        assert_eq!(mode(&col), None);
    }
}
