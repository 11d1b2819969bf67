//! Reduction operations for [`crate::types::DataSet`].

use crate::types::{DataSet, Value};

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count all rows (including nulls).
    Count,
    /// Minimum numeric value, ignoring nulls.
    Min,
    /// Maximum numeric value, ignoring nulls.
    Max,
    /// Median of the numeric values, ignoring nulls. Even counts average the two middle values.
    Median,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// - Returns `None` if `column` does not exist in the schema.
/// - For `Min`/`Max`/`Median`, returns `Some(Value::Null)` if there are no non-null numeric
///   values. Results are always [`Value::Float64`].
/// - For `Count`, always returns `Some(Value::Int64(row_count))`.
pub fn reduce(dataset: &DataSet, column: &str, op: ReduceOp) -> Option<Value> {
    let idx = dataset.schema.index_of(column)?;

    match op {
        ReduceOp::Count => Some(Value::Int64(dataset.row_count() as i64)),
        ReduceOp::Min | ReduceOp::Max => {
            let acc = dataset.reduce_rows(None::<f64>, |acc, row| {
                match (row.get(idx).and_then(Value::as_f64), acc) {
                    (None, acc) => acc,
                    (Some(v), None) => Some(v),
                    (Some(v), Some(a)) if op == ReduceOp::Min => Some(a.min(v)),
                    (Some(v), Some(a)) => Some(a.max(v)),
                }
            });
            Some(Value::from_f64(acc))
        }
        ReduceOp::Median => {
            let mut values: Vec<f64> = dataset
                .rows
                .iter()
                .filter_map(|row| row.get(idx).and_then(Value::as_f64))
                .collect();
            Some(Value::from_f64(median(&mut values)))
        }
    }
}

/// Median of `values` (sorted in place). `None` when empty.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
