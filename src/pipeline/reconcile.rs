//! Reconciler: exclusion, output projection, and missing-value fill-in.

use crate::processing::{filter, map, reduce, ReduceOp};
use crate::types::{DataSet, DataType, Value};

use super::columns::{
    ACR_CATEGORY, BIRTH_COUNTRY, CANCER, CAUSE_OF_DEATH, CORONARY_DISEASE, DIABETES,
    EGFR_CATEGORY, ETHNIC_GROUP, HEART_FAILURE, HYPERTENSION, ID, MARITAL_STATUS, MORTALITY,
    OUTPUT_COLUMNS, SEX, STROKE,
};
use super::derive::round1;

/// Records whose identifier starts with this prefix are dropped.
pub const EXCLUDED_ID_PREFIX: &str = "I-";

pub const NOT_DEFINED: &str = "Not defined";
pub const NO_ETHNICITY: &str = "No ethnicity";
pub const NO_DIAGNOSIS: &str = "No diagnosis";
pub const NO_CAUSE: &str = "No cause";
pub const ACR_BY_MEAN: &str = "A1(by mean)";
pub const EGFR_BY_MEAN: &str = "G1(by mean)";
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Label written into a missing text cell of `column`.
pub fn sentinel_for(column: &str) -> &'static str {
    match column {
        MORTALITY | MARITAL_STATUS | SEX | BIRTH_COUNTRY => NOT_DEFINED,
        ETHNIC_GROUP => NO_ETHNICITY,
        DIABETES | HYPERTENSION | HEART_FAILURE | CORONARY_DISEASE | STROKE | CANCER => {
            NO_DIAGNOSIS
        }
        CAUSE_OF_DEATH => NO_CAUSE,
        ACR_CATEGORY => ACR_BY_MEAN,
        EGFR_CATEGORY => EGFR_BY_MEAN,
        _ => UNCATEGORIZED,
    }
}

fn is_excluded(id: &Value) -> bool {
    matches!(id, Value::Utf8(s) if s.starts_with(EXCLUDED_ID_PREFIX))
}

/// Produce the analytic table from the derived table.
///
/// Every text column ends up without missing values. A numeric column is filled with its
/// median (rounded to one decimal) unless it has no values at all, in which case it is left
/// missing and a warning is logged.
pub fn reconcile(ds: &DataSet) -> DataSet {
    let kept = match ds.schema.index_of(ID) {
        Some(id) => filter(ds, |row| !is_excluded(&row[id])),
        None => ds.clone(),
    };
    let excluded = ds.row_count() - kept.row_count();

    let mut out = kept.select_existing(OUTPUT_COLUMNS);
    if out.column_count() < OUTPUT_COLUMNS.len() {
        tracing::warn!(
            present = out.column_count(),
            expected = OUTPUT_COLUMNS.len(),
            "output columns missing from the derived table"
        );
    }

    let text_cols: Vec<usize> = (0..out.column_count())
        .filter(|&i| out.schema.fields[i].data_type == DataType::Utf8)
        .collect();
    out = map(&out, |row| {
        let mut row = row.to_vec();
        for &i in &text_cols {
            if let Value::Utf8(s) = &row[i] {
                let trimmed = s.trim();
                row[i] = if trimmed.is_empty() {
                    Value::Null
                } else {
                    Value::Utf8(trimmed.to_string())
                };
            }
        }
        row
    });

    for idx in 0..out.column_count() {
        let field = out.schema.fields[idx].clone();
        if field.data_type.is_numeric() {
            fill_with_median(&mut out, idx, &field.name);
        } else {
            let sentinel = sentinel_for(&field.name);
            out.update_column(idx, DataType::Utf8, |v| match v {
                Value::Null => Value::Utf8(sentinel.to_string()),
                other => other.clone(),
            });
        }
    }

    tracing::info!(rows = out.row_count(), excluded, columns = out.column_count(), "reconciled");
    out
}

fn fill_with_median(ds: &mut DataSet, idx: usize, name: &str) {
    let fill = match reduce(ds, name, ReduceOp::Median).and_then(|v| v.as_f64()) {
        Some(m) => Some(round1(m)),
        None => {
            tracing::warn!(column = name, "numeric column has no values; left missing");
            None
        }
    };
    ds.update_column(idx, DataType::Float64, |v| match v.as_f64() {
        Some(x) => Value::Float64(x),
        None => Value::from_f64(fill),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::columns::{ACR, AGE, EDUCATION_LEVEL};
    use crate::types::{Field, Schema};

    fn text(s: &str) -> Value {
        Value::Utf8(s.into())
    }

    fn derived() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("scratch", DataType::Utf8),
            Field::new(ID, DataType::Utf8),
            Field::new(ACR, DataType::Float64),
            Field::new(SEX, DataType::Utf8),
            Field::new(EDUCATION_LEVEL, DataType::Utf8),
            Field::new(AGE, DataType::Float64),
            Field::new(DIABETES, DataType::Utf8),
        ]);
        let row = |id: &str, acr: Value, sex: Value, edu: Value, age: Value, dia: Value| {
            vec![text("x"), text(id), acr, sex, edu, age, dia]
        };
        DataSet::new(
            schema,
            vec![
                row("1", Value::Float64(10.0), text("Male"), Value::Null, Value::Float64(40.0), text("Yes")),
                row("I-2", Value::Float64(900.0), text("Female"), Value::Null, Value::Float64(80.0), Value::Null),
                row("3", Value::Null, text("  "), text(" Some college "), Value::Float64(41.0), Value::Null),
                row("4", Value::Float64(20.5), Value::Null, Value::Null, Value::Null, text("No")),
            ],
        )
    }

    #[test]
    fn excludes_projects_and_fills() {
        let out = reconcile(&derived());
        let names: Vec<_> = out.schema.field_names().collect();
        assert_eq!(names, vec![ID, AGE, SEX, DIABETES, ACR, EDUCATION_LEVEL]);
        assert_eq!(out.row_count(), 3);

        let col = |name: &str| out.schema.index_of(name).unwrap();
        let ids: Vec<_> = out.rows.iter().map(|r| r[col(ID)].clone()).collect();
        assert_eq!(ids, vec![text("1"), text("3"), text("4")]);

        // median of 10.0 and 20.5 is 15.25 -> 15.2 (ties to even)
        assert_eq!(out.rows[1][col(ACR)], Value::Float64(15.2));
        assert_eq!(out.rows[2][col(AGE)], Value::Float64(40.5));

        assert_eq!(out.rows[1][col(SEX)], text(NOT_DEFINED));
        assert_eq!(out.rows[2][col(SEX)], text(NOT_DEFINED));
        assert_eq!(out.rows[1][col(EDUCATION_LEVEL)], text("Some college"));
        assert_eq!(out.rows[0][col(EDUCATION_LEVEL)], text(UNCATEGORIZED));
        assert_eq!(out.rows[1][col(DIABETES)], text(NO_DIAGNOSIS));

        assert!(out.rows.iter().flatten().all(|v| !v.is_null()));
    }

    #[test]
    fn excluded_rows_do_not_shift_the_median() {
        let out = reconcile(&derived());
        let age = out.schema.index_of(AGE).unwrap();
        assert_ne!(out.rows[2][age], Value::Float64(41.0));
    }

    #[test]
    fn all_missing_numeric_column_stays_missing() {
        let ds = DataSet::new(
            Schema::new(vec![
                Field::new(ID, DataType::Utf8),
                Field::new(ACR, DataType::Float64),
            ]),
            vec![vec![text("1"), Value::Null]],
        );
        let out = reconcile(&ds);
        assert_eq!(out.rows[0], vec![text("1"), Value::Null]);
    }

    #[test]
    fn sentinels_by_column() {
        assert_eq!(sentinel_for(ETHNIC_GROUP), NO_ETHNICITY);
        assert_eq!(sentinel_for(CAUSE_OF_DEATH), NO_CAUSE);
        assert_eq!(sentinel_for(ACR_CATEGORY), ACR_BY_MEAN);
        assert_eq!(sentinel_for(EGFR_CATEGORY), EGFR_BY_MEAN);
        assert_eq!(sentinel_for(MORTALITY), NOT_DEFINED);
        assert_eq!(sentinel_for(STROKE), NO_DIAGNOSIS);
        assert_eq!(sentinel_for(ID), UNCATEGORIZED);
        assert_eq!(sentinel_for("alcohol_use"), UNCATEGORIZED);
    }
}
