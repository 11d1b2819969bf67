//! Key Linker: key normalization, dietary deduplication and the one-to-one left joins.

use std::collections::{HashMap, HashSet};

use crate::error::{EtlError, EtlResult, JoinSide};
use crate::types::{DataSet, DataType, Value};

use super::columns::ID;
use super::sources::{SourceKind, SourceTables};

/// Rewrite the key column as trimmed text. Empty keys become missing.
pub fn normalize_key(ds: &mut DataSet, key: &str) {
    let Some(idx) = ds.schema.index_of(key) else {
        return;
    };
    ds.update_column(idx, DataType::Utf8, |v| {
        let text = match v {
            Value::Null => return Value::Null,
            Value::Utf8(s) => s.trim().to_string(),
            Value::Int64(i) => i.to_string(),
            Value::Float64(f) => f.to_string(),
        };
        if text.is_empty() {
            Value::Null
        } else {
            Value::Utf8(text)
        }
    });
}

/// Keep the first row seen for every key, in input order. Rows with a missing key are kept.
///
/// "First" is file order, so the result is only as deterministic as the order of the input.
pub fn dedup_first(ds: &DataSet, key: &str) -> DataSet {
    let Some(idx) = ds.schema.index_of(key) else {
        return ds.clone();
    };
    let mut seen: HashSet<String> = HashSet::new();
    ds.filter_rows(|row| match &row[idx] {
        Value::Utf8(k) => seen.insert(k.clone()),
        _ => true,
    })
}

/// Left outer join that requires `key` to be unique on both sides.
///
/// Every left row is kept in order; unmatched rows get missing values for the right-hand
/// columns. Rows whose key is missing never match. A duplicated key on either side fails
/// with [`EtlError::JoinCardinality`].
pub fn left_join_one_to_one(
    left: &DataSet,
    right: &DataSet,
    key: &str,
    right_name: &str,
) -> EtlResult<DataSet> {
    let missing_key = |side: &str| EtlError::SchemaMismatch {
        message: format!("{side} side of join with '{right_name}' has no '{key}' column"),
    };
    let l_key = left.schema.index_of(key).ok_or_else(|| missing_key("left"))?;
    let r_key = right.schema.index_of(key).ok_or_else(|| missing_key("right"))?;

    ensure_unique(left, l_key, right_name, JoinSide::Left)?;
    let lookup = ensure_unique(right, r_key, right_name, JoinSide::Right)?;

    let right_cols: Vec<usize> = (0..right.column_count()).filter(|&i| i != r_key).collect();
    let mut schema = left.schema.clone();
    for &i in &right_cols {
        let field = &right.schema.fields[i];
        if schema.index_of(&field.name).is_some() {
            return Err(EtlError::SchemaMismatch {
                message: format!("column '{}' from '{right_name}' already exists", field.name),
            });
        }
        schema.fields.push(field.clone());
    }

    let mut matched = 0usize;
    let rows = left
        .rows
        .iter()
        .map(|row| {
            let mut out = Vec::with_capacity(schema.fields.len());
            out.extend(row.iter().cloned());
            let hit = row[l_key].as_str().and_then(|k| lookup.get(k));
            match hit {
                Some(&r) => {
                    matched += 1;
                    out.extend(right_cols.iter().map(|&i| right.rows[r][i].clone()));
                }
                None => out.extend(right_cols.iter().map(|_| Value::Null)),
            }
            out
        })
        .collect();

    tracing::debug!(
        source = right_name,
        left_rows = left.row_count(),
        matched,
        "joined"
    );
    Ok(DataSet::new(schema, rows))
}

/// Index `ds` by key, failing on the first duplicate.
fn ensure_unique<'a>(
    ds: &'a DataSet,
    key_idx: usize,
    right_name: &str,
    side: JoinSide,
) -> EtlResult<HashMap<&'a str, usize>> {
    let mut index = HashMap::with_capacity(ds.row_count());
    for (i, row) in ds.rows.iter().enumerate() {
        if let Some(k) = row[key_idx].as_str() {
            if index.insert(k, i).is_some() {
                return Err(EtlError::JoinCardinality {
                    source_name: right_name.to_string(),
                    key: k.to_string(),
                    side,
                });
            }
        }
    }
    Ok(index)
}

/// Link the five normalized sources into one table anchored on the demographic source.
///
/// Join order: response, questionnaire, mortality, dietary (deduplicated first).
pub fn link(tables: SourceTables) -> EtlResult<DataSet> {
    let SourceTables {
        mut demographic,
        mut dietary,
        mut response,
        mut questionnaire,
        mut mortality,
    } = tables;

    for ds in [
        &mut demographic,
        &mut dietary,
        &mut response,
        &mut questionnaire,
        &mut mortality,
    ] {
        normalize_key(ds, ID);
    }

    let before = dietary.row_count();
    let dietary = dedup_first(&dietary, ID);
    if dietary.row_count() < before {
        tracing::info!(
            dropped = before - dietary.row_count(),
            "dropped duplicate dietary rows"
        );
    }

    let mut linked = demographic;
    for (kind, right) in [
        (SourceKind::Response, &response),
        (SourceKind::Questionnaire, &questionnaire),
        (SourceKind::Mortality, &mortality),
        (SourceKind::Dietary, &dietary),
    ] {
        linked = left_join_one_to_one(&linked, right, ID, kind.name())?;
    }
    Ok(linked)
}
