//! CSV ingestion implementation.

use std::path::Path;

use crate::error::{EtlError, EtlResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Ingest a CSV file into an in-memory [`DataSet`].
///
/// Rules:
///
/// - CSV must have headers.
/// - Headers must contain all schema fields (order can differ). Extra columns are ignored,
///   so the schema doubles as a column allow-list.
/// - Each value is parsed according to the schema field type. Cells that do not parse are
///   handled by `policy`.
pub fn ingest_csv_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    policy: CellPolicy,
) -> EtlResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    ingest_csv_from_reader(&mut rdr, schema, policy)
}

/// Ingest CSV data from an existing CSV reader.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: &Schema,
    policy: CellPolicy,
) -> EtlResult<DataSet> {
    let headers = rdr.headers()?.clone();

    // Map schema fields -> CSV column indexes (allows re-ordered CSV columns).
    let mut col_idxs = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        match headers.iter().position(|h| h.trim() == field.name) {
            Some(idx) => col_idxs.push(idx),
            None => {
                return Err(EtlError::SchemaMismatch {
                    message: format!(
                        "missing required column '{field}'. headers={:?}",
                        headers.iter().collect::<Vec<_>>(),
                        field = field.name
                    ),
                });
            }
        }
    }

    let mut cells = CellParser::new(schema, policy);
    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;

        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (idx, (field, &csv_idx)) in schema.fields.iter().zip(col_idxs.iter()).enumerate() {
            let raw = record.get(csv_idx).unwrap_or("");
            row.push(cells.parse(user_row, idx, &field.name, raw)?);
        }
        rows.push(row);
    }
    cells.finish();

    Ok(DataSet::new(schema.clone(), rows))
}

/// Ingest every column of a CSV file as text, using the header row as the schema.
pub fn ingest_csv_as_text(path: impl AsRef<Path>) -> EtlResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    let schema = Schema::new(
        rdr.headers()?
            .iter()
            .map(|h| Field::new(h.trim(), DataType::Utf8))
            .collect(),
    );
    ingest_csv_from_reader(&mut rdr, &schema, CellPolicy::Strict)
}

/// What to do with a cell that does not parse as its field type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellPolicy {
    /// Fail with [`EtlError::ParseError`].
    #[default]
    Strict,
    /// Read the cell as missing. Counts per column are logged once the read finishes.
    Lenient,
}

/// Cell contents read as missing in every column (compared after trimming).
pub const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Row-by-row cell parsing under a [`CellPolicy`].
pub(crate) struct CellParser<'a> {
    schema: &'a Schema,
    policy: CellPolicy,
    coerced: Vec<usize>,
}

impl<'a> CellParser<'a> {
    pub(crate) fn new(schema: &'a Schema, policy: CellPolicy) -> Self {
        Self {
            schema,
            policy,
            coerced: vec![0; schema.fields.len()],
        }
    }

    /// Parse the cell of field `idx`; `column` is the label used in errors.
    pub(crate) fn parse(
        &mut self,
        row: usize,
        idx: usize,
        column: &str,
        raw: &str,
    ) -> EtlResult<Value> {
        let data_type = self.schema.fields[idx].data_type;
        match parse_typed_value(row, column, data_type, raw) {
            Err(EtlError::ParseError { .. }) if self.policy == CellPolicy::Lenient => {
                self.coerced[idx] += 1;
                Ok(Value::Null)
            }
            other => other,
        }
    }

    pub(crate) fn finish(self) {
        for (field, &cells) in self.schema.fields.iter().zip(&self.coerced) {
            if cells > 0 {
                tracing::warn!(column = %field.name, cells, "unparseable cells read as missing");
            }
        }
    }
}

pub(crate) fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: DataType,
    raw: &str,
) -> EtlResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || NA_TOKENS.contains(&trimmed) {
        return Ok(Value::Null);
    }

    let parse_err = |message: String| EtlError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => parse_code(trimmed).map(Value::Int64).map_err(parse_err),
        DataType::Float64 => match trimmed.parse::<f64>() {
            Ok(v) if v.is_nan() => Ok(Value::Null),
            Ok(v) => Ok(Value::Float64(v)),
            Err(e) => Err(parse_err(e.to_string())),
        },
    }
}

/// Parse an integer code. Exports from statistical packages often write codes as `2.0`,
/// so integral floats are accepted too.
fn parse_code(s: &str) -> Result<i64, String> {
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        Ok(_) => Err("expected integer code (got non-integer number)".to_string()),
        Err(e) => Err(e.to_string()),
    }
}
