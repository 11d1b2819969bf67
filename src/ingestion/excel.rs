#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{EtlError, EtlResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::csv::{CellParser, CellPolicy};

/// Ingest one sheet of a workbook (`.xlsx`, `.xls`, `.ods`, etc.) into an in-memory `DataSet`.
///
/// Behavior:
/// - Picks `sheet_name` if provided; otherwise uses the first sheet in the workbook
/// - Detects the first non-empty row as the header row
/// - Validates that all schema fields exist as headers
/// - Reads remaining rows, rendering each cell as text and parsing it like a CSV cell under
///   `policy`
pub fn ingest_excel_from_path(
    path: impl AsRef<Path>,
    sheet_name: Option<&str>,
    schema: &Schema,
    policy: CellPolicy,
) -> EtlResult<DataSet> {
    let (sheet, range) = open_sheet(path.as_ref(), sheet_name)?;
    let rows = ingest_sheet_range(&sheet, &range, schema, policy)?;
    Ok(DataSet::new(schema.clone(), rows))
}

/// Ingest one sheet with every header column read as text.
pub fn ingest_excel_as_text(path: impl AsRef<Path>, sheet_name: Option<&str>) -> EtlResult<DataSet> {
    let (sheet, range) = open_sheet(path.as_ref(), sheet_name)?;
    let (_, header_cells) = find_header_row(&range)
        .map_err(|e| wrap_schema_err_with_sheet(&sheet, e))?;
    let schema = Schema::new(
        header_cells
            .iter()
            .map(|h| Field::new(h.trim(), DataType::Utf8))
            .collect(),
    );
    let rows = ingest_sheet_range(&sheet, &range, &schema, CellPolicy::Strict)?;
    Ok(DataSet::new(schema, rows))
}

fn open_sheet(path: &Path, sheet_name: Option<&str>) -> EtlResult<(String, calamine::Range<Data>)> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| EtlError::SchemaMismatch {
                message: "workbook has no sheets".to_string(),
            })?,
    };
    let range = workbook.worksheet_range(&sheet)?;
    Ok((sheet, range))
}

fn ingest_sheet_range(
    sheet: &str,
    range: &calamine::Range<Data>,
    schema: &Schema,
    policy: CellPolicy,
) -> EtlResult<Vec<Vec<Value>>> {
    let (header_row_idx, col_idxs) = build_header_projection(range, schema)
        .map_err(|e| wrap_schema_err_with_sheet(sheet, e))?;

    let mut cells = CellParser::new(schema, policy);
    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (idx0, row) in range.rows().enumerate() {
        if idx0 <= header_row_idx {
            continue;
        }

        // Report 1-based row number (Excel-like).
        let user_row = idx0 + 1;

        let mut out_row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (idx, (field, &col_idx)) in schema.fields.iter().zip(col_idxs.iter()).enumerate() {
            let cell = row.get(col_idx).unwrap_or(&Data::Empty);
            let col_label = format!("{sheet}:{name}", name = field.name);
            let raw = cell_to_string(cell);
            out_row.push(cells.parse(user_row, idx, &col_label, &raw)?);
        }
        rows.push(out_row);
    }
    cells.finish();

    Ok(rows)
}

fn wrap_schema_err_with_sheet(sheet: &str, err: EtlError) -> EtlError {
    match err {
        EtlError::SchemaMismatch { message } => EtlError::SchemaMismatch {
            message: format!("sheet '{sheet}': {message}"),
        },
        other => other,
    }
}

fn find_header_row(range: &calamine::Range<Data>) -> EtlResult<(usize, Vec<String>)> {
    range
        .rows()
        .enumerate()
        .find(|(_, row)| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|(idx0, row)| (idx0, row.iter().map(cell_to_string).collect()))
        .ok_or_else(|| EtlError::SchemaMismatch {
            message: "sheet has no non-empty rows (no header row found)".to_string(),
        })
}

fn build_header_projection(
    range: &calamine::Range<Data>,
    schema: &Schema,
) -> EtlResult<(usize, Vec<usize>)> {
    let (header_row_idx, header_cells) = find_header_row(range)?;

    let mut col_idxs: Vec<usize> = Vec::with_capacity(schema.fields.len());
    for f in &schema.fields {
        match header_cells.iter().position(|h| h.trim() == f.name) {
            Some(idx) => col_idxs.push(idx),
            None => {
                return Err(EtlError::SchemaMismatch {
                    message: format!(
                        "missing required column '{}'. headers={:?}",
                        f.name, header_cells
                    ),
                });
            }
        }
    }

    Ok((header_row_idx, col_idxs))
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
