//! Spreadsheet rendering via `rust_xlsxwriter`.

use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet};

use crate::error::EtlResult;
use crate::types::{DataSet, Value};

/// Name of the single worksheet holding the table.
pub const SHEET_NAME: &str = "DataFrame";

fn build_workbook(table: &DataSet) -> EtlResult<Workbook> {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name(SHEET_NAME)?;
    fill_sheet(ws, table)?;
    Ok(wb)
}

fn fill_sheet(ws: &mut Worksheet, table: &DataSet) -> EtlResult<()> {
    // Out-of-range positions saturate and are rejected by the writer's own limit check.
    let col_num = |c: usize| u16::try_from(c).unwrap_or(u16::MAX);
    let row_num = |r: usize| u32::try_from(r).unwrap_or(u32::MAX);

    for (c, name) in table.schema.field_names().enumerate() {
        ws.write_string(0, col_num(c), name)?;
    }
    for (r, row) in table.rows.iter().enumerate() {
        let r = row_num(r + 1);
        for (c, value) in row.iter().enumerate() {
            match value {
                Value::Null => {}
                Value::Int64(v) => {
                    ws.write_number(r, col_num(c), *v as f64)?;
                }
                Value::Float64(v) if v.is_finite() => {
                    ws.write_number(r, col_num(c), *v)?;
                }
                Value::Float64(_) => {}
                Value::Utf8(s) => {
                    ws.write_string(r, col_num(c), s)?;
                }
            }
        }
    }
    Ok(())
}

/// Render `table` to an in-memory `.xlsx` body.
pub fn to_xlsx_buffer(table: &DataSet) -> EtlResult<Vec<u8>> {
    let mut wb = build_workbook(table)?;
    Ok(wb.save_to_buffer()?)
}

/// Write `table` to `path` as a one-sheet workbook.
pub fn save_xlsx(table: &DataSet, path: &Path) -> EtlResult<()> {
    let mut wb = build_workbook(table)?;
    wb.save(path)?;
    Ok(())
}
