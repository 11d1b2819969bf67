//! Flat-file rendering of a [`DataSet`].

use std::io::Write;

use crate::error::EtlResult;
use crate::types::{DataSet, Value};

/// Write `table` as CSV: a header row, then one record per row. Missing values are empty
/// fields. Output for a given table is byte-for-byte stable.
pub fn write_csv<W: Write>(table: &DataSet, writer: W) -> EtlResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.schema.field_names())?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(format_value))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render `table` to an in-memory CSV body.
pub fn to_csv_bytes(table: &DataSet) -> EtlResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(buf)
}

/// Text form of one cell. Integral floats keep a trailing `.0` so numeric columns read back
/// as numbers rather than codes.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Int64(v) => v.to_string(),
        Value::Float64(v) if !v.is_finite() => String::new(),
        Value::Float64(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{v:.1}"),
        Value::Float64(v) => v.to_string(),
        Value::Utf8(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, Field, Schema};

    #[test]
    fn renders_header_and_missing_values() {
        let table = DataSet::new(
            Schema::new(vec![
                Field::new("id", DataType::Utf8),
                Field::new("egfr", DataType::Float64),
                Field::new("sex", DataType::Utf8),
            ]),
            vec![
                vec![Value::Utf8("1".into()), Value::Float64(109.3), Value::Utf8("Female".into())],
                vec![Value::Utf8("2".into()), Value::Null, Value::Utf8("a, b".into())],
                vec![Value::Utf8("3".into()), Value::Float64(90.0), Value::Null],
            ],
        );
        let body = String::from_utf8(to_csv_bytes(&table).unwrap()).unwrap();
        assert_eq!(body, "id,egfr,sex\n1,109.3,Female\n2,,\"a, b\"\n3,90.0,\n");
    }

    #[test]
    fn float_formatting() {
        assert_eq!(format_value(&Value::Float64(0.1)), "0.1");
        assert_eq!(format_value(&Value::Float64(-3.0)), "-3.0");
        assert_eq!(format_value(&Value::Float64(f64::NAN)), "");
        assert_eq!(format_value(&Value::Int64(7)), "7");
    }
}
