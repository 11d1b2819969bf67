//! Relational sink: bulk load into a SQLite table inside one transaction.

use std::path::Path;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, Transaction};

use crate::config::PipelineConfig;
use crate::error::{EtlError, EtlResult};
use crate::types::{DataSet, DataType, Value};

/// What to do when the target table already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IfExists {
    /// Drop and recreate the table.
    #[default]
    Replace,
    /// Insert into the existing table (created if absent).
    Append,
    /// Fail with [`EtlError::TableExists`].
    Fail,
}

impl IfExists {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "replace" => Some(Self::Replace),
            "append" => Some(Self::Append),
            "fail" => Some(Self::Fail),
            _ => None,
        }
    }
}

/// Load `table` into `config.sqlite_path`, table `table_name` (or `config.sqlite_table`).
///
/// Columns are inserted positionally in schema order. Returns the number of rows written.
pub fn save_to_sqlite(
    table: &DataSet,
    config: &PipelineConfig,
    table_name: Option<&str>,
    if_exists: IfExists,
) -> EtlResult<usize> {
    let name = table_name.unwrap_or(config.sqlite_table.as_str()).trim();
    if let Some(parent) = config.sqlite_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut conn = open(&config.sqlite_path)?;
    let written = write_table(&mut conn, table, name, if_exists)?;
    tracing::info!(
        path = %config.sqlite_path.display(),
        table = name,
        rows = written,
        ?if_exists,
        "loaded into sqlite"
    );
    Ok(written)
}

fn open(path: &Path) -> EtlResult<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=DELETE;")?;
    Ok(conn)
}

/// Write `table` through an open connection. All-or-nothing.
pub fn write_table(
    conn: &mut Connection,
    table: &DataSet,
    name: &str,
    if_exists: IfExists,
) -> EtlResult<usize> {
    if name.is_empty() {
        return Err(EtlError::InvalidName {
            name: name.to_string(),
            reason: "table name is empty".to_string(),
        });
    }
    let quoted = quote_ident(name);

    let tx = conn.transaction()?;
    let exists = table_exists(&tx, name)?;
    match (exists, if_exists) {
        (true, IfExists::Fail) => {
            return Err(EtlError::TableExists {
                table: name.to_string(),
            })
        }
        (true, IfExists::Replace) => {
            tx.execute(&format!("DROP TABLE {quoted}"), [])?;
            tx.execute(&create_table_sql(&quoted, table), [])?;
        }
        (true, IfExists::Append) => {}
        (false, _) => {
            tx.execute(&create_table_sql(&quoted, table), [])?;
        }
    }

    let columns: Vec<String> = table.schema.field_names().map(quote_ident).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    let insert = format!(
        "INSERT INTO {quoted} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    );
    {
        let mut stmt = tx.prepare(&insert)?;
        for row in &table.rows {
            stmt.execute(params_from_iter(row.iter().map(to_sql_value)))?;
        }
    }
    tx.commit()?;
    Ok(table.row_count())
}

fn table_exists(tx: &Transaction<'_>, name: &str) -> EtlResult<bool> {
    let count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |r| r.get(0),
    )?;
    Ok(count > 0)
}

fn create_table_sql(quoted: &str, table: &DataSet) -> String {
    let cols: Vec<String> = table
        .schema
        .fields
        .iter()
        .map(|f| {
            let ty = match f.data_type {
                DataType::Int64 | DataType::Float64 => "REAL",
                DataType::Utf8 => "TEXT",
            };
            format!("{} {ty}", quote_ident(&f.name))
        })
        .collect();
    format!("CREATE TABLE {quoted} ({})", cols.join(", "))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Int64(v) => SqlValue::Integer(*v),
        Value::Float64(v) if v.is_finite() => SqlValue::Real(*v),
        Value::Float64(_) => SqlValue::Null,
        Value::Utf8(s) => SqlValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, Schema};

    fn table(ids: &[&str]) -> DataSet {
        DataSet::new(
            Schema::new(vec![
                Field::new("id", DataType::Utf8),
                Field::new("egfr", DataType::Float64),
            ]),
            ids.iter()
                .map(|id| vec![Value::Utf8(id.to_string()), Value::Float64(95.5)])
                .collect(),
        )
    }

    fn count(conn: &Connection, name: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", quote_ident(name)), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn replace_append_and_fail() {
        let mut conn = Connection::open_in_memory().unwrap();
        write_table(&mut conn, &table(&["1", "2"]), "t", IfExists::Replace).unwrap();
        write_table(&mut conn, &table(&["3"]), "t", IfExists::Append).unwrap();
        assert_eq!(count(&conn, "t"), 3);

        write_table(&mut conn, &table(&["4"]), "t", IfExists::Replace).unwrap();
        assert_eq!(count(&conn, "t"), 1);

        let err = write_table(&mut conn, &table(&["5"]), "t", IfExists::Fail).unwrap_err();
        assert!(matches!(err, EtlError::TableExists { ref table } if table == "t"));
        assert_eq!(count(&conn, "t"), 1);
    }

    #[test]
    fn identifiers_are_quoted() {
        let mut conn = Connection::open_in_memory().unwrap();
        write_table(&mut conn, &table(&["1"]), "odd \"name\"", IfExists::Fail).unwrap();
        assert_eq!(count(&conn, "odd \"name\""), 1);
    }

    #[test]
    fn column_types_follow_the_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        write_table(&mut conn, &table(&["1"]), "t", IfExists::Replace).unwrap();
        let types: Vec<String> = conn
            .prepare("SELECT type FROM pragma_table_info('t') ORDER BY cid")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(types, vec!["TEXT", "REAL"]);
    }
}
