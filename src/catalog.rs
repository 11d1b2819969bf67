//! Raw dataset catalog: list, describe, read and page through the files under the data
//! directory.
//!
//! Names passed in are plain file names inside the catalog root; anything that looks like a
//! path is rejected before the filesystem is touched. With feature `excel`, `.xlsx`/`.xls`
//! workbooks are served too (first sheet only).

use std::path::{Path, PathBuf};

use polars::prelude::{CsvReadOptions, SerReader};
use serde::Serialize;
use serde_json::{Map, Number, Value as JsonValue};
use walkdir::WalkDir;

use crate::error::{EtlError, EtlResult};
use crate::ingestion::{ingest_text_from_path, IngestionOptions};
use crate::types::{DataSet, Value};

/// Extensions the catalog exposes.
#[cfg(not(feature = "excel"))]
pub const DATASET_EXTENSIONS: &[&str] = &["csv", "txt"];
#[cfg(feature = "excel")]
pub const DATASET_EXTENSIONS: &[&str] = &["csv", "txt", "xlsx", "xls"];

/// Rows sampled by the type inference of [`describe_dataset`].
const INFER_SCHEMA_ROWS: usize = 100;

/// One file in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetEntry {
    pub name: String,
    pub size_bytes: u64,
    pub extension: String,
}

/// Column name and inferred type of a raw dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetDescription {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub rows: usize,
}

fn allowed_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    DATASET_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// List the datasets directly under `dir`, sorted by name. Subdirectories are not searched.
pub fn list_datasets(dir: &Path) -> EtlResult<Vec<DatasetEntry>> {
    if !dir.is_dir() {
        return Err(EtlError::Config {
            message: format!("data directory does not exist or is not a directory: {}", dir.display()),
        });
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let Some(extension) = allowed_extension(entry.path()) else {
            continue;
        };
        let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
        entries.push(DatasetEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            size_bytes,
            extension,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Map a dataset name to its file under `dir`.
pub fn resolve_dataset(dir: &Path, name: &str) -> EtlResult<PathBuf> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(EtlError::InvalidName {
            name: name.to_string(),
            reason: "dataset names must be plain file names".to_string(),
        });
    }
    let path = dir.join(name);
    if !path.is_file() || allowed_extension(&path).is_none() {
        return Err(EtlError::SourceNotFound {
            source_name: name.to_string(),
            path,
        });
    }
    Ok(path)
}

/// Column names, inferred types and row count of a raw dataset.
pub fn describe_dataset(dir: &Path, name: &str) -> EtlResult<DatasetDescription> {
    let path = resolve_dataset(dir, name)?;
    #[cfg(feature = "excel")]
    {
        if matches!(allowed_extension(&path).as_deref(), Some("xlsx" | "xls")) {
            return Ok(describe_workbook(name, &read_dataset(dir, name)?));
        }
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .try_into_reader_with_file_path(Some(path))?
        .finish()?;

    let columns = df
        .get_column_names()
        .into_iter()
        .zip(df.dtypes())
        .map(|(name, dtype)| ColumnInfo {
            name: name.to_string(),
            dtype: dtype.to_string(),
        })
        .collect();
    Ok(DatasetDescription {
        name: name.to_string(),
        columns,
        rows: df.height(),
    })
}

/// Read a raw dataset with every column as text.
pub fn read_dataset(dir: &Path, name: &str) -> EtlResult<DataSet> {
    ingest_text_from_path(resolve_dataset(dir, name)?, &IngestionOptions::default())
}

/// Workbook cells arrive as text; types are inferred over the first rows with the same
/// dtype names the CSV path reports.
#[cfg(feature = "excel")]
fn describe_workbook(name: &str, ds: &DataSet) -> DatasetDescription {
    let sample = &ds.rows[..ds.row_count().min(INFER_SCHEMA_ROWS)];
    let columns = ds
        .schema
        .field_names()
        .enumerate()
        .map(|(i, col)| {
            let cells: Vec<&str> = sample.iter().filter_map(|row| row[i].as_str()).collect();
            let dtype = if cells.is_empty() {
                "str"
            } else if cells.iter().all(|c| c.parse::<i64>().is_ok()) {
                "i64"
            } else if cells.iter().all(|c| c.parse::<f64>().is_ok()) {
                "f64"
            } else {
                "str"
            };
            ColumnInfo {
                name: col.to_string(),
                dtype: dtype.to_string(),
            }
        })
        .collect();
    DatasetDescription {
        name: name.to_string(),
        columns,
        rows: ds.row_count(),
    }
}

/// Project `ds` to `columns`, in the order given.
pub fn select_columns(ds: &DataSet, columns: &[&str]) -> EtlResult<DataSet> {
    let unknown: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|c| ds.schema.index_of(c).is_none())
        .collect();
    if !unknown.is_empty() {
        return Err(EtlError::SchemaMismatch {
            message: format!("unknown columns: {}", unknown.join(", ")),
        });
    }
    Ok(ds.select_existing(columns))
}

/// Rows `offset..offset + limit`, with `limit` capped at `max_rows`.
pub fn window(ds: &DataSet, offset: usize, limit: usize, max_rows: usize) -> DataSet {
    ds.slice(offset, limit.min(max_rows))
}

/// Render rows as an array of JSON objects keyed by column name.
pub fn to_json_records(ds: &DataSet) -> JsonValue {
    let names: Vec<&str> = ds.schema.field_names().collect();
    let records = ds
        .rows
        .iter()
        .map(|row| {
            let object: Map<String, JsonValue> = names
                .iter()
                .zip(row)
                .map(|(name, v)| ((*name).to_string(), to_json(v)))
                .collect();
            JsonValue::Object(object)
        })
        .collect();
    JsonValue::Array(records)
}

fn to_json(v: &Value) -> JsonValue {
    match v {
        Value::Null => JsonValue::Null,
        Value::Int64(i) => JsonValue::from(*i),
        Value::Float64(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::Utf8(s) => JsonValue::String(s.clone()),
    }
}
