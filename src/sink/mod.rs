//! Sinks for the analytic table: flat file, spreadsheet and relational.
//!
//! - [`save_to_file`] writes `<output_dir>/<filename>.<ext>` as CSV or XLSX
//! - [`csv::write_csv`] and `xlsx::to_xlsx_buffer` render in-memory bodies
//! - `sqlite::save_to_sqlite` bulk-loads into a SQLite table (feature `sqlite`)
//!
//! File outputs are written to a uniquely named temporary file next to their target and
//! persisted into place, so a failed export never leaves a truncated file under the final name
//! and concurrent exports never share a staging file.

pub mod csv;
#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(feature = "xlsx")]
pub mod xlsx;

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::PipelineConfig;
use crate::error::{EtlError, EtlResult};
use crate::types::DataSet;

pub use self::csv::write_csv;
#[cfg(feature = "sqlite")]
pub use self::sqlite::{save_to_sqlite, IfExists};

/// File format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Parse a user-supplied format name (case-insensitive).
    pub fn parse(raw: &str) -> EtlResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(EtlError::UnsupportedFormat {
                format: raw.to_string(),
            }),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }
}

/// Write `table` to `config.output_dir/filename` and return the final path.
///
/// The format's extension is appended when `filename` does not already end with it.
/// The output directory is created if needed.
pub fn save_to_file(
    table: &DataSet,
    config: &PipelineConfig,
    filename: &str,
    format: ExportFormat,
) -> EtlResult<PathBuf> {
    let filename = filename.trim();
    if filename.is_empty() || filename.contains(['/', '\\']) || filename.contains("..") {
        return Err(EtlError::InvalidName {
            name: filename.to_string(),
            reason: "export file names must be plain file names".to_string(),
        });
    }

    let ext = format.extension();
    let has_ext = Path::new(filename)
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(ext));
    let filename = if has_ext {
        filename.to_string()
    } else {
        format!("{filename}.{ext}")
    };

    fs::create_dir_all(&config.output_dir)?;
    let target = config.output_dir.join(&filename);

    // Dropping the staging file on error removes it.
    let mut staging = tempfile::Builder::new()
        .prefix(&format!(".{filename}."))
        .suffix(".partial")
        .tempfile_in(&config.output_dir)?;
    if let Err(e) = write_file(table, &mut staging, format) {
        tracing::error!(path = %target.display(), error = %e, "export failed");
        return Err(e);
    }
    staging.persist(&target).map_err(|e| EtlError::Io(e.error))?;

    tracing::info!(path = %target.display(), rows = table.row_count(), format = ext, "exported");
    Ok(target)
}

fn write_file(table: &DataSet, staging: &mut NamedTempFile, format: ExportFormat) -> EtlResult<()> {
    match format {
        ExportFormat::Csv => write_csv(table, BufWriter::new(staging.as_file_mut())),
        ExportFormat::Xlsx => {
            let body = xlsx_body(table)?;
            staging.write_all(&body)?;
            staging.flush()?;
            Ok(())
        }
    }
}

#[cfg(feature = "xlsx")]
fn xlsx_body(table: &DataSet) -> EtlResult<Vec<u8>> {
    xlsx::to_xlsx_buffer(table)
}

#[cfg(not(feature = "xlsx"))]
fn xlsx_body(_table: &DataSet) -> EtlResult<Vec<u8>> {
    Err(EtlError::UnsupportedFormat {
        format: "xlsx (enable cargo feature 'xlsx')".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_formats_only() {
        assert_eq!(ExportFormat::parse("CSV").unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse(" xlsx ").unwrap(), ExportFormat::Xlsx);
        match ExportFormat::parse("parquet") {
            Err(EtlError::UnsupportedFormat { format }) => assert_eq!(format, "parquet"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn concurrent_exports_of_one_name_stay_whole() {
        use crate::types::{DataType, Field, Schema, Value};

        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let table = DataSet::new(
            Schema::new(vec![Field::new("id", DataType::Utf8)]),
            (0..5_000).map(|i| vec![Value::Utf8(i.to_string())]).collect(),
        );
        let expected = super::csv::to_csv_bytes(&table).unwrap();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| save_to_file(&table, &config, "shared", ExportFormat::Csv).unwrap());
            }
        });

        assert_eq!(fs::read(dir.path().join("shared.csv")).unwrap(), expected);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn path_like_file_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let table = DataSet::new(crate::types::Schema::new(vec![]), vec![]);
        for name in ["../escape", "a/b", ""] {
            assert!(matches!(
                save_to_file(&table, &config, name, ExportFormat::Csv),
                Err(EtlError::InvalidName { .. })
            ));
        }
    }
}
