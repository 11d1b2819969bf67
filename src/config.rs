//! Process-wide configuration, built once at startup and passed explicitly.

use std::path::{Path, PathBuf};

use crate::error::{EtlError, EtlResult};

/// Default table name used by the SQLite sink.
pub const DEFAULT_SQLITE_TABLE: &str = "nhanes_etl";

/// Locations and limits used by the pipeline, the sinks and the raw dataset catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Directory holding the five source extracts (and any other raw datasets).
    pub data_dir: PathBuf,
    /// Directory receiving flat-file and spreadsheet exports.
    pub output_dir: PathBuf,
    /// SQLite database file used by the relational sink.
    pub sqlite_path: PathBuf,
    /// Default table for the relational sink.
    pub sqlite_table: String,
    /// Upper bound on rows returned by a JSON window.
    pub max_json_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("db"),
            sqlite_path: PathBuf::from("db/etl.db"),
            sqlite_table: DEFAULT_SQLITE_TABLE.to_string(),
            max_json_rows: 1_000,
        }
    }
}

impl PipelineConfig {
    /// Configuration rooted at `data_dir`, with every other setting at its default.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Build a configuration from `DATA_DIR`, `OUTPUT_DIR`, `SQLITE_PATH`, `SQLITE_TABLE` and
    /// `MAX_JSON_ROWS`, falling back to [`Default`] for unset variables.
    pub fn from_env() -> EtlResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> EtlResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let max_json_rows = match lookup("MAX_JSON_ROWS") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| EtlError::Config {
                message: format!("MAX_JSON_ROWS must be a positive integer (got '{raw}'): {e}"),
            })?,
            None => defaults.max_json_rows,
        };

        Ok(Self {
            data_dir: lookup("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            output_dir: lookup("OUTPUT_DIR").map(PathBuf::from).unwrap_or(defaults.output_dir),
            sqlite_path: lookup("SQLITE_PATH").map(PathBuf::from).unwrap_or(defaults.sqlite_path),
            sqlite_table: lookup("SQLITE_TABLE").unwrap_or(defaults.sqlite_table),
            max_json_rows,
        })
    }

    /// Fails with [`EtlError::Config`] when the input location is missing or not a directory.
    pub fn validate(&self) -> EtlResult<()> {
        ensure_dir(&self.data_dir)
    }
}

fn ensure_dir(path: &Path) -> EtlResult<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(EtlError::Config {
            message: format!("data directory does not exist or is not a directory: {}", path.display()),
        })
    }
}
