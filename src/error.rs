use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for pipeline, ingestion and sink operations.
pub type EtlResult<T> = Result<T, EtlError>;

/// Error type returned across the crate.
///
/// Every variant aborts the current pipeline invocation; no partial table is ever returned.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Underlying I/O error (e.g. permission denied while writing an export).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    /// Excel ingestion error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[cfg(feature = "xlsx")]
    /// Spreadsheet export error (feature-gated behind `xlsx`).
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[cfg(feature = "sqlite")]
    /// SQLite sink error (feature-gated behind `sqlite`).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON rendering error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Polars error raised while describing a raw dataset.
    #[error("polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// The configured input location is missing or not a directory.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// A required input file is absent.
    #[error("source '{source_name}' not found: {path}")]
    SourceNotFound { source_name: String, path: PathBuf },

    /// The input does not conform to the expected column set.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A key collision broke the one-to-one join invariant.
    #[error("one-to-one join with '{source_name}' violated: key '{key}' is duplicated on the {side} side")]
    JoinCardinality {
        source_name: String,
        key: String,
        side: JoinSide,
    },

    /// An export format outside the supported set was requested.
    #[error("unsupported format '{format}'")]
    UnsupportedFormat { format: String },

    /// The target table already exists and the write policy is `Fail`.
    #[error("table '{table}' already exists")]
    TableExists { table: String },

    /// A dataset or table name was rejected (path traversal, empty name, ...).
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}

/// Which side of a join held a duplicated key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSide {
    Left,
    Right,
}

impl std::fmt::Display for JoinSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_not_found_names_the_file() {
        let err = EtlError::SourceNotFound {
            source_name: "mortality".to_string(),
            path: PathBuf::from("/data/mortality_unclean.csv"),
        };
        assert_eq!(
            err.to_string(),
            "source 'mortality' not found: /data/mortality_unclean.csv"
        );
    }

    #[test]
    fn join_cardinality_message_mentions_side_and_key() {
        let err = EtlError::JoinCardinality {
            source_name: "response".to_string(),
            key: "17".to_string(),
            side: JoinSide::Left,
        };
        let msg = err.to_string();
        assert!(msg.contains("'17'"));
        assert!(msg.contains("left side"));
    }
}
