//! Unified ingestion entrypoint.
//!
//! Most callers should use [`ingest_from_path`], which ingests a file into an in-memory
//! [`crate::types::DataSet`] using a provided [`crate::types::Schema`].
//!
//! - If [`IngestionOptions::format`] is `None`, the ingestion format is inferred from the file
//!   extension.
//! - If an [`super::observability::IngestionObserver`] is provided, success/failure/alerts are
//!   reported to it.

use std::error::Error as StdError;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{EtlError, EtlResult};
use crate::types::{DataSet, Schema};

use super::csv::{self, CellPolicy};
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values (`.csv`, `.txt`).
    Csv,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<IngestionFormat>,
    /// Sheet to read from a workbook; `None` means the first sheet.
    pub sheet_name: Option<String>,
    /// Handling of cells that do not parse as their schema type.
    pub cell_policy: CellPolicy,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("sheet_name", &self.sheet_name)
            .field("cell_policy", &self.cell_policy)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            sheet_name: None,
            cell_policy: CellPolicy::Strict,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Unified ingestion entry point for path-based sources.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row count stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// ```no_run
/// use nhanes_etl::ingestion::{ingest_from_path, IngestionOptions};
/// use nhanes_etl::types::{DataType, Field, Schema};
///
/// # fn main() -> Result<(), nhanes_etl::EtlError> {
/// let schema = Schema::new(vec![
///     Field::new("SEQN_new", DataType::Utf8),
///     Field::new("MORTSTAT", DataType::Int64),
/// ]);
/// let ds = ingest_from_path("data/mortality_unclean.csv", &schema, &IngestionOptions::default())?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    options: &IngestionOptions,
) -> EtlResult<DataSet> {
    let path = path.as_ref();
    observe(path, options, |fmt| match fmt {
        IngestionFormat::Csv => csv::ingest_csv_from_path(path, schema, options.cell_policy),
        IngestionFormat::Excel => ingest_excel_dispatch(path, Some(schema), options),
    })
}

/// Like [`ingest_from_path`], but every column found in the header row is read as text.
pub fn ingest_text_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> EtlResult<DataSet> {
    let path = path.as_ref();
    observe(path, options, |fmt| match fmt {
        IngestionFormat::Csv => csv::ingest_csv_as_text(path),
        IngestionFormat::Excel => ingest_excel_dispatch(path, None, options),
    })
}

fn observe<F>(path: &Path, options: &IngestionOptions, ingest: F) -> EtlResult<DataSet>
where
    F: FnOnce(IngestionFormat) -> EtlResult<DataSet>,
{
    let fmt = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    let ctx = IngestionContext {
        path: path.to_path_buf(),
        format: fmt,
    };

    let result = ingest(fmt);

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(ds) => obs.on_success(&ctx, IngestionStats { rows: ds.row_count() }),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

fn severity_for_error(e: &EtlError) -> IngestionSeverity {
    match e {
        EtlError::Io(_) | EtlError::SourceNotFound { .. } | EtlError::Config { .. } => {
            IngestionSeverity::Critical
        }
        EtlError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        },
        other if error_chain_contains_io(other) => IngestionSeverity::Critical,
        _ => IngestionSeverity::Error,
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = e.source();
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

fn infer_format_from_path(path: &Path) -> EtlResult<IngestionFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| EtlError::UnsupportedFormat {
            format: format!("<no extension> ({})", path.display()),
        })?;

    IngestionFormat::from_extension(ext).ok_or_else(|| EtlError::UnsupportedFormat {
        format: ext.to_string(),
    })
}

fn ingest_excel_dispatch(
    path: &Path,
    schema: Option<&Schema>,
    options: &IngestionOptions,
) -> EtlResult<DataSet> {
    // Avoid unused warnings when the feature is off.
    let _ = (path, schema, options);

    #[cfg(feature = "excel")]
    {
        use super::excel;

        let sheet = options.sheet_name.as_deref();
        match schema {
            Some(schema) => excel::ingest_excel_from_path(path, sheet, schema, options.cell_policy),
            None => excel::ingest_excel_as_text(path, sheet),
        }
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(EtlError::UnsupportedFormat {
            format: "excel (enable cargo feature 'excel')".to_string(),
        })
    }
}
