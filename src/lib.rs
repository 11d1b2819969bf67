//! `nhanes-etl` links five health-survey extracts (demographic, dietary, laboratory/exam
//! response, questionnaire, mortality) into one analytic table, one row per subject.
//!
//! The primary entrypoint is [`pipeline::run_pipeline`]. It reads the sources from the
//! configured data directory, then:
//!
//! 1. renames raw survey codes to semantic column names and recodes categorical codes to labels
//! 2. joins every source onto the demographic table, one-to-one on the subject identifier
//! 3. derives the albumin-to-creatinine ratio and the estimated glomerular filtration rate,
//!    with their KDIGO stages
//! 4. drops excluded subjects, projects to the fixed output columns, and fills missing values
//!    (sentinel labels for text, column medians for numbers)
//!
//! ## Quick example
//!
//! ```no_run
//! use nhanes_etl::config::PipelineConfig;
//! use nhanes_etl::pipeline::run_pipeline;
//! use nhanes_etl::sink::{save_to_file, ExportFormat};
//!
//! # fn main() -> Result<(), nhanes_etl::EtlError> {
//! let config = PipelineConfig::from_env()?;
//! let table = run_pipeline(&config)?;
//! let path = save_to_file(&table, &config, "analytic_table", ExportFormat::Csv)?;
//! println!("{} rows -> {}", table.row_count(), path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`pipeline`]: the read/normalize/link/derive/reconcile stages
//! - [`ingestion`]: schema-driven CSV (and, with feature `excel`, workbook) readers
//! - [`processing`]: filter/map/reduce over [`types::DataSet`]
//! - [`sink`]: CSV, XLSX (feature `xlsx`) and SQLite (feature `sqlite`) outputs
//! - [`catalog`]: listing, describing and paging through raw datasets
//! - [`config`]: locations and limits, from the environment or built in code
//! - [`error`]: the crate-wide error type
//!
//! Progress and data-quality warnings (unmapped codes, duplicate dietary rows, all-missing
//! columns) are emitted through `tracing`; install a subscriber to see them.

pub mod catalog;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod pipeline;
pub mod processing;
pub mod sink;
pub mod types;

pub use config::PipelineConfig;
pub use error::{EtlError, EtlResult};
pub use pipeline::{run_pipeline, AnalyticTable};
