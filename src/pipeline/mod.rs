//! The five-stage batch pipeline: read, normalize, link, derive, reconcile.
//!
//! Each stage consumes the previous stage's [`DataSet`] and returns a new one; nothing is
//! shared between runs. [`run_pipeline`] is the single entrypoint used by the CLI, and
//! [`run_transformations`] runs every stage after reading so tests can feed in-memory tables.
//!
//! ```no_run
//! use nhanes_etl::config::PipelineConfig;
//! use nhanes_etl::pipeline::run_pipeline;
//!
//! # fn main() -> Result<(), nhanes_etl::EtlError> {
//! let table = run_pipeline(&PipelineConfig::with_data_dir("data"))?;
//! println!("rows={} columns={}", table.row_count(), table.column_count());
//! # Ok(())
//! # }
//! ```

pub mod columns;
pub mod derive;
pub mod link;
pub mod normalize;
pub mod recode;
pub mod reconcile;
pub mod sources;

use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::error::EtlResult;
use crate::ingestion::{IngestionOptions, TracingObserver};
use crate::types::DataSet;

pub use sources::{SourceKind, SourceTables};

/// Final output of a pipeline run: one row per retained subject, columns in
/// [`columns::OUTPUT_COLUMNS`] order.
pub type AnalyticTable = DataSet;

/// Read the sources under `config.data_dir` and run every transformation stage.
pub fn run_pipeline(config: &PipelineConfig) -> EtlResult<AnalyticTable> {
    let options = IngestionOptions {
        observer: Some(Arc::new(TracingObserver)),
        ..Default::default()
    };
    run_pipeline_with(config, &options)
}

/// Like [`run_pipeline`], with caller-supplied ingestion options (observer, alert level).
pub fn run_pipeline_with(
    config: &PipelineConfig,
    options: &IngestionOptions,
) -> EtlResult<AnalyticTable> {
    config.validate()?;
    tracing::info!(data_dir = %config.data_dir.display(), "pipeline started");
    let tables = sources::read_sources(&config.data_dir, options)?;
    run_transformations(tables)
}

/// Normalize, link, derive and reconcile already-read source tables.
pub fn run_transformations(tables: SourceTables) -> EtlResult<AnalyticTable> {
    let normalized = normalize::normalize_all(tables);
    tracing::debug!(
        demographic = normalized.demographic.row_count(),
        dietary = normalized.dietary.row_count(),
        response = normalized.response.row_count(),
        questionnaire = normalized.questionnaire.row_count(),
        mortality = normalized.mortality.row_count(),
        "sources normalized"
    );

    let linked = link::link(normalized)?;
    tracing::info!(rows = linked.row_count(), columns = linked.column_count(), "sources linked");

    let derived = derive::derive(linked)?;
    let table = reconcile::reconcile(&derived);
    tracing::info!(rows = table.row_count(), "pipeline finished");
    Ok(table)
}
