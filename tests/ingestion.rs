use std::sync::{Arc, Mutex};

use nhanes_etl::config::PipelineConfig;
use nhanes_etl::ingestion::{
    ingest_from_path, IngestionContext, IngestionFormat, IngestionObserver, IngestionOptions,
    IngestionSeverity, IngestionStats,
};
use nhanes_etl::pipeline::{run_pipeline_with, SourceKind};
use nhanes_etl::types::{DataType, Field, Schema, Value};
use nhanes_etl::EtlError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<usize>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, _ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push(stats.rows);
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &EtlError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &EtlError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn csv_options(obs: Arc<RecordingObserver>) -> IngestionOptions {
    IngestionOptions {
        format: Some(IngestionFormat::Csv),
        observer: Some(obs),
        alert_at_or_above: IngestionSeverity::Critical,
        ..Default::default()
    }
}

#[test]
fn pipeline_reports_every_source_read() {
    let obs = Arc::new(RecordingObserver::default());
    run_pipeline_with(&PipelineConfig::with_data_dir("tests/fixtures"), &csv_options(obs.clone()))
        .unwrap();

    let mut rows = obs.successes.lock().unwrap().clone();
    rows.sort_unstable();
    assert_eq!(rows, vec![5, 5, 5, 6, 6]);
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn unreadable_file_alerts_as_critical() {
    let obs = Arc::new(RecordingObserver::default());
    let schema = SourceKind::Mortality.raw_schema();
    let _ = ingest_from_path("tests/fixtures/does_not_exist.csv", &schema, &csv_options(obs.clone()))
        .unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![IngestionSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![IngestionSeverity::Critical]);
}

#[test]
fn malformed_code_fails_without_alert() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mortality_unclean.csv");
    std::fs::write(&path, "SEQN_new,MORTSTAT,UCOD_LEADING\n1,alive,\n").unwrap();

    let obs = Arc::new(RecordingObserver::default());
    let err = ingest_from_path(&path, &SourceKind::Mortality.raw_schema(), &csv_options(obs.clone()))
        .unwrap_err();

    match err {
        EtlError::ParseError { row, column, .. } => {
            assert_eq!(row, 2);
            assert_eq!(column, "MORTSTAT");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(*obs.failures.lock().unwrap(), vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn format_is_inferred_from_extension() {
    let schema = Schema::new(vec![
        Field::new("SEQN_new", DataType::Utf8),
        Field::new("RIDAGEYR", DataType::Float64),
    ]);
    let ds = ingest_from_path(
        "tests/fixtures/dietary_unclean.csv",
        &schema,
        &IngestionOptions::default(),
    )
    .unwrap();
    assert_eq!(ds.row_count(), 6);
    assert_eq!(ds.rows[0], vec![Value::Utf8("1".into()), Value::Float64(50.0)]);

    let err = ingest_from_path("tests/fixtures/data.parquet", &schema, &IngestionOptions::default())
        .unwrap_err();
    assert!(matches!(err, EtlError::UnsupportedFormat { .. }));
}
