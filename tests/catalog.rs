use nhanes_etl::catalog::{
    describe_dataset, list_datasets, read_dataset, resolve_dataset, select_columns, to_json_records,
    window,
};
use nhanes_etl::EtlError;

const FIXTURES: &str = "tests/fixtures";

#[test]
fn lists_the_five_sources() {
    let dir = std::path::Path::new(FIXTURES);
    let names: Vec<String> = list_datasets(dir).unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(
        names,
        vec![
            "demographics_unclean.csv",
            "dietary_unclean.csv",
            "mortality_unclean.csv",
            "questionnaire_unclean.csv",
            "response_unclean.csv",
        ]
    );
}

#[test]
fn describe_reports_columns_and_rows() {
    let desc = describe_dataset(FIXTURES.as_ref(), "mortality_unclean.csv").unwrap();
    assert_eq!(desc.rows, 5);
    let names: Vec<&str> = desc.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["SEQN_new", "ELIGSTAT", "MORTSTAT", "UCOD_LEADING"]);
    assert_eq!(desc.columns[2].dtype, "i64");
}

#[test]
fn preview_pages_through_selected_columns() {
    let ds = read_dataset(FIXTURES.as_ref(), "dietary_unclean.csv").unwrap();
    let ds = select_columns(&ds, &["RIDAGEYR", "SEQN_new"]).unwrap();
    let page = window(&ds, 1, 2, 1000);
    assert_eq!(
        to_json_records(&page),
        serde_json::json!([
            { "RIDAGEYR": "60", "SEQN_new": "2" },
            { "RIDAGEYR": "45", "SEQN_new": "3" },
        ])
    );
}

#[test]
fn traversal_is_rejected() {
    let err = resolve_dataset(FIXTURES.as_ref(), "../Cargo.toml").unwrap_err();
    assert!(matches!(err, EtlError::InvalidName { .. }));
    let err = resolve_dataset(FIXTURES.as_ref(), "nope.csv").unwrap_err();
    assert!(matches!(err, EtlError::SourceNotFound { .. }));
}

#[cfg(all(feature = "excel", feature = "xlsx"))]
#[test]
fn workbooks_are_listed_described_and_read() {
    use nhanes_etl::sink::xlsx::save_xlsx;
    use nhanes_etl::types::{DataSet, DataType, Field, Schema, Value};

    let table = DataSet::new(
        Schema::new(vec![
            Field::new("SEQN_new", DataType::Utf8),
            Field::new("RIAGENDR", DataType::Int64),
            Field::new("RIDAGEYR", DataType::Float64),
        ]),
        vec![
            vec![Value::Utf8("a1".into()), Value::Int64(1), Value::Float64(40.0)],
            vec![Value::Utf8("a2".into()), Value::Int64(2), Value::Float64(41.5)],
        ],
    );
    let dir = tempfile::tempdir().unwrap();
    save_xlsx(&table, &dir.path().join("dietary.xlsx")).unwrap();
    std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();

    let listed = list_datasets(dir.path()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].extension, "xlsx");

    let desc = describe_dataset(dir.path(), "dietary.xlsx").unwrap();
    assert_eq!(desc.rows, 2);
    let dtypes: Vec<&str> = desc.columns.iter().map(|c| c.dtype.as_str()).collect();
    assert_eq!(dtypes, vec!["str", "i64", "f64"]);

    let ds = read_dataset(dir.path(), "dietary.xlsx").unwrap();
    let page = select_columns(&ds, &["SEQN_new", "RIDAGEYR"]).unwrap();
    assert_eq!(
        to_json_records(&page),
        serde_json::json!([
            { "SEQN_new": "a1", "RIDAGEYR": "40" },
            { "SEQN_new": "a2", "RIDAGEYR": "41.5" },
        ])
    );
}
