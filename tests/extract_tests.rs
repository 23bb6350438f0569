//! Extraction tests against the scripted warehouse mock

mod common;

use std::fs;

use common::MockConnector;
use dss_loader::models::{ColumnSpec, DatasetSpec};
use dss_loader::warehouse::FetchResult;
use dss_loader::{DssError, ExtractEngine};
use serde_json::json;
use tempfile::TempDir;

fn accounts_dataset() -> DatasetSpec {
    let mut dataset = DatasetSpec::new("accounts", "src_accounts");
    dataset.columns = vec![
        ColumnSpec::source("id", "Id"),
        ColumnSpec::source("name", "Name"),
    ];
    dataset
}

fn connector_with_load_info() -> MockConnector {
    let connector = MockConnector::new();
    connector.set_load_info_row(json!({"source_server": "sf01", "_LOAD_ID": "1700000000"}));
    connector
}

#[test]
fn extract_writes_force_quoted_csv_and_records_path() {
    let dir = TempDir::new().unwrap();
    let connector = connector_with_load_info();
    connector.push_fetch(FetchResult::new(
        vec!["id".to_string(), "name".to_string()],
        vec![
            json!({"id": 1, "name": "alice"}),
            json!({"id": 2, "name": null}),
        ],
    ));

    let engine = ExtractEngine::with_options(connector.clone(), None, dir.path().join("out"));
    let mut datasets = vec![accounts_dataset()];
    engine.extract_data(&mut datasets).unwrap();

    let csv_path = datasets[0].csv_path.as_ref().expect("csv path recorded");
    assert!(csv_path.is_absolute());
    let file_name = csv_path.file_name().unwrap().to_string_lossy();
    assert!(file_name.starts_with("accounts-"));
    assert!(file_name.ends_with(".csv"));

    let content = fs::read_to_string(csv_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "\"id\",\"name\"");
    assert_eq!(lines[1], "\"1\",\"alice\"");
    assert_eq!(lines[2], "\"2\",\"\"");
}

#[test]
fn extract_generates_latest_load_filter() {
    let dir = TempDir::new().unwrap();
    let connector = connector_with_load_info();
    connector.push_fetch(FetchResult::new(
        vec!["id".to_string(), "name".to_string()],
        vec![],
    ));

    let engine = ExtractEngine::with_options(connector.clone(), None, dir.path().join("out"));
    let mut datasets = vec![accounts_dataset()];
    engine.extract_data(&mut datasets).unwrap();

    let executed = connector.executed();
    let select = executed
        .iter()
        .find(|s| s.starts_with("SELECT Id AS id"))
        .unwrap();
    assert_eq!(
        select.as_str(),
        "SELECT Id AS id,Name AS name FROM src_accounts \
         WHERE _INSERTED_AT = (SELECT MAX(_LOAD_ID) FROM dss_meta_loads)"
    );
}

#[test]
fn extract_validates_header_against_declared_columns() {
    let dir = TempDir::new().unwrap();
    let connector = connector_with_load_info();
    connector.push_fetch(FetchResult::new(
        vec!["id".to_string(), "unexpected".to_string()],
        vec![],
    ));

    let engine = ExtractEngine::with_options(connector, None, dir.path().join("out"));
    let mut datasets = vec![accounts_dataset()];

    let err = engine.extract_data(&mut datasets).unwrap_err();
    match err {
        DssError::ColumnMismatch { expected, actual } => {
            assert_eq!(expected, vec!["id", "name"]);
            assert_eq!(actual, vec!["id", "unexpected"]);
        }
        other => panic!("expected ColumnMismatch, got {other}"),
    }
    assert!(datasets[0].csv_path.is_none());
}

#[test]
fn custom_sql_dataset_reads_file_and_skips_validation() {
    let dir = TempDir::new().unwrap();
    let sql_file = dir.path().join("custom.sql");
    fs::write(&sql_file, "SELECT 1 AS x").unwrap();

    let connector = connector_with_load_info();
    connector.push_fetch(FetchResult::new(
        vec!["whatever".to_string()],
        vec![json!({"whatever": "v"})],
    ));

    let engine = ExtractEngine::with_options(connector.clone(), None, dir.path().join("out"));
    let mut datasets = vec![DatasetSpec::with_custom_sql("raw", &sql_file)];
    engine.extract_data(&mut datasets).unwrap();

    assert!(connector.executed().contains(&"SELECT 1 AS x".to_string()));
    assert!(datasets[0].csv_path.is_some());
}

#[test]
fn dataset_without_source_or_custom_sql_fails() {
    let dir = TempDir::new().unwrap();
    let connector = connector_with_load_info();

    let engine = ExtractEngine::with_options(connector, None, dir.path().join("out"));
    let mut datasets = vec![DatasetSpec {
        name: "broken".to_string(),
        ..Default::default()
    }];

    let err = engine.extract_data(&mut datasets).unwrap_err();
    assert!(matches!(err, DssError::InvalidSpec(_)));
    assert!(err.to_string().contains("broken"));
}

#[test]
fn extract_uses_prefixed_metadata_table() {
    let dir = TempDir::new().unwrap();
    let connector = connector_with_load_info();
    connector.push_fetch(FetchResult::new(vec!["id".to_string()], vec![]));

    let engine = ExtractEngine::with_options(
        connector.clone(),
        Some("acme".to_string()),
        dir.path().join("out"),
    );
    let mut dataset = DatasetSpec::new("accounts", "src_accounts");
    dataset.columns = vec![ColumnSpec::source("id", "Id")];
    let mut datasets = vec![dataset];
    engine.extract_data(&mut datasets).unwrap();

    let executed = connector.executed();
    assert!(executed[0].contains("FROM dss_acme_meta_loads"));
    assert!(
        executed
            .iter()
            .any(|s| s.contains("(SELECT MAX(_LOAD_ID) FROM dss_acme_meta_loads)"))
    );
}

#[test]
fn load_info_returns_latest_metadata_row() {
    let connector = connector_with_load_info();
    let engine = ExtractEngine::with_options(connector, None, "tmp");

    let info = engine.load_info().unwrap();
    assert_eq!(info.text("source_server"), "sf01");
    assert_eq!(info.text("_LOAD_ID"), "1700000000");
}

#[test]
fn load_info_is_empty_when_nothing_was_loaded() {
    let connector = MockConnector::new();
    let engine = ExtractEngine::with_options(connector, None, "tmp");

    let info = engine.load_info().unwrap();
    assert!(info.is_empty());
}
