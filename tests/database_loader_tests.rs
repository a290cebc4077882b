//! Integration tests for the database-backed loader.
//!
//! Definitions are loaded from files, imported into an in-memory store and read
//! back through the same loader contract:
//! - backend equivalence of load_all()
//! - empty tables and import modes

use generic_config::config::{SourceMode, SourceSettings};
use generic_config::db::Database;
use generic_config::db::import::ImportMode;
use generic_config::error::ErrorCode;
use generic_config::loader::{
    ConfigurationLoader, DatabaseConfigurationLoader, FileConfigurationLoader, LoaderFactory,
};
use generic_config::resolve::ResourceResolver;
use generic_config::types::ConfigurationSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const DATABASES: &str = r#"
databases:
  mainDb:
    url: "jdbc:h2:mem:trades"
    username: sa
    password: ""
    pool:
      maximumPoolSize: 5
  reportingDb:
    name: Reporting Store
    url: "jdbc:postgresql://localhost/reports"
"#;

const QUERIES: &str = r#"
queries:
  trades-all:
    database: mainDb
    sql: SELECT * FROM stock_trades LIMIT ? OFFSET ?
    parameters:
      - name: limit
        type: INTEGER
        required: true
      - name: offset
        type: INTEGER
        required: true
  trades-count:
    database: mainDb
    sql: SELECT COUNT(*) FROM stock_trades
"#;

const ENDPOINTS: &str = r#"
endpoints:
  trades-list:
    description: List stock trades
    path: /api/generic/stock-trades
    query: trades-all
    countQuery: trades-count
    pagination:
      enabled: true
      defaultSize: 25
      maxSize: 200
    parameters:
      - name: page
        type: INTEGER
        source: QUERY
    response:
      type: PAGED
      fields:
        - name: id
          type: LONG
  trades-create:
    method: POST
    path: /api/generic/stock-trades
    query: trades-all
"#;

fn write_definitions(root: &Path) {
    let dir = root.join("config");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("trades-database.yml"), DATABASES).unwrap();
    fs::write(dir.join("trades-queries.yml"), QUERIES).unwrap();
    fs::write(dir.join("trades-api.yml"), ENDPOINTS).unwrap();
}

fn file_loader(root: &Path) -> FileConfigurationLoader {
    let settings = SourceSettings {
        directories: vec!["./config".into()],
        ..Default::default()
    };
    FileConfigurationLoader::from_settings(ResourceResolver::new(root), &settings)
}

fn load_from_files(root: &Path) -> ConfigurationSet {
    file_loader(root).load_all().unwrap()
}

#[test]
fn test_backends_produce_identical_sets() {
    let temp = TempDir::new().unwrap();
    write_definitions(temp.path());
    let from_files = load_from_files(temp.path());

    let db = Database::open_in_memory().unwrap();
    db.import_configuration_set(&from_files, ImportMode::Fresh)
        .unwrap();
    let from_db = DatabaseConfigurationLoader::new(db).load_all().unwrap();

    assert_eq!(from_files, from_db);
    assert_eq!(
        from_files.endpoints.names().collect::<Vec<_>>(),
        from_db.endpoints.names().collect::<Vec<_>>()
    );
    assert_eq!(
        from_db.databases.get("reportingDb").unwrap().name,
        "Reporting Store"
    );
}

#[test]
fn test_factory_hides_backend_choice() {
    let temp = TempDir::new().unwrap();
    write_definitions(temp.path());

    let db = Database::open_in_memory().unwrap();
    db.import_configuration_set(&load_from_files(temp.path()), ImportMode::Fresh)
        .unwrap();

    let file_factory = LoaderFactory::new(SourceMode::File, file_loader(temp.path()), None).unwrap();
    let db_factory = LoaderFactory::new(
        SourceMode::Database,
        file_loader(temp.path()),
        Some(DatabaseConfigurationLoader::new(db)),
    )
    .unwrap();

    assert_eq!(file_factory.source_mode(), SourceMode::File);
    assert_eq!(db_factory.source_mode(), SourceMode::Database);
    assert_eq!(file_factory.load_all().unwrap(), db_factory.load_all().unwrap());
}

#[test]
fn test_empty_store_is_fatal_per_kind() {
    let db = Database::open_in_memory().unwrap();
    let loader = DatabaseConfigurationLoader::new(db);

    assert_eq!(loader.load_all().unwrap_err().code(), ErrorCode::EmptyTable);
    assert_eq!(loader.load_endpoints().unwrap_err().code(), ErrorCode::EmptyTable);
}

#[test]
fn test_partially_populated_store_fails_on_missing_kind() {
    let temp = TempDir::new().unwrap();
    write_definitions(temp.path());
    let mut set = load_from_files(temp.path());
    set.endpoints = Default::default();

    let db = Database::open_in_memory().unwrap();
    db.import_configuration_set(&set, ImportMode::Fresh).unwrap();
    let loader = DatabaseConfigurationLoader::new(db);

    assert_eq!(loader.load_databases().unwrap().len(), 2);
    assert_eq!(loader.load_queries().unwrap().len(), 2);
    let err = loader.load_all().unwrap_err();
    assert_eq!(err.code(), ErrorCode::EmptyTable);
    assert!(err.to_string().contains("config_endpoints"));
}

#[test]
fn test_reimport_in_replace_mode_matches_files_again() {
    let temp = TempDir::new().unwrap();
    write_definitions(temp.path());
    let set = load_from_files(temp.path());

    let db = Database::open_in_memory().unwrap();
    db.import_configuration_set(&set, ImportMode::Fresh).unwrap();
    let result = db
        .import_configuration_set(&set, ImportMode::Replace)
        .unwrap();

    assert_eq!(result.total_deleted(), 6);
    assert_eq!(result.total_rows(), 6);
    assert_eq!(DatabaseConfigurationLoader::new(db).load_all().unwrap(), set);
}

#[test]
fn test_store_on_disk_survives_reopen() {
    let temp = TempDir::new().unwrap();
    write_definitions(temp.path());
    let set = load_from_files(temp.path());
    let path = temp.path().join("data").join("config.db");

    {
        let db = Database::open(&path, true).unwrap();
        db.import_configuration_set(&set, ImportMode::Fresh).unwrap();
    }

    let db = Database::open(&path, false).unwrap();
    assert_eq!(DatabaseConfigurationLoader::new(db).load_all().unwrap(), set);
}
