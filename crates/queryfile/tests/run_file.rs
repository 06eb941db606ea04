// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use queryfile::{ExecuteError, ExecuteOptions, execute_path};
use std::path::{Path, PathBuf};
use warehouse::{Connector, TransactionMode};

fn write_query(dir: &Path, sql: &str) -> PathBuf {
    let path = dir.join("query.sql");
    std::fs::write(&path, sql).unwrap();
    path
}

fn table_exists(path: &Path, table: &str) -> bool {
    let conn = duckdb::Connection::open(path).unwrap();
    let found: i64 = conn
        .query_row(
            "SELECT count(*) FROM information_schema.tables WHERE table_name = ?",
            [table],
            |row| row.get(0),
        )
        .unwrap();
    found > 0
}

#[test]
fn test_ddl_survives_later_failure() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("rates.duckdb");
    let query = write_query(
        dir.path(),
        "CREATE TABLE rates (symbol VARCHAR, rate DOUBLE);\nINSERT INTO missing VALUES (1);\n",
    );

    {
        let connector = Connector::duckdb(db.to_string_lossy(), TransactionMode::Explicit);
        let mut session = connector.session().unwrap();
        let mut console = Vec::new();

        let err = execute_path(&mut session, &query, &ExecuteOptions::default(), &mut console).unwrap_err();
        assert!(matches!(err, ExecuteError::Statement { index: 1, .. }));
    }

    assert!(table_exists(&db, "rates"));
}

#[test]
fn test_failure_skips_remaining_statements() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("rates.duckdb");
    let query = write_query(
        dir.path(),
        "CREATE TABLE a (x INTEGER);
         CREATE TABLE b (x INTEGER);
         SELEC broken;
         CREATE TABLE d (x INTEGER);
         CREATE TABLE e (x INTEGER);",
    );

    {
        let connector = Connector::duckdb(db.to_string_lossy(), TransactionMode::Autocommit);
        let mut session = connector.session().unwrap();
        let mut console = Vec::new();

        let err = execute_path(&mut session, &query, &ExecuteOptions::default(), &mut console).unwrap_err();
        assert_eq!(err.statement_index(), Some(2));
    }

    assert!(table_exists(&db, "a"));
    assert!(table_exists(&db, "b"));
    assert!(!table_exists(&db, "d"));
    assert!(!table_exists(&db, "e"));
}

#[test]
fn test_export_holds_last_result() {
    let dir = tempfile::tempdir().unwrap();
    let query = write_query(
        dir.path(),
        "CREATE TABLE rates (symbol VARCHAR, rate DOUBLE);
         INSERT INTO rates VALUES ('EUR', 0.5), ('GBP', 0.25);
         SELECT count(*) AS n FROM rates;
         SELECT symbol, rate FROM rates ORDER BY symbol;",
    );
    let options = ExecuteOptions {
        show_output: true,
        export_csv: true,
        export_path: dir.path().join("output.csv"),
    };

    let connector = Connector::duckdb(":memory:", TransactionMode::Autocommit);
    let mut session = connector.session().unwrap();
    let mut console = Vec::new();
    let report = execute_path(&mut session, &query, &options, &mut console).unwrap();

    assert_eq!(report.statements, 4);
    assert_eq!(report.commits, 1);
    assert_eq!(report.last_columns, vec!["symbol", "rate"]);
    assert_eq!(report.last_rows, 2);
    assert_eq!(
        std::fs::read_to_string(&options.export_path).unwrap(),
        "symbol,rate\nEUR,0.5\nGBP,0.25\n"
    );

    let console = String::from_utf8(console).unwrap();
    assert!(console.contains("| symbol | rate |"));
    assert!(console.contains("| n |"));
}

#[test]
fn test_whitespace_file_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let query = write_query(dir.path(), "\n   ;\n\t;  \n");
    let options = ExecuteOptions {
        export_csv: true,
        export_path: dir.path().join("output.csv"),
        ..ExecuteOptions::default()
    };

    let connector = Connector::duckdb(":memory:", TransactionMode::Autocommit);
    let mut session = connector.session().unwrap();
    let mut console = Vec::new();
    let report = execute_path(&mut session, &query, &options, &mut console).unwrap();

    assert_eq!(report.statements, 0);
    assert_eq!(report.exported, None);
    assert!(!options.export_path.exists());
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let connector = Connector::duckdb(":memory:", TransactionMode::Autocommit);
    let mut session = connector.session().unwrap();
    let mut console = Vec::new();

    let err = execute_path(
        &mut session,
        &dir.path().join("absent.sql"),
        &ExecuteOptions::default(),
        &mut console,
    )
    .unwrap_err();
    assert!(matches!(err, ExecuteError::Read { .. }));
}
