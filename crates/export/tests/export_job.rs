// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDate;
use export::{ExportError, ExportJob, LocalDirSink, ObjectSink, Response};
use std::cell::RefCell;
use warehouse::{Connector, Session, TransactionMode, WarehouseSession};

/// Keeps every upload in memory, or refuses them all.
#[derive(Default)]
struct MemorySink {
    refuse: bool,
    objects: RefCell<Vec<(String, String)>>,
}

impl ObjectSink for MemorySink {
    fn put(&self, key: &str, body: &[u8], _content_type: &str) -> export::Result<()> {
        if self.refuse {
            return Err(ExportError::Upload {
                key: key.to_string(),
                message: "access denied".to_string(),
            });
        }
        self.objects
            .borrow_mut()
            .push((key.to_string(), String::from_utf8_lossy(body).into_owned()));
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn loaded_session() -> WarehouseSession {
    let mut session = Connector::duckdb(":memory:", TransactionMode::Autocommit).session().unwrap();
    for sql in [
        "CREATE TABLE exchange_rates (rate_date DATE, base_currecy_symbol VARCHAR, currency_symbol VARCHAR, exchange_rate DOUBLE);",
        "CREATE TABLE currency_metadata (currency_symbol VARCHAR, currency_name VARCHAR);",
        "INSERT INTO exchange_rates VALUES ('2022-01-01', 'USD', 'GBP', 0.75), ('2022-01-01', 'USD', 'EUR', 0.5);",
        "INSERT INTO currency_metadata VALUES ('EUR', 'Euro'), ('GBP', 'British Pound Sterling');",
    ] {
        session.execute(sql).unwrap();
    }
    session
}

#[test]
fn test_embedded_export_uploads_dated_csv() {
    let mut session = loaded_session();
    let sink = MemorySink::default();

    let response = ExportJob::embedded().unwrap().run(&mut session, &sink, today());

    assert_eq!(response, Response::done());
    let objects = sink.objects.borrow();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].0, "2024-05-01.csv");
    assert_eq!(
        objects[0].1,
        "rate_date,base_currency_symbol,currency_symbol,currency_name,exchange_rate\n\
         2022-01-01,USD,EUR,Euro,0.5\n\
         2022-01-01,USD,GBP,British Pound Sterling,0.75\n"
    );
}

#[test]
fn test_query_failure_is_500() {
    let mut session = Connector::duckdb(":memory:", TransactionMode::Autocommit).session().unwrap();
    let sink = MemorySink::default();

    let response = ExportJob::embedded().unwrap().run(&mut session, &sink, today());

    assert_eq!(response, Response::failed("Error executing query"));
    assert!(sink.objects.borrow().is_empty());
}

#[test]
fn test_upload_failure_is_500() {
    let mut session = loaded_session();
    let sink = MemorySink {
        refuse: true,
        ..MemorySink::default()
    };

    let response = ExportJob::embedded().unwrap().run(&mut session, &sink, today());
    assert_eq!(response, Response::failed("Error uploading export"));
}

#[test]
fn test_exports_last_statement_only() {
    let mut session = Connector::duckdb(":memory:", TransactionMode::Explicit).session().unwrap();
    let sink = MemorySink::default();
    let job = ExportJob::new(
        "CREATE TABLE snapshot (n INTEGER);
         INSERT INTO snapshot VALUES (1), (2);
         SELECT count(*) AS total FROM snapshot;
         SELECT n FROM snapshot ORDER BY n DESC",
    )
    .unwrap();

    assert!(job.run(&mut session, &sink, today()).is_success());
    assert_eq!(sink.objects.borrow()[0].1, "n\n2\n1\n");
}

#[test]
fn test_local_dir_dry_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = loaded_session();
    let sink = LocalDirSink::new(dir.path());

    let response = ExportJob::embedded().unwrap().run(&mut session, &sink, today());

    assert!(response.is_success());
    let written = std::fs::read_to_string(dir.path().join("2024-05-01.csv")).unwrap();
    assert!(written.starts_with("rate_date,"));
}
