// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A scratch directory with a config that points at a local DuckDB file.
struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let secrets = dir.path().join("secrets.yaml");
        std::fs::write(
            &secrets,
            format!("currency_db_creds:\n  dbname: {}\n", dir.path().join("rates.duckdb").display()),
        )
        .unwrap();

        let config = dir.path().join("fxload.yaml");
        std::fs::write(
            &config,
            format!(
                "secrets: {{ source: file, path: {} }}\ndatabase:\n  backend: duckdb\n",
                secrets.display()
            ),
        )
        .unwrap();
        Self { dir, config }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn fxload(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_fxload"))
            .arg("--config")
            .arg(&self.config)
            .args(args)
            .env_remove("FXLOAD_LOG")
            .output()
            .unwrap()
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_query_file_export() {
    let ws = Workspace::new();
    let query = ws.write(
        "query.sql",
        "CREATE TABLE t (a INTEGER, b VARCHAR);\nINSERT INTO t VALUES (1, 'x'), (2, 'y');\nSELECT a, b FROM t ORDER BY a;\n",
    );
    let output = ws.path("out.csv");

    let result = ws.fxload(&["run-query-from-file", arg(&query), "--export-csv", "--output", arg(&output)]);

    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "a,b\n1,x\n2,y\n");
}

#[test]
fn test_failing_statement_exits_nonzero() {
    let ws = Workspace::new();
    let query = ws.write("query.sql", "CREATE TABLE kept (a INTEGER);\nINSERT INTO missing VALUES (1);\n");

    let result = ws.fxload(&["run-query-from-file", arg(&query)]);
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("Statement 2 failed"));

    let check = ws.fxload(&["run-query", "SELECT count(*) FROM kept"]);
    assert!(check.status.success());
    assert_eq!(String::from_utf8_lossy(&check.stdout), "(0)\n");
}

#[test]
fn test_csv_ingest_then_query() {
    let ws = Workspace::new();
    let csv = ws.write(
        "rates.csv",
        "date,currency,base_currency,exchange_rate\n2022-01-03,EUR,USD,0.88\n2022-01-03,GBP,USD,0.74\n",
    );

    let ingest = ws.fxload(&["ingest_csv", arg(&csv), "--table-name", "rates"]);
    assert!(ingest.status.success(), "{}", String::from_utf8_lossy(&ingest.stderr));

    let query = ws.fxload(&["run-query", "SELECT currency_symbol, rate_date FROM rates ORDER BY currency_symbol"]);
    assert!(query.status.success());
    assert_eq!(String::from_utf8_lossy(&query.stdout), "(EUR, 2022-01-03)\n(GBP, 2022-01-03)\n");
}

#[test]
fn test_missing_credentials_fail() {
    let ws = Workspace::new();
    let result = ws.fxload(&["ingest_symbols"]);

    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("fixer_api_creds"));
}

#[test]
fn test_snapshot_to_local_dir() {
    let ws = Workspace::new();
    let setup = ws.write(
        "setup.sql",
        "CREATE TABLE exchange_rates (rate_date DATE, base_currecy_symbol VARCHAR, currency_symbol VARCHAR, exchange_rate DOUBLE);
         CREATE TABLE currency_metadata (currency_symbol VARCHAR, currency_name VARCHAR);
         INSERT INTO exchange_rates VALUES ('2022-01-01', 'USD', 'EUR', 0.5);",
    );
    assert!(ws.fxload(&["run-query-from-file", arg(&setup)]).status.success());

    let exports = ws.path("exports");
    let result = ws.fxload(&["export-snapshot", "--date", "2024-05-01", "--local-dir", arg(&exports)]);

    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(
        String::from_utf8_lossy(&result.stdout),
        "{\"statusCode\":200,\"body\":\"Done\"}\n"
    );
    let csv = std::fs::read_to_string(exports.join("2024-05-01.csv")).unwrap();
    assert!(csv.ends_with("2022-01-01,USD,EUR,,0.5\n"));
}
