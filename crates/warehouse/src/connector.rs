// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::{
    BulkWriter, DatabaseCredentials, DuckSession, DuckWriter, PgSession, PgWriter, Result, SecretBundle,
    WarehouseSession, pg,
};
use diagnostics::*;
use duckdb::Connection;
use serde::Deserialize;

/// Which engine holds the rate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// A remote Postgres database, reached over TLS.
    #[default]
    Postgres,
    /// A local DuckDB file; the bundle's `dbname` is the file path.
    DuckDb,
}

/// How statements that are not DDL become durable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    /// Every statement commits on its own; `commit` is a no-op.
    #[default]
    Autocommit,
    /// A transaction is opened before the first statement and stays open
    /// until `commit`. Uncommitted work is rolled back when the session
    /// is dropped.
    Explicit,
}

/// Resolved connection target.
#[derive(Debug, Clone)]
pub enum Target {
    Postgres(DatabaseCredentials),
    DuckDb(String),
}

impl Target {
    pub fn from_bundle(backend: Backend, bundle: &SecretBundle) -> Result<Self> {
        match backend {
            Backend::Postgres => Ok(Target::Postgres(DatabaseCredentials::from_bundle(bundle)?)),
            Backend::DuckDb => Ok(Target::DuckDb(bundle.require("dbname")?.to_string())),
        }
    }
}

/// Opens connections for one invocation.
///
/// Each call to [`Connector::session`] or [`Connector::bulk_writer`] opens a
/// fresh connection; nothing is pooled or kept between calls.
#[derive(Debug, Clone)]
pub struct Connector {
    target: Target,
    mode: TransactionMode,
}

impl Connector {
    pub fn new(target: Target, mode: TransactionMode) -> Self {
        Self { target, mode }
    }

    pub fn from_bundle(backend: Backend, bundle: &SecretBundle, mode: TransactionMode) -> Result<Self> {
        Ok(Self::new(Target::from_bundle(backend, bundle)?, mode))
    }

    /// A local DuckDB database at `path` (`:memory:` for a private one).
    pub fn duckdb<S: Into<String>>(path: S, mode: TransactionMode) -> Self {
        Self::new(Target::DuckDb(path.into()), mode)
    }

    pub fn mode(&self) -> TransactionMode {
        self.mode
    }

    /// Row-cursor flavor: executes statements and returns their results.
    pub fn session(&self) -> Result<WarehouseSession> {
        match &self.target {
            Target::DuckDb(path) => Ok(WarehouseSession::DuckDb(DuckSession::new(open_duckdb(path)?, self.mode))),
            Target::Postgres(creds) => Ok(WarehouseSession::Postgres(PgSession::new(pg::connect(creds)?, self.mode))),
        }
    }

    /// Bulk flavor: replaces whole tables.
    pub fn bulk_writer(&self) -> Result<BulkWriter> {
        match &self.target {
            Target::DuckDb(path) => Ok(BulkWriter::DuckDb(DuckWriter::new(open_duckdb(path)?))),
            Target::Postgres(creds) => Ok(BulkWriter::Postgres(PgWriter::new(pg::connect(creds)?))),
        }
    }
}

fn open_duckdb(path: &str) -> Result<Connection> {
    debug!("Opening DuckDB database {path}", path: path);
    if path == ":memory:" {
        Ok(Connection::open_in_memory()?)
    } else {
        Ok(Connection::open(path)?)
    }
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
