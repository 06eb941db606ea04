// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::{PgSession, Result, ResultSet, TransactionMode};
use arrow::record_batch::RecordBatch;
use diagnostics::*;
use duckdb::Connection;

/// A connection that executes one statement at a time.
pub trait Session {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute a single complete statement and fetch all of its rows.
    fn execute(&mut self, sql: &str) -> std::result::Result<ResultSet, Self::Error>;

    /// Make the work done so far durable.
    fn commit(&mut self) -> std::result::Result<(), Self::Error>;
}

/// Row-cursor flavor of a connection, for whichever backend holds the
/// rate tables.
pub enum WarehouseSession {
    DuckDb(DuckSession),
    Postgres(PgSession),
}

impl WarehouseSession {
    pub fn in_transaction(&self) -> bool {
        match self {
            WarehouseSession::DuckDb(session) => session.in_transaction(),
            WarehouseSession::Postgres(session) => session.in_transaction(),
        }
    }
}

impl Session for WarehouseSession {
    type Error = crate::WarehouseError;

    fn execute(&mut self, sql: &str) -> Result<ResultSet> {
        match self {
            WarehouseSession::DuckDb(session) => session.execute(sql),
            WarehouseSession::Postgres(session) => session.execute(sql),
        }
    }

    fn commit(&mut self) -> Result<()> {
        match self {
            WarehouseSession::DuckDb(session) => session.commit(),
            WarehouseSession::Postgres(session) => session.commit(),
        }
    }
}

/// [`Session`] over a DuckDB connection.
///
/// In [`TransactionMode::Explicit`] a transaction is begun lazily before
/// the first statement after each commit; whatever is still pending when
/// the session is dropped is rolled back.
pub struct DuckSession {
    conn: Connection,
    mode: TransactionMode,
    in_transaction: bool,
}

impl DuckSession {
    pub fn new(conn: Connection, mode: TransactionMode) -> Self {
        Self {
            conn,
            mode,
            in_transaction: false,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Discard the pending transaction, if any.
    pub fn rollback(&mut self) -> Result<()> {
        if self.in_transaction {
            self.in_transaction = false;
            self.conn.execute_batch("ROLLBACK")?;
            debug!("Rolled back pending transaction");
        }
        Ok(())
    }

    fn begin_if_needed(&mut self) -> Result<()> {
        if self.mode == TransactionMode::Explicit && !self.in_transaction {
            self.conn.execute_batch("BEGIN TRANSACTION")?;
            self.in_transaction = true;
        }
        Ok(())
    }
}

impl Session for DuckSession {
    type Error = crate::WarehouseError;

    fn execute(&mut self, sql: &str) -> Result<ResultSet> {
        self.begin_if_needed()?;

        let mut stmt = self.conn.prepare(sql)?;
        let arrow = stmt.query_arrow([])?;
        let schema = arrow.get_schema();
        let batches: Vec<RecordBatch> = arrow.collect();

        let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
        debug!("Statement returned {rows} rows", rows: rows);
        Ok(ResultSet::new(schema, batches))
    }

    fn commit(&mut self) -> Result<()> {
        if self.in_transaction {
            self.in_transaction = false;
            self.conn.execute_batch("COMMIT")?;
            debug!("Committed transaction");
        }
        Ok(())
    }
}

impl Drop for DuckSession {
    fn drop(&mut self) {
        if let Err(err) = self.rollback() {
            let message = err.to_string();
            warn!("Rollback on close failed: {message}", message: message);
        }
    }
}
