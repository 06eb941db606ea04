// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Native Postgres connections over TLS.

use crate::bulk::{create_table_sql, table_ident, unsupported};
use crate::{DatabaseCredentials, Result, ResultSet, Session, TableWriter, TransactionMode, WarehouseError};
use arrow::array::{Array, ArrayRef, AsArray, StringBuilder};
use arrow::datatypes::{DataType, Date32Type, Field, Float64Type, Int32Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use diagnostics::*;
use postgres::config::SslMode;
use postgres::types::ToSql;
use postgres::{Client, Config, SimpleQueryMessage};
use postgres_native_tls::MakeTlsConnector;
use std::sync::Arc;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

type Param = Box<dyn ToSql + Sync>;

/// Connection settings for `creds`. TLS is required.
pub(crate) fn config(creds: &DatabaseCredentials) -> Config {
    let mut config = Config::new();
    config
        .user(&creds.username)
        .password(&creds.password)
        .host(&creds.host)
        .port(creds.port)
        .dbname(&creds.dbname)
        .ssl_mode(SslMode::Require)
        .connect_timeout(CONNECT_TIMEOUT);
    config
}

pub(crate) fn connect(creds: &DatabaseCredentials) -> Result<Client> {
    let host = creds.host.clone();
    let dbname = creds.dbname.clone();
    info!("Connecting to Postgres database {dbname} on {host}", dbname: &dbname, host: &host);

    let tls = MakeTlsConnector::new(native_tls::TlsConnector::new()?);
    config(creds)
        .connect(tls)
        .map_err(|source| WarehouseError::Connect { host, dbname, source })
}

/// [`Session`] over a Postgres client.
///
/// Statements go through the simple query protocol, so every column comes
/// back as nullable text. Transactions follow the same rules as
/// [`crate::DuckSession`].
pub struct PgSession {
    client: Client,
    mode: TransactionMode,
    in_transaction: bool,
}

impl PgSession {
    pub fn new(client: Client, mode: TransactionMode) -> Self {
        Self {
            client,
            mode,
            in_transaction: false,
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Discard the pending transaction, if any.
    pub fn rollback(&mut self) -> Result<()> {
        if self.in_transaction {
            self.in_transaction = false;
            self.client.batch_execute("ROLLBACK")?;
            debug!("Rolled back pending transaction");
        }
        Ok(())
    }

    fn begin_if_needed(&mut self) -> Result<()> {
        if self.mode == TransactionMode::Explicit && !self.in_transaction {
            self.client.batch_execute("BEGIN")?;
            self.in_transaction = true;
        }
        Ok(())
    }
}

impl Session for PgSession {
    type Error = WarehouseError;

    fn execute(&mut self, sql: &str) -> Result<ResultSet> {
        self.begin_if_needed()?;

        let mut columns: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<Option<String>>> = Vec::new();
        for message in self.client.simple_query(sql)? {
            match message {
                SimpleQueryMessage::RowDescription(description) => {
                    columns = description.iter().map(|column| column.name().to_string()).collect();
                    rows.clear();
                }
                SimpleQueryMessage::Row(row) => {
                    if columns.is_empty() {
                        columns = row.columns().iter().map(|column| column.name().to_string()).collect();
                    }
                    rows.push((0..row.len()).map(|i| row.get(i).map(str::to_string)).collect());
                }
                _ => {}
            }
        }

        let count = rows.len();
        debug!("Statement returned {count} rows", count: count);
        text_result(&columns, &rows)
    }

    fn commit(&mut self) -> Result<()> {
        if self.in_transaction {
            self.in_transaction = false;
            self.client.batch_execute("COMMIT")?;
            debug!("Committed transaction");
        }
        Ok(())
    }
}

impl Drop for PgSession {
    fn drop(&mut self) {
        if let Err(err) = self.rollback() {
            let message = err.to_string();
            warn!("Rollback on close failed: {message}", message: message);
        }
    }
}

/// One Utf8 column per name. No names means no tabular result.
fn text_result(columns: &[String], rows: &[Vec<Option<String>>]) -> Result<ResultSet> {
    if columns.is_empty() {
        return Ok(ResultSet::empty());
    }

    let fields: Vec<Field> = columns
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true))
        .collect();
    let arrays: Vec<ArrayRef> = (0..columns.len())
        .map(|i| {
            let mut builder = StringBuilder::new();
            for row in rows {
                builder.append_option(row.get(i).and_then(Option::as_deref));
            }
            Arc::new(builder.finish()) as ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
    Ok(ResultSet::from_batch(batch))
}

/// Replaces tables in Postgres: drop, create and fill in one transaction.
pub struct PgWriter {
    client: Client,
}

impl PgWriter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl TableWriter for PgWriter {
    fn replace_table(&mut self, table: &str, data: &RecordBatch) -> Result<usize> {
        let ident = table_ident(table)?;
        let create = create_table_sql(&ident, &data.schema(), pg_type)?;
        let insert = insert_sql(&ident, data.num_columns());

        let mut tx = self.client.transaction()?;
        tx.batch_execute(&format!("DROP TABLE IF EXISTS {ident}; {create};"))?;
        let stmt = tx.prepare(&insert)?;
        for row in 0..data.num_rows() {
            let values = row_params(data, row)?;
            let params: Vec<&(dyn ToSql + Sync)> = values.iter().map(|value| &**value as &(dyn ToSql + Sync)).collect();
            tx.execute(&stmt, &params)?;
        }
        tx.commit()?;

        let rows = data.num_rows();
        info!("Replaced table {table} with {rows} rows", table: table, rows: rows);
        Ok(rows)
    }
}

fn insert_sql(ident: &str, columns: usize) -> String {
    let placeholders: Vec<String> = (1..=columns).map(|i| format!("${i}")).collect();
    format!("INSERT INTO {ident} VALUES ({})", placeholders.join(", "))
}

fn pg_type(data_type: &DataType) -> Option<&'static str> {
    match data_type {
        DataType::Utf8 => Some("TEXT"),
        DataType::Float64 => Some("DOUBLE PRECISION"),
        DataType::Int64 => Some("BIGINT"),
        DataType::Int32 => Some("INTEGER"),
        DataType::Boolean => Some("BOOLEAN"),
        DataType::Date32 => Some("DATE"),
        _ => None,
    }
}

fn row_params(data: &RecordBatch, row: usize) -> Result<Vec<Param>> {
    let schema = data.schema();
    data.columns()
        .iter()
        .zip(schema.fields().iter())
        .map(|(column, field)| pg_value(column, row).ok_or_else(|| unsupported(field.name(), field.data_type())))
        .collect()
}

/// Typed parameter for one cell. Nulls keep the column's type.
fn pg_value(column: &ArrayRef, row: usize) -> Option<Param> {
    let present = !column.is_null(row);
    let value: Param = match column.data_type() {
        DataType::Utf8 => Box::new(present.then(|| column.as_string::<i32>().value(row).to_string())),
        DataType::Float64 => Box::new(present.then(|| column.as_primitive::<Float64Type>().value(row))),
        DataType::Int64 => Box::new(present.then(|| column.as_primitive::<Int64Type>().value(row))),
        DataType::Int32 => Box::new(present.then(|| column.as_primitive::<Int32Type>().value(row))),
        DataType::Boolean => Box::new(present.then(|| column.as_boolean().value(row))),
        DataType::Date32 => Box::new(
            present
                .then(|| column.as_primitive::<Date32Type>().value_as_date(row))
                .flatten(),
        ),
        _ => return None,
    };
    Some(value)
}
