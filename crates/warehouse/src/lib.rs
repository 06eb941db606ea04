// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Warehouse - connections to the rate database
//!
//! Credentials are resolved from a named secret bundle at call time and
//! turned into a [`Connector`]. A connector hands out one of two connection
//! flavors: a [`WarehouseSession`] for executing statements one at a time,
//! or a [`BulkWriter`] for replacing a whole table with an Arrow batch.
//! Postgres is reached with the native client over TLS; a local DuckDB
//! file serves development and tests. Nothing is cached between
//! invocations.

use std::path::PathBuf;
use thiserror::Error;

mod bulk;
mod connector;
mod credentials;
mod pg;
mod result;
mod secrets;
mod session;

pub use bulk::{BulkWriter, DuckWriter, TableWriter};
pub use connector::{Backend, Connector, Target, TransactionMode};
pub use credentials::{ApiCredentials, DatabaseCredentials};
pub use pg::{PgSession, PgWriter};
pub use result::ResultSet;
pub use secrets::{EnvSecretProvider, FileSecretProvider, SecretBundle, SecretProvider};
pub use session::{DuckSession, Session, WarehouseSession};

pub type Result<T> = std::result::Result<T, WarehouseError>;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Secret bundle not found: {0}")]
    NotFound(String),

    #[error("Secret bundle {bundle} has no field {field}")]
    MissingField { bundle: String, field: String },

    #[error("Failed to read secrets file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse secrets file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error(transparent)]
    DuckDb(#[from] duckdb::Error),

    #[error(transparent)]
    Postgres(#[from] postgres::Error),

    #[error("Failed to set up TLS")]
    Tls(#[from] native_tls::Error),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error("Invalid credentials: {0}")]
    Credentials(String),

    #[error("Failed to connect to database {dbname} on {host}")]
    Connect {
        host: String,
        dbname: String,
        #[source]
        source: postgres::Error,
    },

    #[error("Invalid table name: {0:?}")]
    InvalidTableName(String),

    #[error("Column {column} has unsupported type {data_type}")]
    UnsupportedType { column: String, data_type: String },
}
