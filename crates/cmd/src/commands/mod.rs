// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod ingest;
pub mod query;
pub mod snapshot;

pub use ingest::{ingest_api_command, ingest_csv_command, ingest_symbols_command};
pub use query::{run_query_command, run_query_from_file_command};
pub use snapshot::export_snapshot_command;

use crate::config::Config;
use anyhow::{Context, Result};
use warehouse::{Connector, SecretProvider};

/// Build the warehouse connector from the configured credential bundle.
pub fn connector(config: &Config, secrets: &dyn SecretProvider) -> Result<Connector> {
    let name = &config.database.secret;
    let bundle = secrets
        .resolve(name)
        .with_context(|| format!("Failed to resolve database credentials '{name}'"))?;
    Connector::from_bundle(config.database.backend, &bundle, config.database.transactions)
        .with_context(|| format!("Invalid database credentials in '{name}'"))
}
