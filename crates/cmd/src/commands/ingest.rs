// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::config::Config;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use fixer::{CsvImportJob, FixerClient, Job, ReqwestTransport, SymbolsJob, TimeseriesJob, run_job};
use std::path::Path;
use std::time::Duration;
use warehouse::{ApiCredentials, SecretProvider};

fn fixer_client(config: &Config, secrets: &dyn SecretProvider) -> Result<FixerClient<ReqwestTransport>> {
    let name = &config.api.secret;
    let bundle = secrets
        .resolve(name)
        .with_context(|| format!("Failed to resolve API credentials '{name}'"))?;
    let credentials =
        ApiCredentials::from_bundle(&bundle).with_context(|| format!("Invalid API credentials in '{name}'"))?;

    let transport = ReqwestTransport::new(Duration::from_secs(config.api.timeout_seconds))
        .with_context(|| "Failed to create HTTP client")?;
    FixerClient::new(transport, &config.api.base_url, credentials).with_context(|| "Failed to create API client")
}

fn load(config: &Config, secrets: &dyn SecretProvider, job: &dyn Job, table: &str) -> Result<()> {
    let mut writer = super::connector(config, secrets)?
        .bulk_writer()
        .with_context(|| "Failed to connect to the database")?;
    run_job(job, &mut writer, table).with_context(|| format!("Failed to load {} data into {table}", job.name()))?;
    Ok(())
}

pub fn ingest_symbols_command(config: &Config, secrets: &dyn SecretProvider, table_name: &str) -> Result<()> {
    let client = fixer_client(config, secrets)?;
    load(config, secrets, &SymbolsJob::new(&client), table_name)
}

/// An empty `symbols` list means the configured default symbols.
pub fn ingest_api_command(
    config: &Config,
    secrets: &dyn SecretProvider,
    symbols: Vec<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    table_name: &str,
) -> Result<()> {
    let symbols = if symbols.is_empty() {
        config.api.symbols.clone()
    } else {
        symbols
    };

    let client = fixer_client(config, secrets)?;
    let job = TimeseriesJob::new(&client, config.api.base_currency.as_str(), symbols, start_date, end_date)?;
    load(config, secrets, &job, table_name)
}

pub fn ingest_csv_command(config: &Config, secrets: &dyn SecretProvider, file_path: &Path, table_name: &str) -> Result<()> {
    load(config, secrets, &CsvImportJob::new(file_path), table_name)
}
