// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::config::Config;
use anyhow::{Context, Result};
use diagnostics::*;
use queryfile::{ExecuteOptions, execute_path, run_inline};
use std::path::{Path, PathBuf};
use warehouse::SecretProvider;

/// Execute one statement and print each row.
pub fn run_query_command(config: &Config, secrets: &dyn SecretProvider, query: &str) -> Result<()> {
    let mut session = super::connector(config, secrets)?
        .session()
        .with_context(|| "Failed to connect to the database")?;

    let stdout = std::io::stdout();
    let rows = run_inline(&mut session, query, &mut stdout.lock()).with_context(|| "Error executing query")?;
    debug!("Printed {rows} rows", rows: rows);
    Ok(())
}

/// Execute a query file statement by statement.
pub fn run_query_from_file_command(
    config: &Config,
    secrets: &dyn SecretProvider,
    file: &Path,
    show_output: bool,
    export_csv: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let options = ExecuteOptions {
        show_output,
        export_csv,
        export_path: output.unwrap_or_else(|| config.export.csv_path.clone()),
    };

    let mut session = super::connector(config, secrets)?
        .session()
        .with_context(|| "Failed to connect to the database")?;

    let stdout = std::io::stdout();
    let report = execute_path(&mut session, file, &options, &mut stdout.lock())
        .with_context(|| format!("Error executing query from file: {}", file.display()))?;

    if let Some(path) = &report.exported {
        let path = path.display().to_string();
        let rows = report.last_rows;
        info!("CSV export of {rows} rows written to {path}", rows: rows, path: path);
    }
    Ok(())
}
