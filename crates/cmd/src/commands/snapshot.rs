// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::config::Config;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use export::{ExportJob, LocalDirSink, ObjectSink, S3Sink};
use std::io::Write;
use std::path::PathBuf;
use warehouse::SecretProvider;

/// Run the embedded export query and upload the result. The handler
/// response is printed as JSON; a non-200 response is a failure.
pub fn export_snapshot_command(
    config: &Config,
    secrets: &dyn SecretProvider,
    date: Option<NaiveDate>,
    local_dir: Option<PathBuf>,
) -> Result<()> {
    let job = ExportJob::embedded().with_context(|| "Invalid embedded export query")?;
    let sink: Box<dyn ObjectSink> = match local_dir {
        Some(dir) => Box::new(LocalDirSink::new(dir)),
        None => Box::new(
            S3Sink::new(&config.export.bucket, &config.export.region).with_context(|| "Invalid export destination")?,
        ),
    };

    let mut session = super::connector(config, secrets)?
        .session()
        .with_context(|| "Failed to connect to the database")?;

    let today = date.unwrap_or_else(|| Local::now().date_naive());
    let response = job.run(&mut session, sink.as_ref(), today);

    let json = serde_json::to_string(&response)?;
    writeln!(std::io::stdout(), "{json}")?;

    if !response.is_success() {
        anyhow::bail!("Export failed: {}", response.body);
    }
    Ok(())
}
