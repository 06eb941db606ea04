// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Ingestion jobs for foreign-exchange data.
//!
//! A [`Job`] produces an optional [`Dataset`]; [`run_job`] replaces the
//! destination table with it, or skips the write when the job found
//! nothing. Upstream answers that carry no data (error statuses, in-band
//! API errors, empty payloads) are "no data", not errors. Transport and
//! parse failures are errors.

use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

mod client;
mod csv_import;
mod jobs;
mod models;
mod records;
mod transport;

pub use client::{DEFAULT_BASE_URL, FixerClient};
pub use csv_import::CsvImportJob;
pub use jobs::{Job, SymbolsJob, TimeseriesJob, run_job};
pub use models::{ApiFailure, SymbolsPayload, TimeseriesPayload};
pub use records::{ForArrow, ImportedRate, RateRecord, SymbolRecord, to_dataset};
pub use transport::{HttpReply, ReqwestTransport, Transport};

/// Tabular data produced by a job.
pub type Dataset = RecordBatch;

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed")]
    Transport {
        /// Endpoint without its query string.
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid API URL: {0}")]
    Url(String),

    #[error("Malformed response from {url}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Start date {start} is after end date {end}")]
    DateRange { start: NaiveDate, end: NaiveDate },

    #[error("Failed to read CSV {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("CSV {path} has no {column} column")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("CSV {path} line {line}: {message}")]
    InvalidRecord {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("Failed to build dataset")]
    Arrow(#[from] serde_arrow::Error),

    #[error(transparent)]
    Warehouse(#[from] warehouse::WarehouseError),
}
