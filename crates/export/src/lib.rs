// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Scheduled export: run a query file compiled into the binary and upload
//! the last statement's result as `YYYY-MM-DD.csv`.

use thiserror::Error;

mod job;
mod sink;

pub use job::{EXPORT_QUERY, ExportJob, Response, object_key};
pub use sink::{DEFAULT_BUCKET, DEFAULT_REGION, LocalDirSink, ObjectSink, S3Sink};

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export query has no statements")]
    EmptyQuery,

    #[error("Invalid region {region}: {message}")]
    Region { region: String, message: String },

    #[error("Failed to upload {key}: {message}")]
    Upload { key: String, message: String },

    #[error("Failed to write {path}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
