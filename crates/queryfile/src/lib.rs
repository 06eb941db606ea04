// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Query file execution.
//!
//! A query file is split on `;` into statements that run in file order on
//! one [`warehouse::Session`]. DDL statements are committed as soon as they
//! succeed; everything else is left to the session's transaction mode. The
//! result of the last statement can be rendered and exported as CSV.
//!
//! Semicolons inside string literals or procedural bodies are not
//! recognized; such files must be split by hand.

use std::path::PathBuf;
use thiserror::Error;

mod executor;
pub mod output;
mod statement;

pub use executor::{DEFAULT_EXPORT_PATH, ExecuteOptions, ExecutionReport, RunOutcome, execute, execute_path, run_inline, run_statements};
pub use statement::{DDL_KEYWORDS, QueryFile, Statement, StatementKind};

/// Boxed error of the underlying session.
pub type SessionError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("Failed to read query file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Statement {} failed", .index + 1)]
    Statement {
        index: usize,
        #[source]
        source: SessionError,
    },

    #[error("Commit after statement {} failed", .index + 1)]
    Commit {
        index: usize,
        #[source]
        source: SessionError,
    },

    #[error("Failed to format results")]
    Format(#[from] arrow::error::ArrowError),

    #[error("Failed to write CSV export {path}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to console")]
    Console(#[from] std::io::Error),
}

impl ExecuteError {
    /// Index of the statement that failed, if the failure came from one.
    pub fn statement_index(&self) -> Option<usize> {
        match self {
            ExecuteError::Statement { index, .. } | ExecuteError::Commit { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// The error and all of its sources, one per line.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str("\n  caused by: ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}
