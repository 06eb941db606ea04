// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::output;
use crate::{ExecuteError, QueryFile, Statement, error_chain};
use diagnostics::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use warehouse::{ResultSet, Session};

/// Default location of the CSV export.
pub const DEFAULT_EXPORT_PATH: &str = "output.csv";

#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Render every statement's result as a grid on the console.
    pub show_output: bool,
    /// Write the last statement's result to `export_path`.
    pub export_csv: bool,
    pub export_path: PathBuf,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            show_output: false,
            export_csv: false,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
        }
    }
}

/// What a successful run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub statements: usize,
    pub commits: usize,
    /// Columns of the last statement; empty when nothing ran.
    pub last_columns: Vec<String>,
    pub last_rows: usize,
    /// Set when a CSV export was written.
    pub exported: Option<PathBuf>,
}

/// Raw outcome of [`run_statements`].
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub executed: usize,
    pub commits: usize,
    /// Result of the last statement, the only one kept.
    pub last: Option<ResultSet>,
}

/// Execute every statement of `file` in order.
///
/// Each statement runs with its `;` restored. DDL is committed before the
/// next statement starts. `each` sees every result right after it is
/// fetched; results other than the last are dropped afterwards. The first
/// failure stops the run, leaving earlier commits in place.
pub fn run_statements<S, F>(session: &mut S, file: &QueryFile, mut each: F) -> Result<RunOutcome, ExecuteError>
where
    S: Session,
    F: FnMut(usize, &Statement, &ResultSet) -> Result<(), ExecuteError>,
{
    let total = file.len();
    let mut outcome = RunOutcome::default();

    for (index, statement) in file.statements().iter().enumerate() {
        let number = index + 1;
        debug!("Executing statement {number} of {total}", number: number, total: total);

        let result = session
            .execute(&statement.terminated())
            .map_err(|source| ExecuteError::Statement {
                index,
                source: Box::new(source),
            })?;
        outcome.executed += 1;

        if statement.kind().commits_immediately() {
            session.commit().map_err(|source| ExecuteError::Commit {
                index,
                source: Box::new(source),
            })?;
            outcome.commits += 1;
            debug!("Committed DDL statement {number}", number: number);
        }

        each(index, statement, &result)?;
        outcome.last = Some(result);
    }

    Ok(outcome)
}

/// Execute a query file, optionally rendering each result to `console`
/// and exporting the last one as CSV.
///
/// A file without statements succeeds without touching the session; if an
/// export was requested nothing is written and `exported` stays `None`.
pub fn execute<S, W>(
    session: &mut S,
    file: &QueryFile,
    options: &ExecuteOptions,
    console: &mut W,
) -> Result<ExecutionReport, ExecuteError>
where
    S: Session,
    W: Write,
{
    let outcome = run_statements(session, file, |_, _, result| {
        if options.show_output {
            output::write_grid(console, result)?;
        }
        Ok(())
    })
    .inspect_err(log_failure)?;

    let mut report = ExecutionReport {
        statements: outcome.executed,
        commits: outcome.commits,
        ..ExecutionReport::default()
    };

    match outcome.last {
        Some(last) => {
            report.last_columns = last.columns();
            report.last_rows = last.num_rows();

            if options.export_csv {
                output::write_csv_file(&options.export_path, &last).inspect_err(log_failure)?;
                let path = options.export_path.display().to_string();
                let rows = report.last_rows;
                info!("Exported {rows} rows to {path}", rows: rows, path: path);
                report.exported = Some(options.export_path.clone());
            }
        }
        None => {
            if options.export_csv {
                warn!("Query file has no statements, no CSV export written");
            }
        }
    }

    let statements = report.statements;
    info!("Query executed successfully ({statements} statements)", statements: statements);
    Ok(report)
}

/// Read `path` and [`execute`] it.
pub fn execute_path<S, W>(
    session: &mut S,
    path: &Path,
    options: &ExecuteOptions,
    console: &mut W,
) -> Result<ExecutionReport, ExecuteError>
where
    S: Session,
    W: Write,
{
    let file = QueryFile::read(path).inspect_err(log_failure)?;
    let count = file.len();
    let name = path.display().to_string();
    info!("Running {count} statements from {name}", count: count, name: name);
    execute(session, &file, options, console)
}

/// Execute `sql` as one statement, write each row to `console` on its own
/// line, then commit. Returns the number of rows.
pub fn run_inline<S, W>(session: &mut S, sql: &str, console: &mut W) -> Result<usize, ExecuteError>
where
    S: Session,
    W: Write,
{
    inline(session, sql, console).inspect_err(log_failure)
}

fn inline<S: Session, W: Write>(session: &mut S, sql: &str, console: &mut W) -> Result<usize, ExecuteError> {
    let result = session.execute(sql).map_err(|source| ExecuteError::Statement {
        index: 0,
        source: Box::new(source),
    })?;
    for line in output::format_rows(&result)? {
        writeln!(console, "{line}")?;
    }
    session.commit().map_err(|source| ExecuteError::Commit {
        index: 0,
        source: Box::new(source),
    })?;
    Ok(result.num_rows())
}

fn log_failure(err: &ExecuteError) {
    let chain = error_chain(err);
    error!("Error executing query: {chain}", chain: chain);
}
