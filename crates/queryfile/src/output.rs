// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Console rendering and CSV encoding of result sets.

use crate::ExecuteError;
use arrow::error::ArrowError;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use arrow::util::pretty::pretty_format_batches;
use arrow_csv::WriterBuilder;
use std::io::Write;
use std::path::Path;
use warehouse::ResultSet;

/// Bordered grid with the column names as headers. Empty for statements
/// without result columns.
pub fn format_grid(result: &ResultSet) -> Result<String, ArrowError> {
    if !result.is_tabular() {
        return Ok(String::new());
    }
    Ok(pretty_format_batches(&result.batches_with_header())?.to_string())
}

pub fn write_grid<W: Write>(out: &mut W, result: &ResultSet) -> Result<(), ExecuteError> {
    let grid = format_grid(result)?;
    if !grid.is_empty() {
        writeln!(out, "{grid}")?;
    }
    Ok(())
}

/// One line per row, e.g. `(1, x)`.
pub fn format_rows(result: &ResultSet) -> Result<Vec<String>, ArrowError> {
    let options = FormatOptions::default().with_null("NULL");
    let mut lines = Vec::with_capacity(result.num_rows());

    for batch in result.batches() {
        let formatters = batch
            .columns()
            .iter()
            .map(|column| ArrayFormatter::try_new(column.as_ref(), &options))
            .collect::<Result<Vec<_>, ArrowError>>()?;

        for row in 0..batch.num_rows() {
            let cells: Vec<String> = formatters
                .iter()
                .map(|formatter| formatter.value(row).to_string())
                .collect();
            lines.push(format!("({})", cells.join(", ")));
        }
    }
    Ok(lines)
}

/// Header row of column names followed by every row, comma separated.
/// Statements without result columns produce no output.
pub fn write_csv<W: Write>(writer: W, result: &ResultSet) -> Result<(), ArrowError> {
    if !result.is_tabular() {
        return Ok(());
    }
    let mut csv = WriterBuilder::new().with_header(true).build(writer);
    for batch in result.batches_with_header() {
        csv.write(&batch)?;
    }
    Ok(())
}

pub fn csv_bytes(result: &ResultSet) -> Result<Vec<u8>, ArrowError> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, result)?;
    Ok(buffer)
}

/// Write the CSV export to `path`, replacing any existing file. File system
/// failures are reported as `Export`.
pub fn write_csv_file(path: &Path, result: &ResultSet) -> Result<(), ExecuteError> {
    let bytes = csv_bytes(result)?;
    std::fs::write(path, bytes).map_err(|source| ExecuteError::Export {
        path: path.to_path_buf(),
        source,
    })
}
