// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::jobs::Job;
use crate::records::{ImportedRate, to_dataset};
use crate::{Dataset, FetchError, Result};
use chrono::NaiveDate;
use diagnostics::*;
use std::path::{Path, PathBuf};

/// Output column and the header names accepted for it.
const COLUMNS: [(&str, &[&str]); 4] = [
    ("currency_symbol", &["currency", "currency_symbol"]),
    ("base_currency_symbol", &["base_currency", "base_currency_symbol"]),
    ("rate_date", &["date", "rate_date"]),
    ("exchange_rate", &["exchange_rate"]),
];

/// Exchange rates from a local CSV file. Extra columns are ignored.
pub struct CsvImportJob {
    path: PathBuf,
}

impl CsvImportJob {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn csv_error(&self, source: csv::Error) -> FetchError {
        FetchError::Csv {
            path: self.path.clone(),
            source,
        }
    }

    fn invalid(&self, line: u64, message: String) -> FetchError {
        FetchError::InvalidRecord {
            path: self.path.clone(),
            line,
            message,
        }
    }

    /// Position of each output column among `headers`.
    fn locate(&self, headers: &csv::StringRecord) -> Result<[usize; 4]> {
        let mut positions = [0; 4];
        for (slot, (column, aliases)) in positions.iter_mut().zip(COLUMNS) {
            *slot = headers
                .iter()
                .position(|header| aliases.contains(&header.trim()))
                .ok_or_else(|| FetchError::MissingColumn {
                    path: self.path.clone(),
                    column,
                })?;
        }
        Ok(positions)
    }

    fn read(&self) -> Result<Vec<ImportedRate>> {
        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| self.csv_error(e))?;
        let headers = reader.headers().map_err(|e| self.csv_error(e))?.clone();
        if headers.is_empty() {
            return Ok(Vec::new());
        }
        let [symbol, base, date, rate] = self.locate(&headers)?;

        let mut rates = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| self.csv_error(e))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let field = |index: usize| record.get(index).unwrap_or_default().trim();

            let rate_date = NaiveDate::parse_from_str(field(date), "%Y-%m-%d")
                .map_err(|e| self.invalid(line, format!("date {:?}: {e}", field(date))))?;
            let exchange_rate = field(rate)
                .parse::<f64>()
                .map_err(|e| self.invalid(line, format!("exchange rate {:?}: {e}", field(rate))))?;

            rates.push(ImportedRate {
                currency_symbol: field(symbol).to_string(),
                base_currency_symbol: field(base).to_string(),
                rate_date,
                exchange_rate,
            });
        }
        Ok(rates)
    }
}

impl Job for CsvImportJob {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self) -> Result<Option<Dataset>> {
        let rates = self.read()?;
        if rates.is_empty() {
            let path = self.path.display().to_string();
            warn!("No rows found in {path}", path: path);
            return Ok(None);
        }
        Ok(Some(to_dataset(&rates)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::AsArray;
    use std::io::Write;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn names(dataset: &Dataset) -> Vec<String> {
        dataset.schema().fields().iter().map(|f| f.name().clone()).collect()
    }

    #[test]
    fn test_renames_and_selects_columns() {
        let file = csv_file(
            "date,currency,base_currency,exchange_rate,source\n\
             2022-01-03,EUR,USD,0.88,ecb\n\
             2022-01-03,GBP,USD,0.74,ecb\n",
        );

        let dataset = CsvImportJob::new(file.path()).fetch().unwrap().unwrap();
        assert_eq!(
            names(&dataset),
            vec!["currency_symbol", "base_currency_symbol", "rate_date", "exchange_rate"]
        );
        assert_eq!(dataset.num_rows(), 2);
        assert_eq!(dataset.column(1).as_string::<i32>().value(0), "USD");
    }

    #[test]
    fn test_accepts_renamed_headers() {
        let file = csv_file("currency_symbol,base_currency_symbol,rate_date,exchange_rate\nJPY,USD,2022-02-01,115.1\n");
        let dataset = CsvImportJob::new(file.path()).fetch().unwrap().unwrap();
        assert_eq!(dataset.num_rows(), 1);
    }

    #[test]
    fn test_empty_file_has_no_data() {
        assert!(CsvImportJob::new(csv_file("").path()).fetch().unwrap().is_none());
        let header_only = csv_file("currency,base_currency,date,exchange_rate\n");
        assert!(CsvImportJob::new(header_only.path()).fetch().unwrap().is_none());
    }

    #[test]
    fn test_missing_column() {
        let file = csv_file("currency,date,exchange_rate\nEUR,2022-01-03,0.88\n");
        let err = CsvImportJob::new(file.path()).fetch().unwrap_err();
        assert!(matches!(
            err,
            FetchError::MissingColumn {
                column: "base_currency_symbol",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_rate_reports_line() {
        let file = csv_file("currency,base_currency,date,exchange_rate\nEUR,USD,2022-01-03,0.88\nGBP,USD,2022-01-03,n/a\n");
        let err = CsvImportJob::new(file.path()).fetch().unwrap_err();
        assert!(matches!(err, FetchError::InvalidRecord { line: 3, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = CsvImportJob::new("/nonexistent/rates.csv").fetch().unwrap_err();
        assert!(matches!(err, FetchError::Csv { .. }));
    }
}
