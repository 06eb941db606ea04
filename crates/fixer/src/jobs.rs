// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::client::FixerClient;
use crate::records::{RateRecord, SymbolRecord, to_dataset};
use crate::transport::Transport;
use crate::{Dataset, FetchError, Result};
use chrono::NaiveDate;
use diagnostics::*;
use warehouse::TableWriter;

/// A source of one dataset.
pub trait Job {
    fn name(&self) -> &str;

    /// `Ok(None)` when the source had nothing to load.
    fn fetch(&self) -> Result<Option<Dataset>>;
}

/// Fetch `job` and replace `table` with the result. Nothing is written when
/// the job has no data. Returns the number of rows written.
pub fn run_job(job: &dyn Job, writer: &mut dyn TableWriter, table: &str) -> Result<Option<usize>> {
    let name = job.name();
    info!("Running {name} ingestion into {table}", name: name, table: table);

    match job.fetch()? {
        Some(dataset) => {
            let rows = writer.replace_table(table, &dataset)?;
            info!("Data saved to table {table}", table: table);
            Ok(Some(rows))
        }
        None => {
            info!("No data to save.");
            Ok(None)
        }
    }
}

/// Currency code and name of every supported currency.
pub struct SymbolsJob<'a, T: Transport> {
    client: &'a FixerClient<T>,
}

impl<'a, T: Transport> SymbolsJob<'a, T> {
    pub fn new(client: &'a FixerClient<T>) -> Self {
        Self { client }
    }
}

impl<T: Transport> Job for SymbolsJob<'_, T> {
    fn name(&self) -> &str {
        "symbols"
    }

    fn fetch(&self) -> Result<Option<Dataset>> {
        let Some(payload) = self.client.fetch_symbols()? else {
            return Ok(None);
        };
        if payload.symbols.is_empty() {
            warn!("No symbols found.");
            return Ok(None);
        }

        let records: Vec<SymbolRecord> = payload
            .symbols
            .into_iter()
            .map(|(currency_symbol, currency_name)| SymbolRecord {
                currency_symbol,
                currency_name,
            })
            .collect();
        Ok(Some(to_dataset(&records)?))
    }
}

/// Daily rates for a set of currencies over an inclusive date range.
pub struct TimeseriesJob<'a, T: Transport> {
    client: &'a FixerClient<T>,
    base: String,
    symbols: Vec<String>,
    start: NaiveDate,
    end: NaiveDate,
}

impl<'a, T: Transport> TimeseriesJob<'a, T> {
    pub fn new<S: Into<String>>(
        client: &'a FixerClient<T>,
        base: S,
        symbols: Vec<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self> {
        if start > end {
            return Err(FetchError::DateRange { start, end });
        }
        Ok(Self {
            client,
            base: base.into(),
            symbols,
            start,
            end,
        })
    }
}

impl<T: Transport> Job for TimeseriesJob<'_, T> {
    fn name(&self) -> &str {
        "timeseries"
    }

    fn fetch(&self) -> Result<Option<Dataset>> {
        let Some(payload) = self
            .client
            .fetch_timeseries(&self.base, &self.symbols, self.start, self.end)?
        else {
            return Ok(None);
        };

        let base = payload.base.unwrap_or_else(|| self.base.clone());
        let records: Vec<RateRecord> = payload
            .rates
            .into_iter()
            .flat_map(|(rate_date, currencies)| {
                let base = base.clone();
                currencies
                    .into_iter()
                    .map(move |(currency_symbol, exchange_rate)| RateRecord {
                        rate_date,
                        base_currecy_symbol: base.clone(),
                        currency_symbol,
                        exchange_rate,
                    })
            })
            .collect();

        if records.is_empty() {
            warn!("No data found for the given date range.");
            return Ok(None);
        }
        Ok(Some(to_dataset(&records)?))
    }
}
