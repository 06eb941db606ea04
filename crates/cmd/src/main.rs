// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod config;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "fxload")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "FXLOAD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one SQL statement and print each row
    RunQuery {
        /// SQL text
        query: String,
    },
    /// Execute a file of semicolon-separated SQL statements
    RunQueryFromFile {
        /// Query file
        file: PathBuf,
        /// Print every statement's result as a table
        #[arg(long)]
        show_output: bool,
        /// Write the last statement's result as CSV
        #[arg(long)]
        export_csv: bool,
        /// CSV export path (defaults to export.csv_path)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Load the list of currency symbols
    #[command(name = "ingest_symbols")]
    IngestSymbols {
        #[arg(long = "table_name", default_value = "currency_metadata")]
        table_name: String,
    },
    /// Load daily exchange rates for a date range
    #[command(name = "ingest_api")]
    IngestApi {
        /// Comma-separated currency symbols (defaults to api.symbols)
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,
        #[arg(long, default_value = "2022-01-01")]
        start_date: NaiveDate,
        #[arg(long, default_value = "2022-03-01")]
        end_date: NaiveDate,
        #[arg(long, default_value = "exchange_rates")]
        table_name: String,
    },
    /// Load exchange rates from a CSV file
    #[command(name = "ingest_csv")]
    IngestCsv {
        file_path: PathBuf,
        #[arg(long, default_value = "exchange_rates")]
        table_name: String,
    },
    /// Run the built-in export query and upload the result
    ExportSnapshot {
        /// Date used for the object key (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Write to this directory instead of the bucket
        #[arg(long)]
        local_dir: Option<PathBuf>,
    },
}

fn run(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref())?;
    diagnostics::init(config.log.unwrap_or_default());
    let secrets = config.secret_provider();
    let secrets = secrets.as_ref();

    match cli.command {
        Commands::RunQuery { query } => commands::run_query_command(&config, secrets, &query),
        Commands::RunQueryFromFile {
            file,
            show_output,
            export_csv,
            output,
        } => commands::run_query_from_file_command(&config, secrets, &file, show_output, export_csv, output),
        Commands::IngestSymbols { table_name } => commands::ingest_symbols_command(&config, secrets, &table_name),
        Commands::IngestApi {
            symbols,
            start_date,
            end_date,
            table_name,
        } => commands::ingest_api_command(&config, secrets, symbols, start_date, end_date, &table_name),
        Commands::IngestCsv { file_path, table_name } => {
            commands::ingest_csv_command(&config, secrets, &file_path, &table_name)
        }
        Commands::ExportSnapshot { date, local_dir } => {
            commands::export_snapshot_command(&config, secrets, date, local_dir)
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Commands {
        Cli::try_parse_from(args).unwrap().command
    }

    #[test]
    fn test_ingest_api_defaults() {
        match parse(&["fxload", "ingest_api"]) {
            Commands::IngestApi {
                symbols,
                start_date,
                end_date,
                table_name,
            } => {
                assert!(symbols.is_empty());
                assert_eq!(start_date, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
                assert_eq!(end_date, NaiveDate::from_ymd_opt(2022, 3, 1).unwrap());
                assert_eq!(table_name, "exchange_rates");
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_ingest_api_symbols_list() {
        match parse(&["fxload", "ingest_api", "--symbols", "CAD,CHF", "--start-date", "2023-05-01"]) {
            Commands::IngestApi { symbols, start_date, .. } => {
                assert_eq!(symbols, vec!["CAD", "CHF"]);
                assert_eq!(start_date, NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_ingest_symbols_table_flag() {
        match parse(&["fxload", "ingest_symbols", "--table_name", "symbols"]) {
            Commands::IngestSymbols { table_name } => assert_eq!(table_name, "symbols"),
            _ => panic!("wrong command"),
        }
        match parse(&["fxload", "ingest_symbols"]) {
            Commands::IngestSymbols { table_name } => assert_eq!(table_name, "currency_metadata"),
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_run_query_from_file_flags() {
        match parse(&["fxload", "run-query-from-file", "q.sql", "--show-output", "--export-csv"]) {
            Commands::RunQueryFromFile {
                file,
                show_output,
                export_csv,
                output,
            } => {
                assert_eq!(file, PathBuf::from("q.sql"));
                assert!(show_output);
                assert!(export_csv);
                assert_eq!(output, None);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_ingest_csv_positional() {
        match parse(&["fxload", "--config", "fx.yaml", "ingest_csv", "rates.csv"]) {
            Commands::IngestCsv { file_path, table_name } => {
                assert_eq!(file_path, PathBuf::from("rates.csv"));
                assert_eq!(table_name, "exchange_rates");
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_bad_date_rejected() {
        assert!(Cli::try_parse_from(["fxload", "ingest_api", "--end-date", "March"]).is_err());
    }
}
