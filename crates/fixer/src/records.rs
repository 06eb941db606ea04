// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::{Dataset, Result};
use arrow::datatypes::{DataType, Field, FieldRef};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Arrow columns of a record type, in table order.
pub trait ForArrow {
    fn for_arrow() -> Vec<FieldRef>;
}

/// Row of the currency metadata table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymbolRecord {
    pub currency_symbol: String,
    pub currency_name: String,
}

impl ForArrow for SymbolRecord {
    fn for_arrow() -> Vec<FieldRef> {
        vec![
            Arc::new(Field::new("currency_symbol", DataType::Utf8, false)),
            Arc::new(Field::new("currency_name", DataType::Utf8, false)),
        ]
    }
}

/// Row of the exchange rate table as loaded from the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateRecord {
    pub rate_date: NaiveDate,
    /// Column name matches tables loaded by earlier versions.
    pub base_currecy_symbol: String,
    pub currency_symbol: String,
    pub exchange_rate: f64,
}

impl ForArrow for RateRecord {
    fn for_arrow() -> Vec<FieldRef> {
        vec![
            Arc::new(Field::new("rate_date", DataType::Date32, false)),
            Arc::new(Field::new("base_currecy_symbol", DataType::Utf8, false)),
            Arc::new(Field::new("currency_symbol", DataType::Utf8, false)),
            Arc::new(Field::new("exchange_rate", DataType::Float64, false)),
        ]
    }
}

/// Row of the exchange rate table as loaded from a CSV file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportedRate {
    pub currency_symbol: String,
    pub base_currency_symbol: String,
    pub rate_date: NaiveDate,
    pub exchange_rate: f64,
}

impl ForArrow for ImportedRate {
    fn for_arrow() -> Vec<FieldRef> {
        vec![
            Arc::new(Field::new("currency_symbol", DataType::Utf8, false)),
            Arc::new(Field::new("base_currency_symbol", DataType::Utf8, false)),
            Arc::new(Field::new("rate_date", DataType::Date32, false)),
            Arc::new(Field::new("exchange_rate", DataType::Float64, false)),
        ]
    }
}

pub fn to_dataset<T: ForArrow + Serialize>(records: &[T]) -> Result<Dataset> {
    Ok(serde_arrow::to_record_batch(&T::for_arrow(), &records)?)
}
