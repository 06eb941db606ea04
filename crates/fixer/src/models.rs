// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;

fn succeeded() -> bool {
    true
}

/// In-band error reported by the API with a 200 status.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiFailure {
    #[serde(default)]
    pub code: i64,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
}

impl ApiFailure {
    pub fn describe(&self) -> String {
        let kind = self.kind.as_deref().unwrap_or("unknown");
        match &self.info {
            Some(info) => format!("{} {kind}: {info}", self.code),
            None => format!("{} {kind}", self.code),
        }
    }
}

/// `GET /symbols`
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolsPayload {
    #[serde(default = "succeeded")]
    pub success: bool,
    #[serde(default)]
    pub error: Option<ApiFailure>,
    /// Currency code to display name.
    #[serde(default)]
    pub symbols: BTreeMap<String, String>,
}

/// `GET /timeseries`
#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesPayload {
    #[serde(default = "succeeded")]
    pub success: bool,
    #[serde(default)]
    pub error: Option<ApiFailure>,
    #[serde(default)]
    pub base: Option<String>,
    /// Date to (currency code to rate).
    #[serde(default)]
    pub rates: BTreeMap<NaiveDate, BTreeMap<String, f64>>,
}
