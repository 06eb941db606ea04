// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::models::{SymbolsPayload, TimeseriesPayload};
use crate::transport::{Transport, without_query};
use crate::{FetchError, Result};
use chrono::NaiveDate;
use diagnostics::*;
use serde::de::DeserializeOwned;
use url::Url;
use warehouse::ApiCredentials;

pub const DEFAULT_BASE_URL: &str = "https://data.fixer.io/api";

/// fixer.io API client over a [`Transport`].
pub struct FixerClient<T: Transport> {
    transport: T,
    base_url: Url,
    credentials: ApiCredentials,
}

impl<T: Transport> FixerClient<T> {
    pub fn new(transport: T, base_url: &str, credentials: ApiCredentials) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| FetchError::Url(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::Url(format!("{base_url}: not a base URL")));
        }
        Ok(Self {
            transport,
            base_url,
            credentials,
        })
    }

    /// All supported currency symbols, or `None` when the API returned none.
    pub fn fetch_symbols(&self) -> Result<Option<SymbolsPayload>> {
        let url = self.endpoint("symbols", &[])?;
        let payload: Option<SymbolsPayload> = self.fetch_json(&url)?;
        Ok(payload.filter(|p| accepted(p.success, p.error.as_ref(), "symbols")))
    }

    /// Daily rates of `symbols` against `base` over an inclusive date range.
    pub fn fetch_timeseries(
        &self,
        base: &str,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<TimeseriesPayload>> {
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        let joined = symbols.join(",");
        let url = self.endpoint(
            "timeseries",
            &[
                ("base", base),
                ("symbols", &joined),
                ("start_date", &start),
                ("end_date", &end),
            ],
        )?;
        let payload: Option<TimeseriesPayload> = self.fetch_json(&url)?;
        Ok(payload.filter(|p| accepted(p.success, p.error.as_ref(), "timeseries")))
    }

    /// `{base_url}/{name}?access_key=...&params`
    fn endpoint(&self, name: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .push(name);
        url.query_pairs_mut()
            .append_pair("access_key", self.credentials.api_key())
            .extend_pairs(params.iter().copied());
        Ok(url)
    }

    /// Non-2xx responses are logged and treated as absent.
    fn fetch_json<P: DeserializeOwned>(&self, url: &Url) -> Result<Option<P>> {
        let shown = without_query(url);
        debug!("GET {shown}", shown: shown);

        let reply = self.transport.get(url)?;
        if !reply.is_success() {
            let status = reply.status;
            warn!("Error fetching data from {shown}: HTTP {status}", shown: shown, status: status);
            return Ok(None);
        }

        let payload = serde_json::from_str(&reply.body).map_err(|source| FetchError::Json { url: shown, source })?;
        Ok(Some(payload))
    }
}

fn accepted(success: bool, error: Option<&crate::ApiFailure>, what: &str) -> bool {
    if success {
        return true;
    }
    let reason = error.map(|e| e.describe()).unwrap_or_else(|| String::from("no details"));
    warn!("API rejected {what} request: {reason}", what: what, reason: reason);
    false
}
