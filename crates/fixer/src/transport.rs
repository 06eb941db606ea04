// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::{FetchError, Result};
use std::time::Duration;
use url::Url;

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new<S: Into<String>>(status: u16, body: S) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP GET.
///
/// Any response that arrives, whatever its status, is an `Ok`. Only
/// failures to get a response at all (DNS, TLS, connection, timeout) are
/// errors.
pub trait Transport {
    fn get(&self, url: &Url) -> Result<HttpReply>;
}

pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Transport {
                url: String::from("(client setup)"),
                source: Box::new(source.without_url()),
            })?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &Url) -> Result<HttpReply> {
        let failed = |source: reqwest::Error| FetchError::Transport {
            url: without_query(url),
            source: Box::new(source.without_url()),
        };

        let response = self.client.get(url.clone()).send().map_err(failed)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(failed)?;
        Ok(HttpReply { status, body })
    }
}

/// The URL with its query string removed; query strings carry the access
/// key and must never reach the logs.
pub(crate) fn without_query(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}
