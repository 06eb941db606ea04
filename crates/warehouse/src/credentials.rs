// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::{Result, SecretBundle, WarehouseError};
use std::fmt;

/// Fields of a database bundle: {username, password, host, port, dbname}.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub dbname: String,
}

impl DatabaseCredentials {
    pub fn from_bundle(bundle: &SecretBundle) -> Result<Self> {
        let port_text = bundle.require("port")?;
        let port = port_text.trim().parse::<u16>().map_err(|_| {
            WarehouseError::Credentials(format!(
                "port of bundle {} is not a valid port number",
                bundle.name()
            ))
        })?;

        Ok(Self {
            username: bundle.require("username")?.to_string(),
            password: bundle.require("password")?.to_string(),
            host: bundle.require("host")?.to_string(),
            port,
            dbname: bundle.require("dbname")?.to_string(),
        })
    }
}

impl fmt::Debug for DatabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .finish()
    }
}

/// Key for the upstream rate provider.
#[derive(Clone)]
pub struct ApiCredentials {
    api_key: String,
}

impl ApiCredentials {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Reads `api_key`, or the older `fixer_api_key` field name.
    pub fn from_bundle(bundle: &SecretBundle) -> Result<Self> {
        let key = match bundle.get("api_key") {
            Some(key) => key,
            None => bundle.require("fixer_api_key").map_err(|_| {
                WarehouseError::Credentials(format!(
                    "bundle {} has neither api_key nor fixer_api_key",
                    bundle.name()
                ))
            })?,
        };
        if key.trim().is_empty() {
            return Err(WarehouseError::Credentials(format!(
                "api key in bundle {} is empty",
                bundle.name()
            )));
        }
        Ok(Self::new(key))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
