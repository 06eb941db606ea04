// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::SecretError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A named set of credential fields, e.g. `currency_db_creds`.
///
/// Values never appear in `Debug` output.
#[derive(Clone, Default)]
pub struct SecretBundle {
    name: String,
    fields: BTreeMap<String, String>,
}

impl SecretBundle {
    pub fn new<S: Into<String>>(name: S, fields: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Look up a field that must be present.
    pub fn require(&self, field: &str) -> Result<&str, SecretError> {
        self.get(field).ok_or_else(|| SecretError::MissingField {
            bundle: self.name.clone(),
            field: field.to_string(),
        })
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl fmt::Debug for SecretBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for key in self.fields.keys() {
            map.entry(key, &"<redacted>");
        }
        map.finish()?;
        write!(f, " in bundle {:?}", self.name)
    }
}

/// Resolves named credential bundles from an external store.
pub trait SecretProvider {
    fn resolve(&self, name: &str) -> Result<SecretBundle, SecretError>;
}

/// Reads bundles from environment variables named `<BUNDLE>__<FIELD>`.
///
/// The bundle name is upper-cased with `-` mapped to `_`, so the bundle
/// `currency_db_creds` picks up `CURRENCY_DB_CREDS__PASSWORD` as field
/// `password`.
pub struct EnvSecretProvider {
    vars: Vec<(String, String)>,
}

impl EnvSecretProvider {
    /// Snapshot the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            vars: vars.into_iter().collect(),
        }
    }

    fn prefix(name: &str) -> String {
        format!("{}__", name.to_ascii_uppercase().replace('-', "_"))
    }
}

impl SecretProvider for EnvSecretProvider {
    fn resolve(&self, name: &str) -> Result<SecretBundle, SecretError> {
        let prefix = Self::prefix(name);
        let fields: BTreeMap<String, String> = self
            .vars
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix)
                    .filter(|field| !field.is_empty())
                    .map(|field| (field.to_ascii_lowercase(), value.clone()))
            })
            .collect();

        if fields.is_empty() {
            return Err(SecretError::NotFound(name.to_string()));
        }
        Ok(SecretBundle::new(name, fields))
    }
}

/// Reads bundles from a YAML file of the form
///
/// ```yaml
/// currency_db_creds:
///   username: loader
///   port: 5432
/// ```
///
/// The file is read on every call to `resolve`.
pub struct FileSecretProvider {
    path: PathBuf,
}

impl FileSecretProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn parse_error(&self, message: String) -> SecretError {
        SecretError::Parse {
            path: self.path.clone(),
            message,
        }
    }
}

impl SecretProvider for FileSecretProvider {
    fn resolve(&self, name: &str) -> Result<SecretBundle, SecretError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| SecretError::Io {
            path: self.path.clone(),
            source,
        })?;

        let mut bundles: BTreeMap<String, BTreeMap<String, serde_yaml_ng::Value>> =
            serde_yaml_ng::from_str(&content).map_err(|e| self.parse_error(e.to_string()))?;

        let raw = bundles
            .remove(name)
            .ok_or_else(|| SecretError::NotFound(name.to_string()))?;

        let mut fields = BTreeMap::new();
        for (field, value) in raw {
            let text = match value {
                serde_yaml_ng::Value::String(s) => s,
                serde_yaml_ng::Value::Number(n) => n.to_string(),
                serde_yaml_ng::Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(
                        self.parse_error(format!("field {field} of {name} must be a scalar"))
                    );
                }
            };
            fields.insert(field, text);
        }
        Ok(SecretBundle::new(name, fields))
    }
}
