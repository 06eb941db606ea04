// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use diagnostics::LogLevel;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use warehouse::{Backend, EnvSecretProvider, FileSecretProvider, SecretProvider, TransactionMode};

/// Contents of the fxload YAML configuration file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Used when FXLOAD_LOG is unset.
    pub log: Option<LogLevel>,
    pub secrets: SecretsConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub export: ExportConfig,
}

/// Where named credential bundles are resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum SecretsConfig {
    /// `<BUNDLE>__<FIELD>` environment variables.
    #[default]
    Env,
    /// YAML file mapping bundle names to fields.
    File { path: PathBuf },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub secret: String,
    pub backend: Backend,
    pub transactions: TransactionMode,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            secret: String::from("currency_db_creds"),
            backend: Backend::default(),
            transactions: TransactionMode::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub secret: String,
    pub base_url: String,
    pub base_currency: String,
    /// Used by `ingest_api` when `--symbols` is not given.
    pub symbols: Vec<String>,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            secret: String::from("fixer_api_creds"),
            base_url: String::from(fixer::DEFAULT_BASE_URL),
            base_currency: String::from("USD"),
            symbols: vec![String::from("EUR"), String::from("GBP"), String::from("JPY")],
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Default target of `run-query-from-file --export-csv`.
    pub csv_path: PathBuf,
    pub bucket: String,
    pub region: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(queryfile::DEFAULT_EXPORT_PATH),
            bucket: String::from(export::DEFAULT_BUCKET),
            region: String::from(export::DEFAULT_REGION),
        }
    }
}

impl Config {
    pub fn secret_provider(&self) -> Box<dyn SecretProvider> {
        match &self.secrets {
            SecretsConfig::Env => Box::new(EnvSecretProvider::from_env()),
            SecretsConfig::File { path } => Box::new(FileSecretProvider::new(path)),
        }
    }
}

/// Load configuration from a YAML file, or the defaults when no file is
/// given.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml_ng::from_str(&content).with_context(|| "Failed to parse YAML configuration")?
        }
        None => Config::default(),
    };

    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<()> {
    if config.database.secret.trim().is_empty() {
        anyhow::bail!("database.secret cannot be empty");
    }
    if config.api.secret.trim().is_empty() {
        anyhow::bail!("api.secret cannot be empty");
    }
    if config.api.base_url.trim().is_empty() {
        anyhow::bail!("api.base_url cannot be empty");
    }
    if config.api.base_currency.trim().is_empty() {
        anyhow::bail!("api.base_currency cannot be empty");
    }
    if config.api.timeout_seconds == 0 {
        anyhow::bail!("api.timeout_seconds must be greater than 0");
    }
    if config.export.bucket.trim().is_empty() {
        anyhow::bail!("export.bucket cannot be empty");
    }
    if config.export.region.trim().is_empty() {
        anyhow::bail!("export.region cannot be empty");
    }
    if let SecretsConfig::File { path } = &config.secrets {
        if path.as_os_str().is_empty() {
            anyhow::bail!("secrets.path cannot be empty");
        }
    }
    Ok(())
}
