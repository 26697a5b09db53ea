//! TOML configuration and credential resolution.
//!
//! Every section is optional; a missing config file yields the built-in
//! defaults, which match the upstream SerpApi contract and keep snapshots
//! under `reviews/`.
//!
//! ```toml
//! [fetch]
//! per_page = 100
//! max_total = 300
//! max_calls = 10
//!
//! [storage]
//! dir = "reviews"
//!
//! [server]
//! bind = "127.0.0.1:5000"
//!
//! [classifier]
//! command = ["python3", "classify.py"]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::PulseError;

/// Environment variable holding the SerpApi key.
pub const API_KEY_VAR: &str = "SERPAPI_KEY";
/// Environment variable holding the Google Play product id.
pub const PRODUCT_ID_VAR: &str = "PRODUCT_ID";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_engine")]
    pub engine: String,
    #[serde(default = "default_store")]
    pub store: String,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
    #[serde(default = "default_max_total")]
    pub max_total: usize,
    /// Safety cap on API calls per run, independent of `max_total`.
    #[serde(default = "default_max_calls")]
    pub max_calls: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            engine: default_engine(),
            store: default_store(),
            per_page: default_per_page(),
            max_total: default_max_total(),
            max_calls: default_max_calls(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "https://serpapi.com/search.json".to_string()
}
fn default_engine() -> String {
    "google_play_product".to_string()
}
fn default_store() -> String {
    "apps".to_string()
}
fn default_per_page() -> usize {
    100
}
fn default_max_total() -> usize {
    300
}
fn default_max_calls() -> usize {
    10
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_raw_file")]
    pub raw_file: String,
    #[serde(default = "default_classified_file")]
    pub classified_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            raw_file: default_raw_file(),
            classified_file: default_classified_file(),
        }
    }
}

impl StorageConfig {
    pub fn raw_path(&self) -> PathBuf {
        self.dir.join(&self.raw_file)
    }

    pub fn classified_path(&self) -> PathBuf {
        self.dir.join(&self.classified_file)
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("reviews")
}
fn default_raw_file() -> String {
    "fetch.json".to_string()
}
fn default_classified_file() -> String {
    "classified_reviews.json".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

/// External classifier invocation. Empty `command` means the classifier is
/// run by some other means and `pulse run` skips the step.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub command: Vec<String>,
}

impl ClassifierConfig {
    pub fn is_configured(&self) -> bool {
        !self.command.is_empty()
    }
}

/// Fallback credentials. The environment always takes precedence.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CredentialsConfig {
    pub api_key: Option<String>,
    pub product_id: Option<String>,
}

/// Validated SerpApi credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub product_id: String,
}

impl Credentials {
    /// Resolve credentials from the process environment, falling back to
    /// the `[credentials]` table.
    pub fn resolve(config: &CredentialsConfig) -> Result<Self, PulseError> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    /// Resolve credentials using `lookup` in place of the environment.
    pub fn resolve_with<F>(config: &CredentialsConfig, lookup: F) -> Result<Self, PulseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR).or_else(|| config.api_key.clone());
        let api_key = require_value(api_key, API_KEY_VAR, "api_key")?;

        let product_id = lookup(PRODUCT_ID_VAR).or_else(|| config.product_id.clone());
        let product_id = require_value(product_id, PRODUCT_ID_VAR, "product_id")?;

        Ok(Self {
            api_key,
            product_id,
        })
    }
}

/// A value is a placeholder when it is blank or still carries the
/// `YOUR_...` marker from the sample configuration.
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.contains("YOUR_")
}

fn require_value(
    value: Option<String>,
    env_name: &str,
    config_key: &str,
) -> Result<String, PulseError> {
    match value {
        Some(v) if !is_placeholder(&v) => Ok(v.trim().to_string()),
        _ => Err(PulseError::Configuration(format!(
            "Set {} in the environment or credentials.{} in the config file.",
            env_name, config_key
        ))),
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

/// Like [`load_config`], but a missing file yields the defaults.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(Config::default());
    }
    load_config(path)
}

fn validate(config: &Config) -> Result<()> {
    if config.fetch.per_page == 0 {
        anyhow::bail!("fetch.per_page must be > 0");
    }
    if config.fetch.max_total == 0 {
        anyhow::bail!("fetch.max_total must be > 0");
    }
    if config.fetch.max_calls == 0 {
        anyhow::bail!("fetch.max_calls must be > 0");
    }
    if config.storage.raw_file == config.storage.classified_file {
        anyhow::bail!("storage.raw_file and storage.classified_file must differ");
    }
    Ok(())
}
