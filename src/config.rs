//! Configuration file handling for the ledger.
//!
//! The configuration file is stored at `$LEDGER_HOME/config.json` and holds the name of the ledger
//! file along with the settings for the inference service used for categorization.

use crate::categorize::{CategorizeError, InferenceClient, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::error::Res;
use crate::store::{ContextPolicy, FileStorage, Ledger, DEFAULT_CONTEXT_SIZE};
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "pocket-ledger";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const LEDGER_JSON: &str = "transactions.json";
const TIMEOUT_SECS: u64 = 120;

/// Optional overrides for the inference settings when creating a new configuration.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct InferenceSettings {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub context_size: Option<usize>,
    pub timeout_secs: Option<u64>,
}

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$LEDGER_HOME` and from there it loads `$LEDGER_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    ledger_path: PathBuf,
    config_file: ConfigFile,
    endpoint: Url,
}

impl Config {
    /// Creates the data directory, if needed, and writes an initial `config.json` to it.
    ///
    /// # Errors
    /// - Returns an error if a `config.json` already exists in `dir`.
    /// - Returns an error if the endpoint is not a valid URL.
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, settings: &InferenceSettings) -> Res<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the ledger home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            );
        }

        let defaults = ConfigFile::default();
        let config_file = ConfigFile {
            endpoint: settings.endpoint.clone().unwrap_or(defaults.endpoint),
            model: settings.model.clone().unwrap_or(defaults.model),
            context_size: settings.context_size.unwrap_or(defaults.context_size),
            timeout_secs: settings.timeout_secs.unwrap_or(defaults.timeout_secs),
            ..defaults
        };
        let endpoint = config_file.endpoint()?;
        config_file.save(&config_path).await?;

        Ok(Self {
            ledger_path: root.join(&config_file.ledger_file),
            root,
            config_path,
            config_file,
            endpoint,
        })
    }

    /// This will
    /// - validate that `ledger_home` exists and that the config file exists
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(ledger_home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = ledger_home.into();
        if !maybe_relative.is_dir() {
            bail!(
                "The ledger home directory '{}' does not exist, run 'ledger init' first",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'ledger init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let endpoint = config_file.endpoint()?;

        Ok(Self {
            ledger_path: root.join(&config_file.ledger_file),
            root,
            config_path,
            config_file,
            endpoint,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The JSON file that holds the transactions.
    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.config_file.model
    }

    pub fn context_policy(&self) -> ContextPolicy {
        ContextPolicy::most_recent(self.config_file.context_size)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.timeout_secs)
    }

    /// Loads the ledger from its file in the data directory.
    pub async fn ledger(&self) -> Res<Ledger> {
        Ledger::load(FileStorage::new(&self.ledger_path)).await
    }

    /// Creates a client for the configured inference service.
    pub fn categorizer(&self) -> Result<InferenceClient, CategorizeError> {
        InferenceClient::new(self.endpoint.clone(), self.model(), self.timeout())
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "pocket-ledger",
///   "config_version": 1,
///   "ledger_file": "transactions.json",
///   "endpoint": "http://localhost:11434/api/generate",
///   "model": "gpt-oss:20b",
///   "context_size": 20,
///   "timeout_secs": 120
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "pocket-ledger"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Name of the ledger file, relative to the data directory
    #[serde(default = "default_ledger_file")]
    ledger_file: String,

    /// URL of the `/api/generate` endpoint
    #[serde(default = "default_endpoint")]
    endpoint: String,

    /// Model identifier sent with each request
    #[serde(default = "default_model")]
    model: String,

    /// How many recent transactions are sent as context
    #[serde(default = "default_context_size")]
    context_size: usize,

    /// Request timeout for the inference service
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_ledger_file() -> String {
    LEDGER_JSON.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_context_size() -> usize {
    DEFAULT_CONTEXT_SIZE
}

fn default_timeout_secs() -> u64 {
    TIMEOUT_SECS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            ledger_file: default_ledger_file(),
            endpoint: default_endpoint(),
            model: default_model(),
            context_size: default_context_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn endpoint(&self) -> Res<Url> {
        Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid inference endpoint '{}'", self.endpoint))
    }
}
