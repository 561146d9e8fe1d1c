//! Workspace configuration (`.blastradius/config.yaml`).

use crate::commands::init::{BLASTRADIUS_DIR_NAME, GRAPH_FILE_NAME};
use crate::error::{ConfigError, Result};
use crate::storage::{Neo4jSettings, StoreBackend};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};
use std::time::Duration;
use tokio::fs;

/// Environment variable holding the Neo4j password unless configured otherwise.
pub const DEFAULT_PASSWORD_ENV: &str = "BLASTRADIUS_NEO4J_PASSWORD";

/// Contents of `config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct BlastradiusConfig {
    /// Store configuration
    pub store: StoreConfig,

    /// Neo4j connection, used when `store.backend` is `neo4j`
    #[serde(default)]
    pub neo4j: Neo4jConfig,
}

/// `store` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct StoreConfig {
    /// `memory`, `jsonl` or `neo4j`
    pub backend: String,

    /// JSONL data file, relative to the workspace root
    pub data_file: String,
}

/// `neo4j` section. The password itself never lives in the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct Neo4jConfig {
    /// Bolt URI
    pub uri: String,
    /// User name
    pub user: String,
    /// Database name; server default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Name of the environment variable holding the password
    pub password_env: String,
    /// Connection attempts at startup
    pub connect_retries: u32,
    /// Seconds between connection attempts
    pub retry_delay_secs: u64,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            database: None,
            password_env: DEFAULT_PASSWORD_ENV.to_string(),
            connect_retries: 5,
            retry_delay_secs: 10,
        }
    }
}

impl BlastradiusConfig {
    /// Create a configuration for the given backend with default paths.
    #[must_use]
    pub fn new(backend: &str) -> Self {
        Self {
            store: StoreConfig {
                backend: backend.to_string(),
                data_file: format!("{BLASTRADIUS_DIR_NAME}/{GRAPH_FILE_NAME}"),
            },
            neo4j: Neo4jConfig::default(),
        }
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_yaml::from_str(&content).map_err(ConfigError::from)?)
    }

    /// Save configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(ConfigError::from)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Resolve the configured backend against the workspace root.
    ///
    /// # Errors
    ///
    /// - `ConfigError::UnknownBackend` for an unrecognized backend name
    /// - `ConfigError::InvalidDataPath` if the data file escapes the workspace
    /// - `ConfigError::MissingPassword` if the Neo4j password variable is unset
    pub fn to_backend(&self, root: &Path) -> Result<StoreBackend> {
        match self.store.backend.as_str() {
            "memory" => Ok(StoreBackend::InMemory),
            "jsonl" => {
                let data_file = Path::new(&self.store.data_file);
                let inside = data_file
                    .components()
                    .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
                if !inside || self.store.data_file.is_empty() {
                    return Err(ConfigError::InvalidDataPath(self.store.data_file.clone()).into());
                }
                Ok(StoreBackend::Jsonl(root.join(data_file)))
            }
            "neo4j" => {
                let neo4j = &self.neo4j;
                let password = std::env::var(&neo4j.password_env)
                    .map_err(|_| ConfigError::MissingPassword(neo4j.password_env.clone()))?;
                Ok(StoreBackend::Neo4j(Neo4jSettings {
                    uri: neo4j.uri.clone(),
                    user: neo4j.user.clone(),
                    password,
                    database: neo4j.database.clone(),
                    connect_retries: neo4j.connect_retries.max(1),
                    retry_delay: Duration::from_secs(neo4j.retry_delay_secs),
                }))
            }
            other => Err(ConfigError::UnknownBackend(other.to_string()).into()),
        }
    }
}

impl Default for BlastradiusConfig {
    fn default() -> Self {
        Self::new("jsonl")
    }
}
