//! Configuration loading and parsing for `relnotes.toml` files.
//!
//! Every section is optional; missing fields fall back to defaults so an
//! empty or absent file is a valid configuration.
use derive_builder::Builder;
use log::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

use crate::error::{RelnotesError, Result};

pub mod client;
pub mod document;
pub mod server;

pub use client::{ClientConfig, LlmConfig, ScraperConfig};
pub use document::DocumentConfig;
pub use server::ServerConfig;

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "relnotes.toml";
/// Default directory holding the document store.
pub const DEFAULT_DATA_DIR: &str = ".relnotes";
/// Environment variable overriding `data_dir`.
pub const DATA_DIR_ENV_VAR: &str = "RELNOTES_DATA_DIR";

/// Root configuration structure for `relnotes.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct Config {
    /// Directory for the JSON document store.
    pub data_dir: String,
    /// Outbound HTTP client settings (timeouts, fan-out).
    pub client: ClientConfig,
    /// LLM endpoint and model used for summaries.
    pub llm: LlmConfig,
    /// Element ids looked up on upstream bug pages.
    pub scraper: ScraperConfig,
    /// Markdown document layout.
    pub document: DocumentConfig,
    /// HTTP API listener.
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.into(),
            client: ClientConfig::default(),
            llm: LlmConfig::default(),
            scraper: ScraperConfig::default(),
            document: DocumentConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] when
    /// no path is given. A missing default file yields the defaults; a
    /// missing explicit file is an error.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    RelnotesError::config(format!(
                        "failed to read config file {path}: {e}"
                    ))
                })?;
                Self::parse(&content)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                let content = fs::read_to_string(DEFAULT_CONFIG_FILE)?;
                Self::parse(&content)?
            }
            None => {
                debug!("no {DEFAULT_CONFIG_FILE} found: using defaults");
                Self::default()
            }
        };

        if let Ok(data_dir) = env::var(DATA_DIR_ENV_VAR)
            && !data_dir.trim().is_empty()
        {
            config.data_dir = data_dir;
        }

        config.validate()?;

        Ok(config)
    }

    /// Parse TOML content into a configuration.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.data_dir.trim().is_empty() {
            return Err(RelnotesError::config("data_dir must not be empty"));
        }

        if self.client.max_concurrency == 0 {
            return Err(RelnotesError::config(
                "client.max_concurrency must be at least 1",
            ));
        }

        Ok(())
    }
}
