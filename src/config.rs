//! TOML configuration.
//!
//! Every section and field is optional; a missing config file at the default
//! location yields [`Config::default`]. Provider settings merge three layers,
//! highest priority first: CLI flags, this file, the process environment.
//!
//! ```toml
//! [assistant]
//! provider = "ollama"
//! model = "llama3"
//! ollama_url = "http://localhost:11434"
//! history_window = 20
//! timeout_secs = 60
//!
//! [lookup]
//! base_url = "https://world.openfoodfacts.org"
//! page_size = 10
//! timeout_secs = 30
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use nutriscan_core::assistant::HistoryWindow;
use nutriscan_core::provider::{EnvOverrides, ProviderSettings};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub ollama_url: Option<String>,
    /// Dispatch only this many recent turns; unset sends the whole history.
    #[serde(default)]
    pub history_window: Option<usize>,
    #[serde(default = "default_assistant_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            ollama_url: None,
            history_window: None,
            timeout_secs: default_assistant_timeout_secs(),
        }
    }
}

fn default_assistant_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct LookupConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_lookup_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            timeout_secs: default_lookup_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://world.openfoodfacts.org".to_string()
}
/// Largest page the product database is asked for.
pub const MAX_PAGE_SIZE: usize = 100;

fn default_page_size() -> usize {
    10
}
fn default_lookup_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!("nutriscan/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Merge CLI flags, this file, and `env` into assistant provider settings.
    pub fn provider_settings(
        &self,
        cli_provider: Option<&str>,
        cli_model: Option<&str>,
        env: EnvOverrides,
    ) -> ProviderSettings {
        ProviderSettings {
            provider: cli_provider
                .map(str::to_string)
                .or_else(|| self.assistant.provider.clone()),
            model: cli_model
                .map(str::to_string)
                .or_else(|| self.assistant.model.clone()),
            endpoint: self.assistant.ollama_url.clone(),
            env,
        }
    }

    pub fn history_window(&self) -> HistoryWindow {
        match self.assistant.history_window {
            Some(n) => HistoryWindow::Recent(n),
            None => HistoryWindow::Unbounded,
        }
    }
}

/// Load and validate a config file that must exist.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Load `path` if it exists. A missing file is only an error when the user
/// passed the path explicitly.
pub fn load_config_or_default(path: &Path, explicit: bool) -> Result<Config> {
    if !explicit && !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    load_config(path)
}

fn validate(config: &Config) -> Result<()> {
    if config.lookup.base_url.trim().is_empty() {
        anyhow::bail!("lookup.base_url must not be empty");
    }

    if !(1..=MAX_PAGE_SIZE).contains(&config.lookup.page_size) {
        anyhow::bail!("lookup.page_size must be in [1, {}]", MAX_PAGE_SIZE);
    }

    if config.lookup.timeout_secs == 0 {
        anyhow::bail!("lookup.timeout_secs must be > 0");
    }

    if config.assistant.timeout_secs == 0 {
        anyhow::bail!("assistant.timeout_secs must be > 0");
    }

    if config.assistant.history_window == Some(0) {
        anyhow::bail!("assistant.history_window must be > 0 when set");
    }

    Ok(())
}
