//! Text-generation provider resolution.
//!
//! Turns a [`ProviderSettings`] (explicit values plus environment overrides)
//! into a [`ProviderConfig`]: which backend to talk to, which model to ask
//! for, and any extra dispatch parameters the backend needs.
//!
//! # Resolution table
//!
//! | Provider | Default model | Extra params |
//! |----------|---------------|--------------|
//! | `openai` | `gpt-4o-mini` | none |
//! | `gemini` | `gemini-2.0-flash` | none |
//! | `ollama` | `mistral` | `api_base` (default `http://localhost:11434`) |
//! | other | falls back to `openai` | none |
//!
//! Model priority: explicit model, then the provider's environment override,
//! then the default. Resolution is a pure function of the settings; the
//! process environment is only read by [`EnvOverrides::from_vars`] when the
//! caller hands it a lookup function.
//!
//! ```rust
//! use nutriscan_core::provider::{resolve_provider, ProviderId, ProviderSettings};
//!
//! let settings = ProviderSettings::explicit(Some("gemini"), None);
//! let config = resolve_provider(&settings);
//! assert_eq!(config.provider, ProviderId::Gemini);
//! assert!(config.model.contains("gemini"));
//! assert!(config.extra.is_empty());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Selects the default provider when none is given explicitly.
pub const PROVIDER_ENV: &str = "NUTRISCAN_PROVIDER";
pub const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL";
pub const GEMINI_MODEL_ENV: &str = "GEMINI_MODEL";
pub const OLLAMA_MODEL_ENV: &str = "OLLAMA_MODEL";
/// Base URL of the local Ollama server.
pub const OLLAMA_API_BASE_ENV: &str = "OLLAMA_API_BASE";

/// Extra-params key carrying the backend endpoint base URL.
pub const API_BASE_KEY: &str = "api_base";
pub const DEFAULT_OLLAMA_API_BASE: &str = "http://localhost:11434";

/// Supported text-generation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    Gemini,
    Ollama,
}

impl ProviderId {
    pub const ALL: [ProviderId; 3] = [ProviderId::OpenAi, ProviderId::Gemini, ProviderId::Ollama];

    /// Case-insensitive match on the provider id; `None` when unknown.
    pub fn recognize(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(ProviderId::OpenAi),
            "gemini" => Some(ProviderId::Gemini),
            "ollama" => Some(ProviderId::Ollama),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Gemini => "gemini",
            ProviderId::Ollama => "ollama",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "gpt-4o-mini",
            ProviderId::Gemini => "gemini-2.0-flash",
            ProviderId::Ollama => "mistral",
        }
    }

    /// Environment variable overriding this provider's model.
    pub fn model_env_var(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => OPENAI_MODEL_ENV,
            ProviderId::Gemini => GEMINI_MODEL_ENV,
            ProviderId::Ollama => OLLAMA_MODEL_ENV,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Values read from the environment, captured once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub provider: Option<String>,
    pub openai_model: Option<String>,
    pub gemini_model: Option<String>,
    pub ollama_model: Option<String>,
    pub ollama_api_base: Option<String>,
}

impl EnvOverrides {
    /// Capture overrides through `lookup` (e.g. `|k| std::env::var(k).ok()`).
    /// Blank values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            provider: get(PROVIDER_ENV),
            openai_model: get(OPENAI_MODEL_ENV),
            gemini_model: get(GEMINI_MODEL_ENV),
            ollama_model: get(OLLAMA_MODEL_ENV),
            ollama_api_base: get(OLLAMA_API_BASE_ENV),
        }
    }

    fn model_for(&self, provider: ProviderId) -> Option<&str> {
        match provider {
            ProviderId::OpenAi => self.openai_model.as_deref(),
            ProviderId::Gemini => self.gemini_model.as_deref(),
            ProviderId::Ollama => self.ollama_model.as_deref(),
        }
    }
}

/// Configuration object handed to the assistant at construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderSettings {
    /// Explicit provider id; unknown ids fall back to `openai`.
    pub provider: Option<String>,
    /// Explicit model name; always wins over the table.
    pub model: Option<String>,
    /// Explicit endpoint for the local provider.
    pub endpoint: Option<String>,
    pub env: EnvOverrides,
}

impl ProviderSettings {
    /// Settings with explicit values only and no environment layer.
    pub fn explicit(provider: Option<&str>, model: Option<&str>) -> Self {
        Self {
            provider: provider.map(str::to_string),
            model: model.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_env(mut self, env: EnvOverrides) -> Self {
        self.env = env;
        self
    }
}

/// Fully resolved provider choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderConfig {
    pub provider: ProviderId,
    pub model: String,
    pub extra: BTreeMap<String, String>,
}

impl ProviderConfig {
    /// Endpoint base URL, when the provider carries one.
    pub fn api_base(&self) -> Option<&str> {
        self.extra.get(API_BASE_KEY).map(String::as_str)
    }
}

/// Resolve settings into a [`ProviderConfig`]. Never fails.
pub fn resolve_provider(settings: &ProviderSettings) -> ProviderConfig {
    let requested = non_blank(settings.provider.as_deref()).or(settings.env.provider.as_deref());

    let provider = match requested {
        Some(raw) => ProviderId::recognize(raw).unwrap_or_else(|| {
            tracing::warn!(provider = raw, "unknown provider, falling back to openai");
            ProviderId::OpenAi
        }),
        None => ProviderId::OpenAi,
    };

    let model = non_blank(settings.model.as_deref())
        .or_else(|| settings.env.model_for(provider))
        .unwrap_or(provider.default_model())
        .to_string();

    let mut extra = BTreeMap::new();
    if provider == ProviderId::Ollama {
        let base = non_blank(settings.endpoint.as_deref())
            .or(settings.env.ollama_api_base.as_deref())
            .unwrap_or(DEFAULT_OLLAMA_API_BASE);
        extra.insert(API_BASE_KEY.to_string(), base.trim_end_matches('/').to_string());
    }

    tracing::debug!(provider = %provider, model = %model, "resolved text-generation provider");

    ProviderConfig {
        provider,
        model,
        extra,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
