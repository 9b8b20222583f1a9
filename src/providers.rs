//! Provider resolution for the CLI.
//!
//! Merges `--provider`/`--model`, the `[assistant]` config section and the
//! process environment into a [`ProviderConfig`], and builds the
//! [`NutritionAssistant`] used by `search`, `compare` and `chat`.

use anyhow::Result;

use nutriscan_core::assistant::NutritionAssistant;
use nutriscan_core::provider::{resolve_provider, EnvOverrides, ProviderConfig};

use crate::backends::create_backend;
use crate::config::Config;

/// Provider selection passed on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderFlags<'a> {
    pub provider: Option<&'a str>,
    pub model: Option<&'a str>,
}

/// Environment overrides of the running process.
pub fn process_env() -> EnvOverrides {
    EnvOverrides::from_vars(|key| std::env::var(key).ok())
}

pub fn resolve(config: &Config, flags: ProviderFlags<'_>, env: EnvOverrides) -> ProviderConfig {
    resolve_provider(&config.provider_settings(flags.provider, flags.model, env))
}

/// Build an assistant for the resolved provider. Fails only when the HTTP
/// client cannot be constructed; missing API keys surface on first use.
pub fn build_assistant(config: &Config, flags: ProviderFlags<'_>) -> Result<NutritionAssistant> {
    let resolved = resolve(config, flags, process_env());
    let backend = create_backend(&resolved, config.assistant.timeout_secs)?;
    Ok(NutritionAssistant::new(resolved, backend).with_history_window(config.history_window()))
}

/// Render the resolved provider as `key: value` lines.
pub fn describe(resolved: &ProviderConfig) -> String {
    let mut out = format!("provider: {}\nmodel: {}\n", resolved.provider, resolved.model);
    for (key, value) in &resolved.extra {
        out.push_str(&format!("{}: {}\n", key, value));
    }
    out
}

/// Run `nutriscan provider`: print the resolved provider without contacting it.
pub fn run_provider(config: &Config, flags: ProviderFlags<'_>) -> Result<()> {
    print!("{}", describe(&resolve(config, flags, process_env())));
    Ok(())
}
