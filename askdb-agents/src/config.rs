//! TOML configuration with environment fallback for the API key.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::AgentError;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_keys: HashMap<String, toml::Value>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

/// Resolved provider settings ready to construct a client from.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

pub fn load_config(path: &Path) -> Result<Config, AgentError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AgentError::Configuration(format!("Failed to read config {}: {}", path.display(), e))
    })?;
    let config: Config = toml::from_str(&content).map_err(|e| {
        AgentError::Configuration(format!("Failed to parse config {}: {}", path.display(), e))
    })?;
    Ok(config)
}

/// Resolves the API key from the config file, falling back to the
/// ASKDB_API_KEY and OPENAI_API_KEY environment variables.
pub fn resolve_provider_config(config: &Config) -> Result<ProviderConfig, AgentError> {
    let api_key = config
        .api_keys
        .get("openai_api_key")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .or_else(|| std::env::var("ASKDB_API_KEY").ok())
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            AgentError::Configuration(
                "API key not found. Set 'openai_api_key' in the config file, or the ASKDB_API_KEY or OPENAI_API_KEY environment variable".to_string(),
            )
        })?;

    Ok(ProviderConfig {
        api_key,
        base_url: config.base_url.clone(),
        model: config.model.clone(),
    })
}
