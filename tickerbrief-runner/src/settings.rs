//! Operator settings: channel credentials and provider knobs.
//!
//! Settings are static, operator-owned configuration loaded from a TOML
//! file — distinct from the per-run `SanitizedConfig` extracted from user
//! intent. Every section is optional; a missing file yields all defaults,
//! so console-only runs need no setup.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub discord: DiscordSettings,
    #[serde(default)]
    pub completion: CompletionSettings,
    #[serde(default)]
    pub market: MarketSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscordSettings {
    pub webhook_url: Option<String>,
    pub mention_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionSettings {
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketSettings {
    /// IANA timezone the "price near now" query is evaluated in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_news_top_k")]
    pub news_top_k: usize,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            news_top_k: default_news_top_k(),
        }
    }
}

fn default_model() -> String {
    tickerbrief_core::providers::openai::DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_base_url() -> String {
    tickerbrief_core::providers::openai::DEFAULT_BASE_URL.to_string()
}

fn default_timezone() -> String {
    "America/Toronto".to_string()
}

fn default_news_top_k() -> usize {
    5
}

impl Settings {
    /// Load settings from a TOML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}
