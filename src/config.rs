use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::StudyError;
use crate::llm::Provider;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Questions per quiz and per analytical question set.
    #[serde(default = "default_questions_per_set")]
    pub questions_per_set: usize,
    /// HTTP timeout for provider calls; the transport default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_questions_per_set() -> usize {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    pub openai: Option<ProviderConfig>,
    pub groq: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            questions_per_set: default_questions_per_set(),
            request_timeout_secs: None,
            providers: ProvidersConfig::default(),
        }
    }
}

impl Config {
    /// Get the configuration directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("learnify");
        Ok(config_dir)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Configuration file not found at {}. Run 'learnify init' first.",
                config_path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file at {}", config_path.display()))
    }

    /// Load the config file if there is one, otherwise defaults.
    ///
    /// With defaults, credentials come from environment variables only.
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            tracing::info!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load()
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;

        // Expand environment variables in API keys
        config.expand_env_vars();

        if config.questions_per_set == 0 {
            anyhow::bail!("questions_per_set must be at least 1");
        }

        Ok(config)
    }

    /// Expand environment variables in configuration values
    fn expand_env_vars(&mut self) {
        if let Some(ref mut provider) = self.providers.openai {
            provider.api_key = expand_env_var(&provider.api_key);
        }
        if let Some(ref mut provider) = self.providers.groq {
            provider.api_key = expand_env_var(&provider.api_key);
        }
    }

    /// Get provider configuration
    pub fn get_provider(&self, provider: Provider) -> Option<&ProviderConfig> {
        match provider {
            Provider::OpenAI => self.providers.openai.as_ref(),
            Provider::Groq => self.providers.groq.as_ref(),
        }
    }

    /// The provider named by `default_provider`.
    pub fn default_provider(&self) -> std::result::Result<Provider, StudyError> {
        self.default_provider.parse()
    }

    /// API key for `provider`: the config value, else the provider's
    /// environment variable.
    pub fn api_key(&self, provider: Provider) -> Option<String> {
        self.api_key_with_env(provider, |name| std::env::var(name).ok())
    }

    pub(crate) fn api_key_with_env(
        &self,
        provider: Provider,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        self.get_provider(provider)
            .map(|p| p.api_key.trim().to_string())
            .filter(|key| !key.is_empty() && !key.starts_with('$'))
            .or_else(|| env(provider.env_var()).filter(|key| !key.trim().is_empty()))
    }

    /// Where the key for `provider` comes from, for status listings.
    pub fn api_key_source(&self, provider: Provider) -> Option<String> {
        if let Some(p) = self.get_provider(provider)
            && !p.api_key.trim().is_empty()
            && !p.api_key.starts_with('$')
        {
            return Some("(from config)".to_string());
        }
        std::env::var(provider.env_var())
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|_| format!("(from {})", provider.env_var()))
    }
}

/// Expand environment variable references like ${VAR_NAME}
fn expand_env_var(value: &str) -> String {
    expand_env_var_with(value, |name| std::env::var(name).ok())
}

fn expand_env_var_with(value: &str, env: impl Fn(&str) -> Option<String>) -> String {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        env(var_name).unwrap_or_default()
    } else if let Some(var_name) = value.strip_prefix('$') {
        env(var_name).unwrap_or_default()
    } else {
        value.to_string()
    }
}
