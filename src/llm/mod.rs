mod openai;
pub(crate) mod parsing;
pub(crate) mod prompts;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::StudyError;

/// Supported LLM backends.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(try_from = "String", into = "String")]
pub enum Provider {
    #[default]
    #[value(name = "openai")]
    OpenAI,
    #[value(name = "groq")]
    Groq,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::OpenAI, Provider::Groq];

    /// Model used for every request to this provider.
    pub fn model_id(self) -> &'static str {
        match self {
            Provider::OpenAI => "gpt-4",
            Provider::Groq => "mixtral-8x7b-32768",
        }
    }

    /// Environment variable consulted when the config has no key.
    pub fn env_var(self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Groq => "groq",
        }
    }

    /// Human-facing name, e.g. for "Generated using OpenAI (gpt-4)".
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Groq => "Groq",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = StudyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "groq" => Ok(Provider::Groq),
            _ => Err(StudyError::UnsupportedProvider(s.to_string())),
        }
    }
}

impl TryFrom<String> for Provider {
    type Error = StudyError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Provider> for String {
    fn from(provider: Provider) -> Self {
        provider.as_str().to_string()
    }
}

/// One synchronous-style chat round trip: system instruction plus user text in,
/// a single text reply out.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    fn name(&self) -> &'static str;
}

/// Client for one provider.
pub struct LlmClient {
    provider: Provider,
    backend: Box<dyn ChatBackend>,
}

impl LlmClient {
    /// Build a client, resolving the provider's credential from `config`.
    pub fn new(provider: Provider, config: &Config) -> std::result::Result<Self, StudyError> {
        Self::new_with_env(provider, config, |name| std::env::var(name).ok())
    }

    pub(crate) fn new_with_env(
        provider: Provider,
        config: &Config,
        env: impl Fn(&str) -> Option<String>,
    ) -> std::result::Result<Self, StudyError> {
        let api_key = config
            .api_key_with_env(provider, env)
            .ok_or(StudyError::MissingCredential {
                provider,
                env_var: provider.env_var(),
            })?;

        let base_url = config
            .get_provider(provider)
            .and_then(|p| p.base_url.as_deref())
            .unwrap_or(provider.default_base_url());

        let backend = openai::OpenAIProvider::new(
            provider.as_str(),
            &api_key,
            provider.model_id(),
            base_url,
            config.request_timeout_secs.map(Duration::from_secs),
        )
        .map_err(|e| StudyError::generation("client", e))?;

        Ok(Self::with_backend(provider, Box::new(backend)))
    }

    /// Wrap an existing backend.
    pub fn with_backend(provider: Provider, backend: Box<dyn ChatBackend>) -> Self {
        Self { provider, backend }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &'static str {
        self.provider.model_id()
    }

    /// Issue exactly one request.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        tracing::debug!(
            "Sending {} chars to {} ({})",
            user.len(),
            self.backend.name(),
            self.model()
        );
        let reply = self.backend.complete(system, user).await?;
        tracing::debug!("Received {} chars from {}", reply.len(), self.backend.name());
        Ok(reply)
    }
}
