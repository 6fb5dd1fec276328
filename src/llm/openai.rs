//! Chat-completions client for OpenAI and OpenAI-compatible APIs (Groq).

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ChatBackend;

pub struct OpenAIProvider {
    client: Client,
    name: &'static str,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    /// Output cap; the provider's default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    temperature: f32,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAIProvider {
    pub fn new(
        name: &'static str,
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        if api_key.is_empty() {
            anyhow::bail!("{} API key is required", name);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            name,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, system: &str, user_message: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user_message.to_string(),
                },
            ],
            max_tokens: None,
            temperature: 0.0,
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAIProvider {
    async fn complete(&self, system: &str, user_message: &str) -> Result<String> {
        let request = self.request(system, user_message);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {} API", self.name))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("{} API error ({}): {}", self.name, status, error_text);
        }

        let response: ChatResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", self.name))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .with_context(|| format!("No content in {} response", self.name))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_key() {
        assert!(OpenAIProvider::new("openai", "", "gpt-4", "https://api.openai.com/v1", None).is_err());
    }

    #[test]
    fn test_request_is_deterministic_two_message_chat() {
        let provider =
            OpenAIProvider::new("groq", "gsk-test", "mixtral-8x7b-32768", "https://api.groq.com/openai/v1/", None)
                .unwrap();
        assert_eq!(provider.base_url, "https://api.groq.com/openai/v1");

        let body = serde_json::to_value(provider.request("be a tutor", "page text")).unwrap();
        assert_eq!(body["model"], "mixtral-8x7b-32768");
        assert_eq!(body["temperature"], 0.0);
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be a tutor");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "page text");
    }

    #[test]
    fn test_parse_response_shape() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hello"));
    }
}
