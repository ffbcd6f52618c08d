//! Generation model abstraction.
//!
//! A generation model takes one rendered prompt and returns one text
//! completion — single-shot, synchronous from the caller's point of view,
//! no streaming. The remote implementation speaks the OpenAI-compatible
//! chat completions protocol and shares the embedding provider's retry
//! strategy: backoff on 429/5xx and network errors, immediate failure on
//! other 4xx.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;

const SYSTEM_PROMPT: &str = "You are an editorial assistant. Draft content using only the \
provided context records; do not invent facts that the records do not support.";

#[async_trait]
pub trait GenerationModel: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-4o-mini"`).
    fn model_name(&self) -> &str;

    /// Produce a completion for one prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

// ============ Disabled Model ============

/// Placeholder used when `llm.provider = "disabled"`.
pub struct DisabledModel;

#[async_trait]
impl GenerationModel for DisabledModel {
    fn model_name(&self) -> &str {
        "disabled"
    }
    async fn complete(&self, _prompt: &str) -> Result<String> {
        bail!("Generation model is disabled")
    }
}

// ============ Remote API Model ============

/// Generation model backed by an OpenAI-compatible chat completions
/// endpoint. The API key is read from the environment variable named by
/// `llm.api_key_env`.
pub struct RemoteApiModel {
    model: String,
    endpoint: String,
    api_key: String,
    temperature: f32,
    max_tokens: usize,
    max_retries: u32,
    client: reqwest::Client,
}

impl RemoteApiModel {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("llm.model required for remote-api provider"))?;

        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", config.api_key_env))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build generation HTTP client")?;

        Ok(Self {
            model,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            client,
        })
    }
}

#[async_trait]
impl GenerationModel for RemoteApiModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(format!("{}/chat/completions", self.endpoint))
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let parsed: ChatResponse = response
                            .json()
                            .await
                            .context("failed to parse chat completions response")?;
                        let answer = parsed
                            .choices
                            .into_iter()
                            .next()
                            .map(|choice| choice.message.content)
                            .unwrap_or_default();
                        return Ok(answer);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err =
                            Some(anyhow::anyhow!("Generation API error {}: {}", status, body_text));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    bail!("Generation API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Generation failed after retries")))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: usize,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

/// Create the appropriate [`GenerationModel`] based on configuration.
pub fn create_model(config: &LlmConfig) -> Result<Box<dyn GenerationModel>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledModel)),
        "remote-api" => Ok(Box::new(RemoteApiModel::new(config)?)),
        other => bail!("Unknown generation provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_model_errors() {
        let err = DisabledModel.complete("anything").await.unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_chat_response_deserializes() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, "hello");
    }
}
