//! OpenAI-compatible chat-completions client

use super::{LlmError, TextGenerator};
use crate::config::LlmConfig;
use crate::metrics::METRICS;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info};

const SYSTEM_PROMPT: &str = "You are an e-commerce product strategist. \
Answer with a single valid JSON object and nothing else.";

/// Client for the generative-text service
pub struct LlmClient {
    http: Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new client
    ///
    /// A missing API key is not an error here; it is reported by
    /// [`TextGenerator::generate`] before any request is sent.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::Request(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = match &self.config.api_key {
            Some(key) if !key.expose_secret().trim().is_empty() => key,
            _ => return Err(LlmError::MissingApiKey),
        };

        let request = self.build_request(prompt);
        debug!(
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "Sending generation request"
        );

        let start = Instant::now();
        let result = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await;
        METRICS
            .llm_request_duration
            .observe(start.elapsed().as_secs_f64());

        let response = result.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(e.to_string())
            } else {
                LlmError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Generative-text API error {}: {}", status, body);
            return Err(LlmError::Upstream(format!("HTTP {}: {}", status, body)));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        info!(
            model = %self.config.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            response_chars = content.len(),
            "Generation completed"
        );

        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// OpenAI-compatible API types
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let client = LlmClient::new(LlmConfig::default()).unwrap();
        let request = client.build_request("Analyze this product");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Analyze this product");
        assert_eq!(json["max_tokens"], 4096);
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let config = LlmConfig {
            // Unroutable: a request would fail differently
            api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            api_key: None,
            ..LlmConfig::default()
        };
        let client = LlmClient::new(config).unwrap();
        let result = client.generate("prompt").await;
        assert!(matches!(result, Err(LlmError::MissingApiKey)));
    }
}
