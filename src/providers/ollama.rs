use crate::config::ProviderConfig;
use crate::error::Result;
use crate::providers::{http_client, missing_content, read_json, send_error, LlmProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// A locally hosted model served by Ollama. Needs no API key.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OllamaProvider {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self> {
        let base_url = config
            .base_url
            .clone()
            .or_else(|| std::env::var("OLLAMA_BASE_URL").ok())
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        Ok(OllamaProvider {
            client: http_client(timeout)?,
            base_url,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url.trim_end_matches('/')))
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
                "options": {
                    "temperature": self.temperature,
                    "num_predict": self.max_tokens
                }
            }))
            .send()
            .await
            .map_err(|e| send_error(self.provider_name(), e))?;

        let body = read_json(self.provider_name(), response).await?;
        body["response"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| missing_content(self.provider_name()))
    }
}
